//! Sync cycle driver.
//!
//! # Responsibility
//! - Run one fetch-and-merge cycle against a `RemoteSource`.
//! - Track the Idle/Syncing state and skip overlapping triggers.
//! - Retry failed fetches with bounded exponential backoff.
//!
//! # Invariants
//! - At most one cycle is in flight per engine.
//! - The store lock is taken only after the fetch settles, and the merge runs
//!   against the local list as it is at that moment.
//! - A failed cycle never writes to the store.

use crate::error::ErrorKind;
use crate::model::quote::Quote;
use crate::repo::quote_repo::QuoteRepository;
use crate::service::quote_service::{AppliedSync, QuoteService, QuoteServiceError};
use crate::sync::reconcile::MergePolicy;
use crate::sync::remote::{RemoteError, RemoteSource};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Banner text shown when a cycle fails.
pub const SYNC_FAILED_NOTE: &str = "Sync failed, using local data.";

/// Engine state as observed from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Syncing,
}

/// Bounded retry schedule for fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per cycle, including the first. Minimum 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Single attempt; a failure waits for the next timer tick.
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }

    /// Delay before attempt number `attempt + 1` (1-based `attempt`).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Failure of one sync cycle.
#[derive(Debug)]
pub enum SyncError {
    Remote(RemoteError),
    Store(QuoteServiceError),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Remote(err) => err.kind(),
            Self::Store(err) => err.kind(),
        }
    }
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "failed to apply server data: {err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

/// Outcome of one trigger.
#[derive(Debug)]
pub enum SyncReport {
    /// Another cycle was already in flight.
    Skipped,
    Applied(AppliedSync),
    Failed(SyncError),
}

impl SyncReport {
    /// Status banner text for this report, if any.
    pub fn note(&self) -> Option<&str> {
        match self {
            Self::Skipped => None,
            Self::Applied(applied) => Some(applied.outcome.note.as_str()),
            Self::Failed(_) => Some(SYNC_FAILED_NOTE),
        }
    }

    pub fn changed(&self) -> bool {
        matches!(self, Self::Applied(applied) if applied.outcome.changed)
    }
}

/// Drives sync cycles for one remote source.
pub struct SyncEngine {
    remote: Arc<dyn RemoteSource>,
    policy: MergePolicy,
    retry: RetryPolicy,
    in_flight: AtomicBool,
}

impl SyncEngine {
    pub fn new(remote: Arc<dyn RemoteSource>, policy: MergePolicy) -> Self {
        Self {
            remote,
            policy,
            retry: RetryPolicy::none(),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = RetryPolicy {
            max_attempts: retry.max_attempts.max(1),
            ..retry
        };
        self
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    pub fn remote(&self) -> &Arc<dyn RemoteSource> {
        &self.remote
    }

    pub fn state(&self) -> SyncState {
        if self.in_flight.load(Ordering::SeqCst) {
            SyncState::Syncing
        } else {
            SyncState::Idle
        }
    }

    /// Fetches remote quotes, retrying per the configured policy.
    pub async fn fetch_with_retry(&self) -> Result<Vec<Quote>, RemoteError> {
        let mut attempt = 1;
        loop {
            match self.remote.fetch_quotes().await {
                Ok(quotes) => return Ok(quotes),
                Err(err) if attempt < self.retry.max_attempts => {
                    let backoff = self.retry.backoff_for(attempt);
                    warn!(
                        "event=sync_fetch module=sync status=retry attempt={attempt} backoff_ms={} error_kind={}",
                        backoff.as_millis(),
                        err.kind()
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Runs one cycle unless another is in flight.
    pub async fn run_cycle<R: QuoteRepository>(
        &self,
        store: &Mutex<QuoteService<R>>,
    ) -> SyncReport {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            info!("event=sync_cycle module=sync status=skipped reason=in_flight");
            return SyncReport::Skipped;
        };

        let started_at = Instant::now();
        let remote_quotes = match self.fetch_with_retry().await {
            Ok(quotes) => quotes,
            Err(err) => {
                warn!(
                    "event=sync_cycle module=sync status=error endpoint={} duration_ms={} error_kind={} error={}",
                    self.remote.endpoint(),
                    started_at.elapsed().as_millis(),
                    err.kind(),
                    err
                );
                return SyncReport::Failed(SyncError::Remote(err));
            }
        };

        let mut service = store.lock().await;
        match service.apply_remote(&remote_quotes, self.policy) {
            Ok(applied) => {
                info!(
                    "event=sync_cycle module=sync status=ok endpoint={} policy={} duration_ms={} remote={} added={} changed={} total={}",
                    self.remote.endpoint(),
                    self.policy,
                    started_at.elapsed().as_millis(),
                    remote_quotes.len(),
                    applied.outcome.added,
                    applied.outcome.changed,
                    service.quotes().len()
                );
                SyncReport::Applied(applied)
            }
            Err(err) => {
                warn!(
                    "event=sync_cycle module=sync status=error duration_ms={} error_kind={} error={}",
                    started_at.elapsed().as_millis(),
                    err.kind(),
                    err
                );
                SyncReport::Failed(SyncError::Store(err))
            }
        }
    }
}

/// Clears the in-flight flag on drop, including on task cancellation.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::{InFlightGuard, RetryPolicy};
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    #[test]
    fn backoff_doubles_and_caps() {
        let retry = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
        };
        assert_eq!(retry.backoff_for(1), Duration::from_millis(100));
        assert_eq!(retry.backoff_for(2), Duration::from_millis(200));
        assert_eq!(retry.backoff_for(3), Duration::from_millis(350));
        assert_eq!(retry.backoff_for(40), Duration::from_millis(350));
    }

    #[test]
    fn in_flight_guard_is_exclusive_until_dropped() {
        let flag = AtomicBool::new(false);
        let guard = InFlightGuard::acquire(&flag).expect("first acquire");
        assert!(InFlightGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(InFlightGuard::acquire(&flag).is_some());
    }
}
