//! Application state owner and event hub.
//!
//! # Responsibility
//! - Own the quote service behind a single-writer async mutex.
//! - Broadcast change and notice events for presentation layers.
//! - Post added quotes in the background and run periodic sync.
//!
//! # Invariants
//! - Every mutation goes through `self.service`'s lock.
//! - A failed post never rolls back the local add.
//! - Event sends never fail the caller; missing subscribers are fine.

use crate::model::book::CategoryFilter;
use crate::model::quote::Quote;
use crate::repo::quote_repo::QuoteRepository;
use crate::service::quote_service::{QuoteService, QuoteServiceError};
use crate::sync::engine::{SyncEngine, SyncReport};
use crate::sync::remote::RemoteSource;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// How long a status notice stays on screen.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Shortest accepted periodic sync interval.
pub const MIN_SYNC_PERIOD: Duration = Duration::from_secs(1);

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient status banner message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub ttl: Duration,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            ttl: NOTICE_TTL,
        }
    }
}

/// State-change notification for subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    QuotesChanged { total: usize },
    FilterChanged { filter: CategoryFilter },
    Notice(Notice),
}

/// Shared quote book application.
///
/// Cheap to clone; clones share state.
pub struct QuoteApp<R: QuoteRepository> {
    service: Arc<Mutex<QuoteService<R>>>,
    sync: Arc<SyncEngine>,
    events: broadcast::Sender<AppEvent>,
}

impl<R: QuoteRepository> Clone for QuoteApp<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            sync: Arc::clone(&self.sync),
            events: self.events.clone(),
        }
    }
}

impl<R: QuoteRepository + Send + 'static> QuoteApp<R> {
    pub fn new(service: QuoteService<R>, sync: SyncEngine) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            service: Arc::new(Mutex::new(service)),
            sync: Arc::new(sync),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.events.subscribe()
    }

    pub fn sync_engine(&self) -> &SyncEngine {
        &self.sync
    }

    /// Locks the service for reads. Hold the guard briefly.
    pub async fn service(&self) -> MutexGuard<'_, QuoteService<R>> {
        self.service.lock().await
    }

    /// Adds a quote, then posts it to the remote in the background.
    ///
    /// The returned handle resolves when the post settles.
    pub async fn add_quote(
        &self,
        text: &str,
        category: &str,
    ) -> Result<(Quote, JoinHandle<()>), QuoteServiceError> {
        let (quote, total) = {
            let mut service = self.service.lock().await;
            match service.add(text, category) {
                Ok(quote) => (quote, service.quotes().len()),
                Err(err) => {
                    drop(service);
                    self.emit(AppEvent::Notice(Notice::error(err.to_string())));
                    return Err(err);
                }
            }
        };

        self.emit(AppEvent::QuotesChanged { total });
        self.emit(AppEvent::Notice(Notice::info("New quote added successfully!")));
        let post = self.spawn_post(quote.clone());
        Ok((quote, post))
    }

    /// Imports a JSON array payload. Returns the number of quotes added.
    pub async fn import_json(&self, payload: &str) -> Result<usize, QuoteServiceError> {
        let result = {
            let mut service = self.service.lock().await;
            service
                .import_json(payload)
                .map(|imported| (imported, service.quotes().len()))
        };

        match result {
            Ok((imported, total)) => {
                self.emit(AppEvent::QuotesChanged { total });
                self.emit(AppEvent::Notice(Notice::info(format!(
                    "Successfully imported {imported} quotes!"
                ))));
                Ok(imported)
            }
            Err(err) => {
                self.emit(AppEvent::Notice(Notice::error(err.to_string())));
                Err(err)
            }
        }
    }

    pub async fn export_json(&self) -> Result<String, QuoteServiceError> {
        self.service.lock().await.export_json()
    }

    pub async fn set_filter(&self, filter: CategoryFilter) -> Result<(), QuoteServiceError> {
        self.service.lock().await.set_filter(filter.clone())?;
        self.emit(AppEvent::FilterChanged { filter });
        Ok(())
    }

    pub async fn visible(&self) -> Vec<Quote> {
        self.service
            .lock()
            .await
            .visible()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn categories(&self) -> Vec<String> {
        self.service.lock().await.categories()
    }

    pub async fn pick_random(&self) -> Option<Quote> {
        self.service.lock().await.pick_random().cloned()
    }

    /// Runs one sync cycle now and publishes its outcome.
    pub async fn sync_now(&self) -> SyncReport {
        let report = self.sync.run_cycle(&*self.service).await;
        self.publish_sync(&report);
        report
    }

    /// Syncs immediately, then every `period` until the handle is aborted.
    ///
    /// Late ticks are skipped rather than bunched. Periods shorter than
    /// [`MIN_SYNC_PERIOD`] are raised to it.
    pub fn spawn_periodic_sync(&self, period: Duration) -> JoinHandle<()> {
        let period = period.max(MIN_SYNC_PERIOD);
        let app = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(
                "event=sync_timer module=app status=start period_ms={}",
                period.as_millis()
            );
            loop {
                ticker.tick().await;
                app.sync_now().await;
            }
        })
    }

    fn publish_sync(&self, report: &SyncReport) {
        match report {
            SyncReport::Skipped => {}
            SyncReport::Applied(applied) => {
                if applied.outcome.changed {
                    self.emit(AppEvent::QuotesChanged {
                        total: applied.total,
                    });
                }
                if applied.filter_reset {
                    self.emit(AppEvent::FilterChanged {
                        filter: CategoryFilter::All,
                    });
                }
                self.emit(AppEvent::Notice(Notice::info(applied.outcome.note.clone())));
            }
            SyncReport::Failed(_) => {
                if let Some(note) = report.note() {
                    self.emit(AppEvent::Notice(Notice::warning(note)));
                }
            }
        }
    }

    fn spawn_post(&self, quote: Quote) -> JoinHandle<()> {
        let remote: Arc<dyn RemoteSource> = Arc::clone(self.sync.remote());
        let events = self.events.clone();
        tokio::spawn(async move {
            match remote.post_quote(&quote).await {
                Ok(ack) => {
                    info!(
                        "event=quote_post module=app status=ok endpoint={} http_status={}",
                        remote.endpoint(),
                        ack.status
                    );
                }
                Err(err) => {
                    warn!(
                        "event=quote_post module=app status=error endpoint={} error_kind={} error={}",
                        remote.endpoint(),
                        err.kind(),
                        err
                    );
                    let _ = events.send(AppEvent::Notice(Notice::warning(
                        "Quote saved locally but could not be posted to the server.",
                    )));
                }
            }
        })
    }

    fn emit(&self, event: AppEvent) {
        let _ = self.events.send(event);
    }
}
