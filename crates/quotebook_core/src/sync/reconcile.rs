//! Pure local/remote reconciliation.
//!
//! # Responsibility
//! - Decide how a fetched remote list folds into the local list.
//!
//! # Invariants
//! - `reconcile` performs no I/O and never reorders local quotes.
//! - Under `Additive`, local-only quotes are never dropped.
//! - Running the same inputs twice reaches a fixed point after one cycle.

use crate::model::quote::Quote;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Conflict policy applied when local and remote lists diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Append remote quotes whose text is absent locally.
    #[default]
    Additive,
    /// Replace local wholesale when length or any positional text differs.
    ServerOverwrite,
}

impl MergePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Additive => "additive",
            Self::ServerOverwrite => "server-overwrite",
        }
    }
}

impl Display for MergePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "additive" => Ok(Self::Additive),
            "server-overwrite" | "server_overwrite" | "overwrite" => Ok(Self::ServerOverwrite),
            other => Err(format!(
                "unsupported merge policy `{other}`; expected additive|server-overwrite"
            )),
        }
    }
}

/// Result of one reconcile decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// New local list; equal to the input local list when `changed` is false.
    pub quotes: Vec<Quote>,
    pub changed: bool,
    /// Number of remote quotes newly present locally.
    pub added: usize,
    /// Human-readable summary for the status banner.
    pub note: String,
}

/// Folds `remote` into `local` under `policy`.
pub fn reconcile(local: &[Quote], remote: &[Quote], policy: MergePolicy) -> ReconcileOutcome {
    match policy {
        MergePolicy::Additive => merge_additive(local, remote),
        MergePolicy::ServerOverwrite => overwrite_from_server(local, remote),
    }
}

fn merge_additive(local: &[Quote], remote: &[Quote]) -> ReconcileOutcome {
    let mut known: HashSet<&str> = local.iter().map(|quote| quote.text.as_str()).collect();
    let mut quotes = local.to_vec();
    for quote in remote {
        if known.insert(quote.text.as_str()) {
            quotes.push(quote.clone());
        }
    }

    let added = quotes.len() - local.len();
    let note = if added == 0 {
        "Local data is already up to date.".to_string()
    } else {
        format!("Synced {added} new quote(s) from server.")
    };
    ReconcileOutcome {
        quotes,
        changed: added > 0,
        added,
        note,
    }
}

fn overwrite_from_server(local: &[Quote], remote: &[Quote]) -> ReconcileOutcome {
    if !differs(local, remote) {
        return ReconcileOutcome {
            quotes: local.to_vec(),
            changed: false,
            added: 0,
            note: "Local data is already up to date.".to_string(),
        };
    }

    let local_texts: HashSet<&str> = local.iter().map(|quote| quote.text.as_str()).collect();
    let added = remote
        .iter()
        .filter(|quote| !local_texts.contains(quote.text.as_str()))
        .count();
    ReconcileOutcome {
        quotes: remote.to_vec(),
        changed: true,
        added,
        note: format!(
            "Server data replaced local data ({} quote(s)).",
            remote.len()
        ),
    }
}

/// Coarse difference test: length or positional text mismatch.
fn differs(local: &[Quote], remote: &[Quote]) -> bool {
    local.len() != remote.len()
        || local
            .iter()
            .zip(remote)
            .any(|(left, right)| left.text != right.text)
}
