//! Core domain logic for Quotebook.
//! This crate owns the quote book state, its persistence, and remote sync.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use app::{AppEvent, Notice, NoticeLevel, QuoteApp, MIN_SYNC_PERIOD, NOTICE_TTL};
pub use config::{ConfigError, QuotebookConfig, SyncConfig};
pub use error::ErrorKind;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::book::{CategoryFilter, QuoteBook, ALL_CATEGORIES};
pub use model::quote::{default_quotes, display_category, Quote, QuoteValidationError};
pub use repo::kv_store::{KeyValueStore, SqliteKeyValueStore};
pub use repo::quote_repo::{
    KvQuoteRepository, QuoteRepository, SqliteQuoteRepository, LAST_FILTER_KEY, QUOTES_KEY,
};
pub use repo::{RepoError, RepoResult};
pub use service::quote_service::{AppliedSync, QuoteService, QuoteServiceError};
pub use service::transfer::{export_quotes, parse_import, ImportError, EXPORT_FILE_NAME};
pub use sync::engine::{RetryPolicy, SyncEngine, SyncError, SyncReport, SyncState};
pub use sync::reconcile::{reconcile, MergePolicy, ReconcileOutcome};
pub use sync::remote::{
    default_server_quotes, LatencyRange, MockRemote, PostAck, RemoteError, RemoteSource,
    MOCK_SERVER_URL,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
