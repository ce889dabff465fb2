//! Quote repository over the key-value store.
//!
//! # Responsibility
//! - Persist the quote list under `quotes` as a compact JSON array.
//! - Persist the filter selection under `lastFilter` as a plain string.
//!
//! # Invariants
//! - A missing `quotes` key reads as an empty list.
//! - A missing `lastFilter` key reads as `all`.

use crate::model::book::CategoryFilter;
use crate::model::quote::Quote;
use crate::repo::kv_store::KeyValueStore;
use crate::repo::{RepoError, RepoResult};

/// Storage key holding the serialized quote list.
pub const QUOTES_KEY: &str = "quotes";
/// Storage key holding the last selected category filter.
pub const LAST_FILTER_KEY: &str = "lastFilter";

/// Persistence contract for quote book state.
pub trait QuoteRepository {
    fn load_quotes(&self) -> RepoResult<Vec<Quote>>;
    fn save_quotes(&self, quotes: &[Quote]) -> RepoResult<()>;
    fn load_filter(&self) -> RepoResult<CategoryFilter>;
    fn save_filter(&self, filter: &CategoryFilter) -> RepoResult<()>;
}

/// Quote repository backed by any [`KeyValueStore`].
pub struct KvQuoteRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvQuoteRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> QuoteRepository for KvQuoteRepository<S> {
    fn load_quotes(&self) -> RepoResult<Vec<Quote>> {
        match self.store.get(QUOTES_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|err| {
                RepoError::InvalidData(format!("`{QUOTES_KEY}` is not a valid quote array: {err}"))
            }),
            None => Ok(Vec::new()),
        }
    }

    fn save_quotes(&self, quotes: &[Quote]) -> RepoResult<()> {
        let raw = serde_json::to_string(quotes).map_err(RepoError::Encode)?;
        self.store.put(QUOTES_KEY, &raw)
    }

    fn load_filter(&self) -> RepoResult<CategoryFilter> {
        Ok(self
            .store
            .get(LAST_FILTER_KEY)?
            .map(|raw| CategoryFilter::parse(&raw))
            .unwrap_or_default())
    }

    fn save_filter(&self, filter: &CategoryFilter) -> RepoResult<()> {
        self.store.put(LAST_FILTER_KEY, filter.as_str())
    }
}

/// SQLite-backed quote repository used by the app and CLI.
pub type SqliteQuoteRepository = KvQuoteRepository<crate::repo::kv_store::SqliteKeyValueStore>;
