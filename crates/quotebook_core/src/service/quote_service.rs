//! Quote book use-case service.
//!
//! # Responsibility
//! - Provide add/import/export/filter/pick entry points.
//! - Persist every successful mutation through the repository.
//! - Apply reconcile outcomes produced by the sync layer.
//!
//! # Invariants
//! - Mutations persist first and update memory only on success, so a failed
//!   write never leaves memory and storage out of step.
//! - Import and add are all-or-nothing.
//! - The persisted filter is restored as `all` when its category is gone.

use crate::error::ErrorKind;
use crate::model::book::{CategoryFilter, QuoteBook};
use crate::model::quote::{default_quotes, Quote, QuoteValidationError};
use crate::repo::quote_repo::QuoteRepository;
use crate::repo::RepoError;
use crate::service::transfer::{export_quotes, parse_import, ImportError};
use crate::sync::reconcile::{reconcile, MergePolicy, ReconcileOutcome};
use log::{info, warn};
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for quote book use-cases.
#[derive(Debug)]
pub enum QuoteServiceError {
    /// Empty text or category on add.
    Validation(QuoteValidationError),
    /// Import payload rejected before any mutation.
    Import(ImportError),
    /// Export serialization failed.
    Export(serde_json::Error),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl QuoteServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Import(err) => err.kind(),
            Self::Export(_) => ErrorKind::Parse,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }
}

impl Display for QuoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Import(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "failed to export quotes: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for QuoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Import(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<QuoteValidationError> for QuoteServiceError {
    fn from(value: QuoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ImportError> for QuoteServiceError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<RepoError> for QuoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of applying a reconcile outcome to the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedSync {
    pub outcome: ReconcileOutcome,
    /// Set when the active filter no longer matched and fell back to `all`.
    pub filter_reset: bool,
    /// Book size right after the merge.
    pub total: usize,
}

/// Quote book facade over a repository implementation.
pub struct QuoteService<R: QuoteRepository> {
    repo: R,
    book: QuoteBook,
}

impl<R: QuoteRepository> QuoteService<R> {
    /// Loads persisted quotes and filter selection.
    ///
    /// A stale persisted filter is rewritten as `all` so a later add cannot
    /// revive it.
    ///
    /// # Errors
    /// - Returns `Repo` when stored data cannot be read or decoded.
    pub fn load(repo: R) -> Result<Self, QuoteServiceError> {
        let quotes = repo.load_quotes()?;
        let filter = repo.load_filter()?;
        let book = QuoteBook::restore(quotes, filter.clone());
        if *book.filter() != filter {
            repo.save_filter(book.filter())?;
            info!("event=filter_reset module=service status=ok reason=stale_on_load");
        }
        info!(
            "event=book_load module=service status=ok quotes={} filter_is_all={}",
            book.len(),
            *book.filter() == CategoryFilter::All
        );
        Ok(Self { repo, book })
    }

    pub fn book(&self) -> &QuoteBook {
        &self.book
    }

    pub fn quotes(&self) -> &[Quote] {
        self.book.quotes()
    }

    pub fn filter(&self) -> &CategoryFilter {
        self.book.filter()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn categories(&self) -> Vec<String> {
        self.book.categories()
    }

    pub fn visible(&self) -> Vec<&Quote> {
        self.book.visible()
    }

    /// Seeds the built-in quotes when the book is empty.
    ///
    /// Returns whether seeding happened.
    pub fn seed_defaults_if_empty(&mut self) -> Result<bool, QuoteServiceError> {
        if !self.book.is_empty() {
            return Ok(false);
        }
        self.commit(default_quotes())?;
        info!(
            "event=book_seed module=service status=ok quotes={}",
            self.book.len()
        );
        Ok(true)
    }

    /// Validates and appends one quote.
    pub fn add(&mut self, text: &str, category: &str) -> Result<Quote, QuoteServiceError> {
        let quote = match Quote::new(text, category) {
            Ok(quote) => quote,
            Err(err) => {
                warn!("event=quote_add module=service status=rejected reason={err}");
                return Err(err.into());
            }
        };

        let mut next = self.book.quotes().to_vec();
        next.push(quote.clone());
        self.commit(next)?;
        info!(
            "event=quote_add module=service status=ok total={}",
            self.book.len()
        );
        Ok(quote)
    }

    /// Parses a JSON payload and appends every entry.
    ///
    /// Returns the number of imported quotes.
    pub fn import_json(&mut self, payload: &str) -> Result<usize, QuoteServiceError> {
        let quotes = match parse_import(payload) {
            Ok(quotes) => quotes,
            Err(err) => {
                warn!(
                    "event=quote_import module=service status=rejected kind={}",
                    err.kind()
                );
                return Err(err.into());
            }
        };
        self.import_all(quotes)
    }

    /// Appends an already-parsed list of quotes.
    pub fn import_all(&mut self, quotes: Vec<Quote>) -> Result<usize, QuoteServiceError> {
        for quote in &quotes {
            quote.validate()?;
        }

        let imported = quotes.len();
        let mut next = self.book.quotes().to_vec();
        next.extend(quotes);
        self.commit(next)?;
        info!(
            "event=quote_import module=service status=ok imported={imported} total={}",
            self.book.len()
        );
        Ok(imported)
    }

    /// Returns the pretty-printed JSON array of all quotes.
    pub fn export_json(&self) -> Result<String, QuoteServiceError> {
        export_quotes(self.book.quotes()).map_err(QuoteServiceError::Export)
    }

    /// Persists and activates a filter selection.
    pub fn set_filter(&mut self, filter: CategoryFilter) -> Result<(), QuoteServiceError> {
        self.repo.save_filter(&filter)?;
        self.book.set_filter(filter);
        Ok(())
    }

    /// Picks a random visible quote using the thread RNG.
    pub fn pick_random(&self) -> Option<&Quote> {
        self.pick_random_with(&mut rand::thread_rng())
    }

    pub fn pick_random_with<G: Rng + ?Sized>(&self, rng: &mut G) -> Option<&Quote> {
        self.book.pick_random(rng)
    }

    /// Reconciles `remote` against the current local list and persists a change.
    ///
    /// Unchanged outcomes perform no writes.
    pub fn apply_remote(
        &mut self,
        remote: &[Quote],
        policy: MergePolicy,
    ) -> Result<AppliedSync, QuoteServiceError> {
        let outcome = reconcile(self.book.quotes(), remote, policy);
        if !outcome.changed {
            return Ok(AppliedSync {
                outcome,
                filter_reset: false,
                total: self.book.len(),
            });
        }

        self.repo.save_quotes(&outcome.quotes)?;
        let filter_reset = self.book.replace_quotes(outcome.quotes.clone());
        // The merge is committed at this point; a stale `lastFilter` is
        // normalized again on the next load.
        if filter_reset {
            if let Err(err) = self.repo.save_filter(self.book.filter()) {
                warn!(
                    "event=filter_reset module=service status=error error_kind={} error={err}",
                    ErrorKind::Storage
                );
            }
        }
        Ok(AppliedSync {
            outcome,
            filter_reset,
            total: self.book.len(),
        })
    }

    fn commit(&mut self, next: Vec<Quote>) -> Result<(), QuoteServiceError> {
        self.repo.save_quotes(&next)?;
        self.book.set_quotes(next);
        Ok(())
    }
}
