//! In-memory quote book state and derived views.
//!
//! # Responsibility
//! - Hold the ordered quote list and the active category filter.
//! - Derive the category index and the visible subset on demand.
//!
//! # Invariants
//! - Quote order is insertion order; nothing here sorts or deduplicates.
//! - The category index always starts with `"all"`.
//! - A restored filter that names no known category falls back to `All`.

use crate::model::quote::Quote;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// Synthetic category value that selects every quote.
pub const ALL_CATEGORIES: &str = "all";

/// Active category filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    /// Parses a persisted or user-supplied filter value.
    ///
    /// Blank input and `"all"` both map to [`CategoryFilter::All`].
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Category(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Category(name) => name.as_str(),
        }
    }

    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            Self::All => true,
            Self::Category(name) => quote.category == *name,
        }
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quote list plus filter selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteBook {
    quotes: Vec<Quote>,
    filter: CategoryFilter,
}

impl QuoteBook {
    /// Restores a book from persisted parts, normalizing a stale filter.
    pub fn restore(quotes: Vec<Quote>, filter: CategoryFilter) -> Self {
        let mut book = Self {
            quotes,
            filter: CategoryFilter::All,
        };
        book.filter = book.normalized(filter);
        book
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Returns `"all"` followed by unique categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::from([ALL_CATEGORIES]);
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        for quote in &self.quotes {
            if seen.insert(quote.category.as_str()) {
                categories.push(quote.category.clone());
            }
        }
        categories
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.quotes.iter().any(|quote| quote.category == category)
    }

    /// Quotes matching the active filter, in insertion order.
    pub fn visible(&self) -> Vec<&Quote> {
        self.quotes
            .iter()
            .filter(|quote| self.filter.matches(quote))
            .collect()
    }

    /// Picks one visible quote uniformly; `None` when nothing is visible.
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Quote> {
        self.visible().choose(rng).copied()
    }

    /// Sets the filter as given, even when no quote carries that category.
    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    /// Replaces the quote list, keeping the filter as is.
    ///
    /// Used for local additions, which can only grow the category set.
    pub fn set_quotes(&mut self, quotes: Vec<Quote>) {
        self.quotes = quotes;
    }

    /// Replaces the quote list and re-checks the filter.
    ///
    /// Returns `true` when the filter had to fall back to `All`.
    pub fn replace_quotes(&mut self, quotes: Vec<Quote>) -> bool {
        self.quotes = quotes;
        let previous = std::mem::take(&mut self.filter);
        self.filter = self.normalized(previous.clone());
        self.filter != previous
    }

    fn normalized(&self, filter: CategoryFilter) -> CategoryFilter {
        match filter {
            CategoryFilter::Category(name) if !self.has_category(&name) => CategoryFilter::All,
            other => other,
        }
    }
}
