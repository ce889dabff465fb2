//! Quote domain model.
//!
//! # Responsibility
//! - Define the canonical `{text, category}` record.
//! - Enforce non-empty fields on construction and deserialization.
//!
//! # Invariants
//! - `text` and `category` are trimmed and never empty.
//! - No category collides with the synthetic `all` selection.
//! - Merge identity is the `text` value; there is no separate ID.

use crate::model::book::ALL_CATEGORIES;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One quote record.
///
/// Fields are public to keep wire/persistence mapping trivial; callers that
/// build a `Quote` by hand should run [`Quote::validate`] before persisting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "QuoteWire")]
pub struct Quote {
    pub text: String,
    pub category: String,
}

/// Validation errors for quote fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteValidationError {
    EmptyText,
    EmptyCategory,
    /// Category equals the reserved `all` selection (any case).
    ReservedCategory,
}

impl Display for QuoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "quote text cannot be empty"),
            Self::EmptyCategory => write!(f, "quote category cannot be empty"),
            Self::ReservedCategory => {
                write!(f, "quote category `{ALL_CATEGORIES}` is reserved")
            }
        }
    }
}

impl Error for QuoteValidationError {}

impl Quote {
    /// Creates a quote from raw user input.
    ///
    /// Both fields are trimmed first, matching the add form behaviour.
    ///
    /// # Errors
    /// - `EmptyText` when `text` is blank.
    /// - `EmptyCategory` when `category` is blank.
    /// - `ReservedCategory` when `category` is `all`.
    pub fn new(
        text: impl AsRef<str>,
        category: impl AsRef<str>,
    ) -> Result<Self, QuoteValidationError> {
        let quote = Self {
            text: text.as_ref().trim().to_string(),
            category: category.as_ref().trim().to_string(),
        };
        quote.validate()?;
        Ok(quote)
    }

    /// Checks field invariants without mutating the record.
    pub fn validate(&self) -> Result<(), QuoteValidationError> {
        if self.text.trim().is_empty() {
            return Err(QuoteValidationError::EmptyText);
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(QuoteValidationError::EmptyCategory);
        }
        if category.eq_ignore_ascii_case(ALL_CATEGORIES) {
            return Err(QuoteValidationError::ReservedCategory);
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct QuoteWire {
    text: String,
    category: String,
}

impl TryFrom<QuoteWire> for Quote {
    type Error = QuoteValidationError;

    fn try_from(value: QuoteWire) -> Result<Self, Self::Error> {
        Quote::new(value.text, value.category)
    }
}

/// Seed quotes shipped with the first release of the widget.
pub fn default_quotes() -> Vec<Quote> {
    [
        (
            "The only way to do great work is to love what you do.",
            "Inspiration",
        ),
        (
            "Strive not to be a success, but rather to be of value.",
            "Life",
        ),
        (
            "The mind is everything. What you think you become.",
            "Philosophy",
        ),
        (
            "JavaScript is the future of web development.",
            "Technology",
        ),
    ]
    .into_iter()
    .map(|(text, category)| Quote {
        text: text.to_string(),
        category: category.to_string(),
    })
    .collect()
}

/// Returns a display label with the first character uppercased.
pub fn display_category(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{default_quotes, display_category, Quote, QuoteValidationError};

    #[test]
    fn new_trims_fields() {
        let quote = Quote::new("  stay hungry  ", " life ").unwrap();
        assert_eq!(quote.text, "stay hungry");
        assert_eq!(quote.category, "life");
    }

    #[test]
    fn new_rejects_blank_fields() {
        assert_eq!(
            Quote::new("   ", "life").unwrap_err(),
            QuoteValidationError::EmptyText
        );
        assert_eq!(
            Quote::new("text", "").unwrap_err(),
            QuoteValidationError::EmptyCategory
        );
    }

    #[test]
    fn new_rejects_reserved_all_category() {
        assert_eq!(
            Quote::new("text", " all ").unwrap_err(),
            QuoteValidationError::ReservedCategory
        );
        assert_eq!(
            Quote::new("text", "ALL").unwrap_err(),
            QuoteValidationError::ReservedCategory
        );
        assert!(Quote::new("text", "allergies").is_ok());
    }

    #[test]
    fn default_quotes_are_valid() {
        let quotes = default_quotes();
        assert_eq!(quotes.len(), 4);
        assert!(quotes.iter().all(|quote| quote.validate().is_ok()));
    }

    #[test]
    fn display_category_capitalizes_first_char() {
        assert_eq!(display_category("all"), "All");
        assert_eq!(display_category("éte"), "Éte");
        assert_eq!(display_category(""), "");
    }
}
