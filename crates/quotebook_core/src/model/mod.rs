//! Domain model for the quote book.
//!
//! # Responsibility
//! - Define the quote record and the filterable book state.
//! - Keep state transitions pure; persistence happens in `service`.
//!
//! # Invariants
//! - Every stored quote has non-empty `text` and `category`.
//! - Derived views (categories, visible subset) are never persisted.

pub mod book;
pub mod quote;
