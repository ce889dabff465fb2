//! Remote reconciliation.
//!
//! # Responsibility
//! - Define the remote quote source boundary and its mock.
//! - Decide how remote data folds into local data.
//! - Drive one-at-a-time sync cycles with optional retry.
//!
//! # Invariants
//! - Only `engine` touches the store; `reconcile` is pure.

pub mod engine;
pub mod reconcile;
pub mod remote;
