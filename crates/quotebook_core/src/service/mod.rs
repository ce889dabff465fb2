//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate pure book transitions with repository persistence.
//! - Keep presentation layers decoupled from storage details.

pub mod quote_service;
pub mod transfer;
