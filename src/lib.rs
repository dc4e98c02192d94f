//! Course Ledger - course rating store with host-injected collaborators
//!
//! This crate provides a rating ledger recording one rating per
//! (sender, course) pair with update-in-place, linear-scan queries, and
//! per-course averages, behind host abstractions for identity, persistence,
//! and entry-point dispatch.

pub mod config;
pub mod error;
pub mod host;
pub mod metrics;
pub mod service;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LedgerError, Result};
pub use types::*;

// Re-export key components
pub use host::{CallDispatcher, CallHandler};
pub use store::{InMemoryLedger, RatingBook, RatingLedger};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
