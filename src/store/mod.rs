//! Rating storage and the core ledger operations
//!
//! This module defines the ordered durable sequence abstraction the host
//! supplies, together with the rating book that answers queries and
//! mutations over it.

pub mod book;
pub mod ledger;

// Re-export commonly used types
pub use book::{RatingBook, RatingBookStats};
pub use ledger::{InMemoryLedger, RatingLedger, RecordingLedger};
