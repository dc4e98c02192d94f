//! Configuration management for the course-ledger service
//!
//! This module handles all configuration loading from environment variables,
//! validation, and default values for the ledger service.

pub mod app;
pub mod store;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use store::StoreSettings;
