//! Rating ledger interface and implementations
//!
//! This module defines the interface for the host-supplied ordered durable
//! sequence of rating records, with an in-memory implementation and a
//! call-recording test double.

use crate::error::LedgerError;
use crate::types::Rating;
use std::sync::RwLock;

/// Trait for the ordered durable rating sequence
///
/// The host platform guarantees durability and per-call exclusive access;
/// implementations only need index-based read, append, and replace.
pub trait RatingLedger: Send + Sync {
    /// Number of records currently stored
    fn len(&self) -> crate::error::Result<usize>;

    /// Whether the ledger holds no records
    fn is_empty(&self) -> crate::error::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Get the record at the given index, if any
    fn get(&self, index: usize) -> crate::error::Result<Option<Rating>>;

    /// Append a record to the end of the sequence
    fn push(&self, record: Rating) -> crate::error::Result<()>;

    /// Replace the record at the given index in place
    fn replace(&self, index: usize, record: Rating) -> crate::error::Result<()>;

    /// Full copy of the sequence in insertion order
    fn snapshot(&self) -> crate::error::Result<Vec<Rating>>;
}

/// In-memory ledger implementation
///
/// Stands in for the host's persistent vector; the key prefix mirrors the
/// prefix the host keys the durable sequence under.
#[derive(Debug)]
pub struct InMemoryLedger {
    key_prefix: String,
    records: RwLock<Vec<Rating>>,
}

impl InMemoryLedger {
    /// Create a new in-memory ledger under the given key prefix
    pub fn new(key_prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            records: RwLock::new(Vec::new()),
        }
    }

    /// The key prefix this ledger is stored under
    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new("r")
    }
}

impl RatingLedger for InMemoryLedger {
    fn len(&self) -> crate::error::Result<usize> {
        let records = self
            .records
            .read()
            .map_err(|_| LedgerError::StorageUnavailable {
                message: "Failed to acquire ledger read lock".to_string(),
            })?;

        Ok(records.len())
    }

    fn get(&self, index: usize) -> crate::error::Result<Option<Rating>> {
        let records = self
            .records
            .read()
            .map_err(|_| LedgerError::StorageUnavailable {
                message: "Failed to acquire ledger read lock".to_string(),
            })?;

        Ok(records.get(index).cloned())
    }

    fn push(&self, record: Rating) -> crate::error::Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| LedgerError::StorageUnavailable {
                message: "Failed to acquire ledger write lock".to_string(),
            })?;

        records.push(record);
        Ok(())
    }

    fn replace(&self, index: usize, record: Rating) -> crate::error::Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| LedgerError::StorageUnavailable {
                message: "Failed to acquire ledger write lock".to_string(),
            })?;

        if index >= records.len() {
            return Err(LedgerError::InternalError {
                message: format!(
                    "Replace index {} out of bounds (ledger holds {} records)",
                    index,
                    records.len()
                ),
            }
            .into());
        }

        records[index] = record;
        Ok(())
    }

    fn snapshot(&self) -> crate::error::Result<Vec<Rating>> {
        let records = self
            .records
            .read()
            .map_err(|_| LedgerError::StorageUnavailable {
                message: "Failed to acquire ledger read lock".to_string(),
            })?;

        Ok(records.clone())
    }
}

/// Ledger test double that records every mutation (for testing)
#[derive(Debug, Default)]
pub struct RecordingLedger {
    inner: InMemoryLedger,
    push_calls: RwLock<Vec<Rating>>,
    replace_calls: RwLock<Vec<(usize, Rating)>>,
}

impl RecordingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all push calls made (for testing)
    pub fn get_push_calls(&self) -> Vec<Rating> {
        self.push_calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Get all replace calls made (for testing)
    pub fn get_replace_calls(&self) -> Vec<(usize, Rating)> {
        self.replace_calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Clear recorded calls (for testing)
    pub fn clear_calls(&self) {
        if let Ok(mut calls) = self.push_calls.write() {
            calls.clear();
        }
        if let Ok(mut calls) = self.replace_calls.write() {
            calls.clear();
        }
    }

    /// Preset records without recording the pushes (for testing)
    pub fn preset_records(&self, records: Vec<Rating>) -> crate::error::Result<()> {
        for record in records {
            self.inner.push(record)?;
        }
        Ok(())
    }
}

impl RatingLedger for RecordingLedger {
    fn len(&self) -> crate::error::Result<usize> {
        self.inner.len()
    }

    fn get(&self, index: usize) -> crate::error::Result<Option<Rating>> {
        self.inner.get(index)
    }

    fn push(&self, record: Rating) -> crate::error::Result<()> {
        if let Ok(mut calls) = self.push_calls.write() {
            calls.push(record.clone());
        }

        self.inner.push(record)
    }

    fn replace(&self, index: usize, record: Rating) -> crate::error::Result<()> {
        if let Ok(mut calls) = self.replace_calls.write() {
            calls.push((index, record.clone()));
        }

        self.inner.replace(index, record)
    }

    fn snapshot(&self) -> crate::error::Result<Vec<Rating>> {
        self.inner.snapshot()
    }
}
