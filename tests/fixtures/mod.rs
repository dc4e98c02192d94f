//! Test fixtures and fault-injecting implementations for integration testing

use course_ledger::error::LedgerError;
use course_ledger::host::calls::{CallRequest, ADD_RATING_METHOD};
use course_ledger::host::context::StaticCallContext;
use course_ledger::host::dispatch::CallDispatcher;
use course_ledger::metrics::MetricsCollector;
use course_ledger::store::book::RatingBook;
use course_ledger::store::ledger::{InMemoryLedger, RatingLedger};
use course_ledger::types::Rating;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Ledger that starts failing after a fixed number of operations
///
/// Models the host aborting calls once a resource ceiling is hit.
pub struct FlakyLedger {
    inner: InMemoryLedger,
    fail_after: usize,
    operations: AtomicUsize,
}

impl FlakyLedger {
    pub fn new(fail_after: usize) -> Self {
        Self {
            inner: InMemoryLedger::new("r"),
            fail_after,
            operations: AtomicUsize::new(0),
        }
    }

    fn guard(&self) -> course_ledger::error::Result<()> {
        if self.operations.fetch_add(1, Ordering::SeqCst) >= self.fail_after {
            return Err(LedgerError::StorageUnavailable {
                message: "Host aborted the call: resource ceiling reached".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl RatingLedger for FlakyLedger {
    fn len(&self) -> course_ledger::error::Result<usize> {
        self.guard()?;
        self.inner.len()
    }

    fn get(&self, index: usize) -> course_ledger::error::Result<Option<Rating>> {
        self.guard()?;
        self.inner.get(index)
    }

    fn push(&self, record: Rating) -> course_ledger::error::Result<()> {
        self.guard()?;
        self.inner.push(record)
    }

    fn replace(&self, index: usize, record: Rating) -> course_ledger::error::Result<()> {
        self.guard()?;
        self.inner.replace(index, record)
    }

    fn snapshot(&self) -> course_ledger::error::Result<Vec<Rating>> {
        self.guard()?;
        self.inner.snapshot()
    }
}

/// Complete in-process system: one book, shared metrics
pub struct TestSystem {
    pub book: Arc<RatingBook>,
    pub metrics: Arc<MetricsCollector>,
}

impl TestSystem {
    pub fn new() -> Self {
        Self::with_ledger(Arc::new(InMemoryLedger::new("r")))
    }

    pub fn with_ledger(ledger: Arc<dyn RatingLedger>) -> Self {
        let metrics = Arc::new(MetricsCollector::new().expect("Failed to create collector"));
        let book = Arc::new(RatingBook::new(ledger));
        Self { book, metrics }
    }

    /// Dispatcher bound to the given attested sender
    pub fn dispatcher_for(&self, sender: &str) -> CallDispatcher {
        CallDispatcher::new(
            self.book.clone(),
            Arc::new(StaticCallContext::new(sender)),
            self.metrics.clone(),
        )
    }
}

impl Default for TestSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an addRating call request
pub fn add_request(course_id: &str, rate: f64, message: &str) -> CallRequest {
    CallRequest::new(
        ADD_RATING_METHOD,
        json!({"courseId": course_id, "rate": rate, "message": message}),
    )
}
