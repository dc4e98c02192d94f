//! The rating book: insert-or-update and queries over the rating ledger
//!
//! This module provides the core RatingBook that answers every ledger
//! operation with a single linear scan, matching the documented behavior of
//! the contract it models.

use crate::error::LedgerError;
use crate::store::ledger::RatingLedger;
use crate::types::{Rating, RatingOutcome};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Statistics about rating book operations
#[derive(Debug, Clone, Default)]
pub struct RatingBookStats {
    /// Total number of first-time submissions
    pub ratings_submitted: u64,
    /// Total number of in-place updates
    pub ratings_updated: u64,
    /// Total number of queries served
    pub queries_served: u64,
    /// Current number of records in the ledger
    pub records_total: usize,
}

/// The process-wide rating book
///
/// Holds the injected ledger and enforces the one-record-per-(sender, course)
/// invariant procedurally in `add_rating`. All operations are single-pass
/// scans; the host serializes calls, so no locking beyond the ledger's own
/// interior mutability is required.
pub struct RatingBook {
    ledger: Arc<dyn RatingLedger>,
    stats: RwLock<RatingBookStats>,
}

impl RatingBook {
    /// Create a new rating book over the given ledger
    pub fn new(ledger: Arc<dyn RatingLedger>) -> Self {
        Self {
            ledger,
            stats: RwLock::new(RatingBookStats::default()),
        }
    }

    /// Store or update a rating for the calling sender
    ///
    /// Scans the full sequence for a record matching (course, sender). If one
    /// exists, its rate and message are overwritten in place at the original
    /// index; otherwise a new record is appended. The rate is truncated to an
    /// integer and deliberately not range-checked.
    pub fn add_rating(
        &self,
        sender: &str,
        course_id: &str,
        rate: f64,
        message: &str,
    ) -> crate::error::Result<RatingOutcome> {
        let len = self.ledger.len()?;

        for index in 0..len {
            if let Some(existing) = self.ledger.get(index)? {
                if existing.matches(course_id, sender) {
                    let updated = Rating::new(sender, course_id, rate, message);
                    self.ledger.replace(index, updated)?;

                    self.record_mutation(RatingOutcome::Updated)?;
                    info!(
                        "Rating updated - sender: '{}', course: '{}', rate: {}, index: {}",
                        sender,
                        course_id,
                        crate::utils::truncate_rate(rate),
                        index
                    );
                    return Ok(RatingOutcome::Updated);
                }
            }
        }

        self.ledger
            .push(Rating::new(sender, course_id, rate, message))?;

        self.record_mutation(RatingOutcome::Submitted)?;
        info!(
            "Rating submitted - sender: '{}', course: '{}', rate: {}",
            sender,
            course_id,
            crate::utils::truncate_rate(rate)
        );
        Ok(RatingOutcome::Submitted)
    }

    /// Check whether the given sender has already rated the given course
    pub fn has_user_rated(&self, course_id: &str, sender: &str) -> crate::error::Result<bool> {
        self.record_query()?;

        let len = self.ledger.len()?;
        for index in 0..len {
            if let Some(record) = self.ledger.get(index)? {
                if record.matches(course_id, sender) {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    /// All ratings for the given course, in insertion order
    pub fn ratings_for_course(&self, course_id: &str) -> crate::error::Result<Vec<Rating>> {
        self.record_query()?;
        self.collect_for_course(course_id)
    }

    /// Arithmetic mean of the rates for the given course; 0.0 when unrated
    pub fn average_rating(&self, course_id: &str) -> crate::error::Result<f64> {
        self.record_query()?;

        let ratings = self.collect_for_course(course_id)?;
        if ratings.is_empty() {
            return Ok(0.0);
        }

        let sum: f64 = ratings.iter().map(|r| f64::from(r.rate)).sum();
        let average = sum / ratings.len() as f64;

        debug!(
            "Average computed - course: '{}', samples: {}, average: {}",
            course_id,
            ratings.len(),
            average
        );
        Ok(average)
    }

    /// The given sender's rating for the given course, if any
    pub fn user_rating_for_course(
        &self,
        course_id: &str,
        sender: &str,
    ) -> crate::error::Result<Option<Rating>> {
        self.record_query()?;

        let len = self.ledger.len()?;
        for index in 0..len {
            if let Some(record) = self.ledger.get(index)? {
                if record.matches(course_id, sender) {
                    return Ok(Some(record));
                }
            }
        }

        Ok(None)
    }

    /// Full copy of the underlying sequence, for external inspection
    pub fn all_ratings(&self) -> crate::error::Result<Vec<Rating>> {
        self.record_query()?;
        self.ledger.snapshot()
    }

    /// Current operation statistics
    pub fn stats(&self) -> crate::error::Result<RatingBookStats> {
        let mut stats = self
            .stats
            .read()
            .map_err(|_| LedgerError::InternalError {
                message: "Failed to acquire stats read lock".to_string(),
            })?
            .clone();

        stats.records_total = self.ledger.len()?;
        Ok(stats)
    }

    fn collect_for_course(&self, course_id: &str) -> crate::error::Result<Vec<Rating>> {
        let mut data = Vec::new();

        let len = self.ledger.len()?;
        for index in 0..len {
            if let Some(record) = self.ledger.get(index)? {
                if record.course_id == course_id {
                    data.push(record);
                }
            }
        }

        Ok(data)
    }

    fn record_mutation(&self, outcome: RatingOutcome) -> crate::error::Result<()> {
        let mut stats = self.stats.write().map_err(|_| LedgerError::InternalError {
            message: "Failed to acquire stats write lock".to_string(),
        })?;

        match outcome {
            RatingOutcome::Submitted => stats.ratings_submitted += 1,
            RatingOutcome::Updated => stats.ratings_updated += 1,
        }
        Ok(())
    }

    fn record_query(&self) -> crate::error::Result<()> {
        let mut stats = self.stats.write().map_err(|_| LedgerError::InternalError {
            message: "Failed to acquire stats write lock".to_string(),
        })?;

        stats.queries_served += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ledger::{InMemoryLedger, RecordingLedger};

    fn create_test_book() -> RatingBook {
        RatingBook::new(Arc::new(InMemoryLedger::new("r")))
    }

    #[test]
    fn test_first_rating_is_submitted() {
        let book = create_test_book();

        let outcome = book
            .add_rating("alice.test", "course-1", 4.0, "great")
            .unwrap();

        assert_eq!(outcome, RatingOutcome::Submitted);
        assert_eq!(outcome.to_string(), "Rating submitted successfully.");
        assert!(book.has_user_rated("course-1", "alice.test").unwrap());
    }

    #[test]
    fn test_second_rating_updates_in_place() {
        let book = create_test_book();

        book.add_rating("alice.test", "course-1", 4.0, "great")
            .unwrap();
        let outcome = book
            .add_rating("alice.test", "course-1", 5.0, "even better")
            .unwrap();

        assert_eq!(outcome, RatingOutcome::Updated);
        assert_eq!(outcome.to_string(), "Rating updated successfully.");

        let stored = book
            .user_rating_for_course("course-1", "alice.test")
            .unwrap()
            .unwrap();
        assert_eq!(stored.rate, 5);
        assert_eq!(stored.message, "even better");

        // Still exactly one record for the pair
        assert_eq!(book.all_ratings().unwrap().len(), 1);
    }

    #[test]
    fn test_update_preserves_insertion_order() {
        let book = create_test_book();

        book.add_rating("alice.test", "course-1", 4.0, "").unwrap();
        book.add_rating("bob.test", "course-1", 3.0, "").unwrap();
        book.add_rating("alice.test", "course-1", 1.0, "changed")
            .unwrap();

        let records = book.ratings_for_course("course-1").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sender, "alice.test");
        assert_eq!(records[0].rate, 1);
        assert_eq!(records[1].sender, "bob.test");
    }

    #[test]
    fn test_update_issues_replace_at_original_index() {
        let ledger = Arc::new(RecordingLedger::new());
        let book = RatingBook::new(ledger.clone());

        book.add_rating("alice.test", "course-1", 4.0, "").unwrap();
        book.add_rating("bob.test", "course-1", 3.0, "").unwrap();
        book.add_rating("alice.test", "course-1", 5.0, "").unwrap();

        assert_eq!(ledger.get_push_calls().len(), 2);
        let replaces = ledger.get_replace_calls();
        assert_eq!(replaces.len(), 1);
        assert_eq!(replaces[0].0, 0);
    }

    #[test]
    fn test_average_of_unrated_course_is_zero() {
        let book = create_test_book();
        assert_eq!(book.average_rating("course-1").unwrap(), 0.0);
    }

    #[test]
    fn test_average_over_multiple_raters() {
        let book = create_test_book();

        book.add_rating("alice.test", "course-1", 3.0, "").unwrap();
        book.add_rating("bob.test", "course-1", 5.0, "").unwrap();

        assert_eq!(book.average_rating("course-1").unwrap(), 4.0);
    }

    #[test]
    fn test_average_ignores_other_courses() {
        let book = create_test_book();

        book.add_rating("alice.test", "course-1", 2.0, "").unwrap();
        book.add_rating("alice.test", "course-2", 5.0, "").unwrap();

        assert_eq!(book.average_rating("course-1").unwrap(), 2.0);
        assert_eq!(book.average_rating("course-2").unwrap(), 5.0);
    }

    #[test]
    fn test_ratings_for_course_filters_and_orders() {
        let book = create_test_book();

        book.add_rating("alice.test", "course-1", 4.0, "").unwrap();
        book.add_rating("bob.test", "course-2", 2.0, "").unwrap();
        book.add_rating("carol.test", "course-1", 5.0, "").unwrap();

        let records = book.ratings_for_course("course-1").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sender, "alice.test");
        assert_eq!(records[1].sender, "carol.test");
    }

    #[test]
    fn test_user_rating_lookup_absent() {
        let book = create_test_book();
        assert!(book
            .user_rating_for_course("course-1", "alice.test")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_rate_is_not_range_checked() {
        let book = create_test_book();

        book.add_rating("alice.test", "course-1", -10.0, "")
            .unwrap();
        book.add_rating("bob.test", "course-1", 1000000.0, "")
            .unwrap();

        let records = book.ratings_for_course("course-1").unwrap();
        assert_eq!(records[0].rate, -10);
        assert_eq!(records[1].rate, 1_000_000);
    }

    #[test]
    fn test_rate_is_truncated_on_submit_and_update() {
        let book = create_test_book();

        book.add_rating("alice.test", "course-1", 4.9, "").unwrap();
        let stored = book
            .user_rating_for_course("course-1", "alice.test")
            .unwrap()
            .unwrap();
        assert_eq!(stored.rate, 4);

        book.add_rating("alice.test", "course-1", 2.7, "").unwrap();
        let stored = book
            .user_rating_for_course("course-1", "alice.test")
            .unwrap()
            .unwrap();
        assert_eq!(stored.rate, 2);
    }

    #[test]
    fn test_stats_track_operations() {
        let book = create_test_book();

        book.add_rating("alice.test", "course-1", 4.0, "").unwrap();
        book.add_rating("alice.test", "course-1", 5.0, "").unwrap();
        book.add_rating("bob.test", "course-1", 3.0, "").unwrap();
        let _ = book.average_rating("course-1").unwrap();
        let _ = book.has_user_rated("course-1", "alice.test").unwrap();

        let stats = book.stats().unwrap();
        assert_eq!(stats.ratings_submitted, 2);
        assert_eq!(stats.ratings_updated, 1);
        assert_eq!(stats.queries_served, 2);
        assert_eq!(stats.records_total, 2);
    }

    #[test]
    fn test_same_course_different_senders_both_stored() {
        let book = create_test_book();

        book.add_rating("alice.test", "course-1", 4.0, "").unwrap();
        book.add_rating("bob.test", "course-1", 4.0, "").unwrap();

        assert_eq!(book.all_ratings().unwrap().len(), 2);
    }

    #[test]
    fn test_same_sender_different_courses_both_stored() {
        let book = create_test_book();

        book.add_rating("alice.test", "course-1", 4.0, "").unwrap();
        book.add_rating("alice.test", "course-2", 4.0, "").unwrap();

        assert_eq!(book.all_ratings().unwrap().len(), 2);
    }
}
