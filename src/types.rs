//! Common types used throughout the course ledger service

use serde::{Deserialize, Serialize};

/// Identity of a calling principal, attested by the host context
pub type AccountId = String;

/// Identifier of a rated course
pub type CourseId = String;

/// One user's evaluation of one course
///
/// Wire shape uses camelCase field names (`courseId`), matching the JSON the
/// original contract host serializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub sender: AccountId,
    pub course_id: CourseId,
    pub rate: i32,
    pub message: String,
}

impl Rating {
    /// Create a rating record; the floating rate is truncated toward zero
    pub fn new(
        sender: impl Into<AccountId>,
        course_id: impl Into<CourseId>,
        rate: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            course_id: course_id.into(),
            rate: crate::utils::truncate_rate(rate),
            message: message.into(),
        }
    }

    /// Check whether this record belongs to the given (course, sender) pair
    pub fn matches(&self, course_id: &str, sender: &str) -> bool {
        self.course_id == course_id && self.sender == sender
    }
}

/// Which branch a rating submission took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingOutcome {
    Submitted,
    Updated,
}

impl RatingOutcome {
    /// Human-readable status string returned to the caller
    pub fn status_message(&self) -> &'static str {
        match self {
            RatingOutcome::Submitted => "Rating submitted successfully.",
            RatingOutcome::Updated => "Rating updated successfully.",
        }
    }
}

impl std::fmt::Display for RatingOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.status_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_construction_truncates_rate() {
        let rating = Rating::new("alice.test", "course-1", 4.9, "solid");
        assert_eq!(rating.rate, 4);

        let negative = Rating::new("alice.test", "course-1", -2.7, "");
        assert_eq!(negative.rate, -2);
    }

    #[test]
    fn test_rating_matches_pair() {
        let rating = Rating::new("alice.test", "course-1", 5.0, "");
        assert!(rating.matches("course-1", "alice.test"));
        assert!(!rating.matches("course-2", "alice.test"));
        assert!(!rating.matches("course-1", "bob.test"));
    }

    #[test]
    fn test_rating_wire_shape_is_camel_case() {
        let rating = Rating::new("alice.test", "course-1", 5.0, "great");
        let json = serde_json::to_value(&rating).unwrap();

        assert_eq!(json["courseId"], "course-1");
        assert_eq!(json["sender"], "alice.test");
        assert_eq!(json["rate"], 5);
        assert_eq!(json["message"], "great");
    }

    #[test]
    fn test_outcome_status_messages() {
        assert_eq!(
            RatingOutcome::Submitted.to_string(),
            "Rating submitted successfully."
        );
        assert_eq!(
            RatingOutcome::Updated.to_string(),
            "Rating updated successfully."
        );
    }
}
