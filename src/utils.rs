//! Utility functions for the course ledger service

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique call ID for reply correlation
pub fn generate_call_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Truncate a floating rate toward zero, the way the contract host coerces
/// numeric arguments to i32 (saturating at the i32 range)
pub fn truncate_rate(rate: f64) -> i32 {
    rate as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_call_ids() {
        let id1 = generate_call_id();
        let id2 = generate_call_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_truncate_rate_toward_zero() {
        assert_eq!(truncate_rate(4.0), 4);
        assert_eq!(truncate_rate(4.9), 4);
        assert_eq!(truncate_rate(-4.9), -4);
        assert_eq!(truncate_rate(0.0), 0);
    }

    #[test]
    fn test_truncate_rate_saturates() {
        assert_eq!(truncate_rate(f64::MAX), i32::MAX);
        assert_eq!(truncate_rate(f64::MIN), i32::MIN);
        assert_eq!(truncate_rate(f64::NAN), 0);
    }
}
