//! Call envelope definitions and serialization
//!
//! Argument decoding and reply encoding are a host serialization concern;
//! this module gives them a concrete JSON shape so dispatch can be exercised
//! end to end without a live chain.

use crate::error::{LedgerError, Result};
use serde_json::Value;

/// Wire names of the contract entry points
pub const ADD_RATING_METHOD: &str = "addRating";
pub const HAS_USER_RATED_METHOD: &str = "hasUserRated";
pub const CONVERT_DATA_METHOD: &str = "convertData";
pub const GET_AVERAGE_RATING_METHOD: &str = "getAverageRating";
pub const GET_USER_RATING_METHOD: &str = "getUserRatingForCourse";
pub const LIST_WRITE_METHOD: &str = "listWrite";

/// All dispatchable method names
pub const METHODS: [&str; 6] = [
    ADD_RATING_METHOD,
    HAS_USER_RATED_METHOD,
    CONVERT_DATA_METHOD,
    GET_AVERAGE_RATING_METHOD,
    GET_USER_RATING_METHOD,
    LIST_WRITE_METHOD,
];

/// An external call as the host hands it to the dispatcher
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CallRequest {
    /// Entry-point name, e.g. `addRating`
    pub method: String,
    /// JSON-encoded arguments; an object for argful methods
    #[serde(default)]
    pub args: Value,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl CallRequest {
    /// Create a new call request
    pub fn new(method: impl Into<String>, args: Value) -> Self {
        Self {
            method: method.into(),
            args,
            timestamp: crate::utils::current_timestamp(),
        }
    }
}

/// Result of a dispatched call
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CallOutcome {
    Ok { result: Value },
    Error { message: String },
}

/// Reply envelope with correlation metadata
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CallReply {
    pub call_id: String,
    #[serde(flatten)]
    pub outcome: CallOutcome,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl CallReply {
    /// Build a successful reply
    pub fn ok(result: Value) -> Self {
        Self {
            call_id: crate::utils::generate_call_id().to_string(),
            outcome: CallOutcome::Ok { result },
            timestamp: crate::utils::current_timestamp(),
        }
    }

    /// Build an error reply
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            call_id: crate::utils::generate_call_id().to_string(),
            outcome: CallOutcome::Error {
                message: message.into(),
            },
            timestamp: crate::utils::current_timestamp(),
        }
    }

    /// Whether the call succeeded
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, CallOutcome::Ok { .. })
    }

    /// The result value of a successful reply, if any
    pub fn result(&self) -> Option<&Value> {
        match &self.outcome {
            CallOutcome::Ok { result } => Some(result),
            CallOutcome::Error { .. } => None,
        }
    }
}

/// Call serialization and validation utilities
pub struct CallUtils;

impl CallUtils {
    /// Serialize a call request to bytes
    pub fn serialize_request(request: &CallRequest) -> Result<Vec<u8>> {
        Self::validate_request(request)?;
        serde_json::to_vec(request).map_err(|e| {
            LedgerError::InternalError {
                message: format!("Failed to serialize call request: {}", e),
            }
            .into()
        })
    }

    /// Deserialize a call request from bytes
    pub fn deserialize_request(bytes: &[u8]) -> Result<CallRequest> {
        let request: CallRequest =
            serde_json::from_slice(bytes).map_err(|e| LedgerError::InvalidCall {
                reason: format!("Failed to deserialize call request: {}", e),
            })?;

        Self::validate_request(&request)?;
        Ok(request)
    }

    /// Validate a call request
    pub fn validate_request(request: &CallRequest) -> Result<()> {
        if request.method.is_empty() {
            return Err(LedgerError::InvalidCall {
                reason: "Method name cannot be empty".to_string(),
            }
            .into());
        }

        // addRating carries mandatory arguments the host must have encoded
        if request.method == ADD_RATING_METHOD {
            if request.args.get("courseId").and_then(Value::as_str).is_none() {
                return Err(LedgerError::InvalidCall {
                    reason: "addRating requires a string courseId argument".to_string(),
                }
                .into());
            }
            if request.args.get("rate").and_then(Value::as_f64).is_none() {
                return Err(LedgerError::InvalidCall {
                    reason: "addRating requires a numeric rate argument".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Serialize a reply to bytes
    pub fn serialize_reply(reply: &CallReply) -> Result<Vec<u8>> {
        serde_json::to_vec(reply).map_err(|e| {
            LedgerError::InternalError {
                message: format!("Failed to serialize call reply: {}", e),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_add_request() -> CallRequest {
        CallRequest::new(
            ADD_RATING_METHOD,
            json!({"courseId": "course-1", "rate": 4.0, "message": "great"}),
        )
    }

    #[test]
    fn test_request_serialization_roundtrip() {
        let request = create_add_request();
        let bytes = CallUtils::serialize_request(&request).unwrap();
        let deserialized = CallUtils::deserialize_request(&bytes).unwrap();

        assert_eq!(deserialized.method, ADD_RATING_METHOD);
        assert_eq!(deserialized.args["courseId"], "course-1");
        assert_eq!(deserialized.args["rate"], 4.0);
    }

    #[test]
    fn test_empty_method_rejected() {
        let request = CallRequest::new("", Value::Null);
        assert!(CallUtils::validate_request(&request).is_err());
    }

    #[test]
    fn test_add_rating_requires_course_and_rate() {
        let missing_course = CallRequest::new(ADD_RATING_METHOD, json!({"rate": 4.0}));
        assert!(CallUtils::validate_request(&missing_course).is_err());

        let missing_rate = CallRequest::new(ADD_RATING_METHOD, json!({"courseId": "course-1"}));
        assert!(CallUtils::validate_request(&missing_rate).is_err());

        let valid = CallRequest::new(
            ADD_RATING_METHOD,
            json!({"courseId": "course-1", "rate": 4.0}),
        );
        assert!(CallUtils::validate_request(&valid).is_ok());
    }

    #[test]
    fn test_query_without_args_is_valid() {
        let request = CallRequest::new(LIST_WRITE_METHOD, Value::Null);
        assert!(CallUtils::validate_request(&request).is_ok());
    }

    #[test]
    fn test_every_entry_point_validates_with_full_args() {
        for method in METHODS {
            let request = CallRequest::new(
                method,
                json!({"courseId": "course-1", "sender": "alice.test", "rate": 4.0}),
            );
            assert!(CallUtils::validate_request(&request).is_ok());
        }
    }

    #[test]
    fn test_reply_envelope_shape() {
        let reply = CallReply::ok(json!("Rating submitted successfully."));
        assert!(reply.is_ok());
        assert!(!reply.call_id.is_empty());

        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["result"], "Rating submitted successfully.");

        let error = CallReply::error("Unknown method: foo");
        assert!(!error.is_ok());
        assert!(error.result().is_none());

        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Unknown method: foo");
    }
}
