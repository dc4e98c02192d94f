//! Entry-point dispatch for external calls
//!
//! This module maps wire method names plus JSON arguments onto the rating
//! book operations, producing reply envelopes. It is the in-process stand-in
//! for the host platform's entry-point binding.

use crate::error::{LedgerError, Result};
use crate::host::calls::{
    CallReply, CallRequest, CallUtils, ADD_RATING_METHOD, CONVERT_DATA_METHOD,
    GET_AVERAGE_RATING_METHOD, GET_USER_RATING_METHOD, HAS_USER_RATED_METHOD, LIST_WRITE_METHOD,
};
use crate::host::context::CallContext;
use crate::metrics::MetricsCollector;
use crate::store::book::RatingBook;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Trait defining the interface for handling external calls
#[async_trait]
pub trait CallHandler: Send + Sync {
    /// Handle one decoded call and produce a reply envelope
    async fn handle_call(&self, request: CallRequest) -> Result<CallReply>;

    /// Handle calls that failed before dispatch (e.g. undecodable bytes)
    async fn handle_error(&self, error: LedgerError, raw_call: &[u8]);
}

/// Dispatcher binding the six contract entry points to a rating book
///
/// The sender for mutating calls comes from the injected call context, never
/// from the argument payload, matching the host's identity attestation.
pub struct CallDispatcher {
    book: Arc<RatingBook>,
    context: Arc<dyn CallContext>,
    metrics: Arc<MetricsCollector>,
}

impl CallDispatcher {
    /// Create a new dispatcher
    pub fn new(
        book: Arc<RatingBook>,
        context: Arc<dyn CallContext>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            book,
            context,
            metrics,
        }
    }

    /// Dispatch a raw JSON-encoded call and return the encoded reply
    pub async fn dispatch_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let reply = match CallUtils::deserialize_request(bytes) {
            Ok(request) => self.handle_call(request).await?,
            Err(e) => {
                let error = LedgerError::InvalidCall {
                    reason: e.to_string(),
                };
                self.handle_error(error, bytes).await;
                CallReply::error(e.to_string())
            }
        };

        CallUtils::serialize_reply(&reply)
    }

    fn execute(&self, request: &CallRequest) -> Result<Value> {
        match request.method.as_str() {
            ADD_RATING_METHOD => {
                let sender = self.context.sender()?;
                let course_id = string_arg(&request.args, "courseId")?;
                let rate = number_arg(&request.args, "rate")?;
                let message = optional_string_arg(&request.args, "message");

                let outcome = self.book.add_rating(&sender, &course_id, rate, &message)?;
                Ok(json!(outcome.status_message()))
            }
            HAS_USER_RATED_METHOD => {
                let course_id = string_arg(&request.args, "courseId")?;
                let sender = string_arg(&request.args, "sender")?;

                let rated = self.book.has_user_rated(&course_id, &sender)?;
                Ok(json!(rated))
            }
            CONVERT_DATA_METHOD => {
                let course_id = string_arg(&request.args, "courseId")?;

                let records = self.book.ratings_for_course(&course_id)?;
                serde_json::to_value(records).map_err(|e| {
                    LedgerError::InternalError {
                        message: format!("Failed to encode course ratings: {}", e),
                    }
                    .into()
                })
            }
            GET_AVERAGE_RATING_METHOD => {
                let course_id = string_arg(&request.args, "courseId")?;

                let average = self.book.average_rating(&course_id)?;
                Ok(json!(average))
            }
            GET_USER_RATING_METHOD => {
                let course_id = string_arg(&request.args, "courseId")?;
                let sender = string_arg(&request.args, "sender")?;

                let record = self.book.user_rating_for_course(&course_id, &sender)?;
                serde_json::to_value(record).map_err(|e| {
                    LedgerError::InternalError {
                        message: format!("Failed to encode user rating: {}", e),
                    }
                    .into()
                })
            }
            LIST_WRITE_METHOD => {
                let records = self.book.all_ratings()?;
                serde_json::to_value(records).map_err(|e| {
                    LedgerError::InternalError {
                        message: format!("Failed to encode rating sequence: {}", e),
                    }
                    .into()
                })
            }
            other => Err(LedgerError::UnknownMethod {
                method: other.to_string(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl CallHandler for CallDispatcher {
    async fn handle_call(&self, request: CallRequest) -> Result<CallReply> {
        let timer = self.metrics.start_timer();

        let reply = match self.execute(&request) {
            Ok(result) => {
                self.metrics
                    .record_call(&request.method, true, timer.elapsed());
                info!(
                    "Call dispatched - method: '{}', duration: {:.2}ms",
                    request.method,
                    timer.elapsed().as_secs_f64() * 1000.0
                );
                CallReply::ok(result)
            }
            Err(e) => {
                self.metrics
                    .record_call(&request.method, false, timer.elapsed());
                warn!(
                    "Call failed - method: '{}', error: {}",
                    request.method, e
                );
                CallReply::error(e.to_string())
            }
        };

        Ok(reply)
    }

    async fn handle_error(&self, error: LedgerError, raw_call: &[u8]) {
        warn!(
            "Undispatchable call - error: '{}', size: {} bytes",
            error,
            raw_call.len()
        );

        if !raw_call.is_empty() {
            let preview_len = std::cmp::min(100, raw_call.len());
            let preview = String::from_utf8_lossy(&raw_call[..preview_len]);
            warn!("Call preview: {:?}", preview);
        }

        self.metrics.record_call("undecodable", false, std::time::Duration::ZERO);
    }
}

fn string_arg(args: &Value, name: &str) -> Result<String> {
    args.get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            LedgerError::InvalidCall {
                reason: format!("Missing or non-string argument: {}", name),
            }
            .into()
        })
}

fn optional_string_arg(args: &Value, name: &str) -> String {
    args.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn number_arg(args: &Value, name: &str) -> Result<f64> {
    args.get(name).and_then(Value::as_f64).ok_or_else(|| {
        LedgerError::InvalidCall {
            reason: format!("Missing or non-numeric argument: {}", name),
        }
        .into()
    })
}
