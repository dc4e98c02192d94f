//! Host platform bindings: identity context, call envelopes, and dispatch
//!
//! The blockchain host the original contract ran under supplies the caller
//! identity, the call serialization, and the entry-point dispatch. This
//! module models those collaborators as injectable pieces so the core stays
//! testable in isolation.

pub mod calls;
pub mod context;
pub mod dispatch;

// Re-export commonly used types
pub use calls::{CallOutcome, CallReply, CallRequest, CallUtils};
pub use context::{AnonymousCallContext, CallContext, StaticCallContext};
pub use dispatch::{CallDispatcher, CallHandler};
