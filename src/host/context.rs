//! Call context traits and implementations
//!
//! This module defines the interface for the per-call identity the host
//! execution environment attests, along with the static implementation used
//! by the service shell and tests.

use crate::error::LedgerError;
use crate::types::AccountId;

/// Trait for the host-attested execution context of a call
///
/// The sender is treated as opaque and pre-authenticated; no credential
/// verification happens at this layer.
pub trait CallContext: Send + Sync {
    /// Identity of the calling principal
    fn sender(&self) -> crate::error::Result<AccountId>;
}

/// Context with a fixed, host-attested sender
#[derive(Debug, Clone)]
pub struct StaticCallContext {
    sender: AccountId,
}

impl StaticCallContext {
    /// Create a context for the given principal
    pub fn new(sender: impl Into<AccountId>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

impl CallContext for StaticCallContext {
    fn sender(&self) -> crate::error::Result<AccountId> {
        Ok(self.sender.clone())
    }
}

/// Context with no attested identity
///
/// Read-only consoles dispatch queries through this; any mutating call
/// resolves to a missing-sender error.
#[derive(Debug, Clone, Default)]
pub struct AnonymousCallContext;

impl CallContext for AnonymousCallContext {
    fn sender(&self) -> crate::error::Result<AccountId> {
        Err(LedgerError::MissingSender.into())
    }
}
