//! Context registry
//!
//! Holds zero or one active [`TransactionContext`] for a session. Only the
//! boundary machinery in this crate mutates it; business code sees it through
//! [`Session::current`](crate::Session::current) as a shared reference.

use crate::context::TransactionContext;
use txprop_core::{Error, Result};

/// Single-slot holder of the active transaction
#[derive(Debug, Default)]
pub struct ContextRegistry {
    slot: Option<TransactionContext>,
}

impl ContextRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// The active transaction, if any
    pub fn current(&self) -> Option<&TransactionContext> {
        self.slot.as_ref()
    }

    /// Whether no transaction is active
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut TransactionContext> {
        self.slot.as_mut()
    }

    /// Register a fresh context; the slot must be empty
    pub(crate) fn push(&mut self, ctx: TransactionContext) -> Result<()> {
        if let Some(active) = &self.slot {
            return Err(Error::InvalidState(format!(
                "cannot register {} while {} is active",
                ctx.txn_id, active.txn_id
            )));
        }
        self.slot = Some(ctx);
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Option<TransactionContext> {
        self.slot.take()
    }
}
