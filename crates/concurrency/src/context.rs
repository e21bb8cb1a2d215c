//! Transaction context
//!
//! A `TransactionContext` is one logical transaction shared by every boundary
//! that joins it. It tracks:
//! - `depth`: how many boundaries are currently inside it
//! - `rollback_only`: monotonic poison flag set by a failed inner boundary
//! - `state`: `Active` until the outermost boundary finalizes it
//! - `pending`: records saved inside the transaction, applied only on commit

use serde::Serialize;
use std::time::Instant;
use txprop_core::{Error, Record, RecordId, Result, TransactionState, TxnId};

/// One logical transaction
#[derive(Debug)]
pub struct TransactionContext {
    /// Identifier shared by all joined boundaries
    pub txn_id: TxnId,
    depth: usize,
    rollback_only: bool,
    state: TransactionState,
    pending: Vec<Record>,
    started_at: Instant,
}

impl TransactionContext {
    /// Open a context for the first boundary (`depth == 1`)
    pub fn new(txn_id: TxnId) -> Self {
        Self {
            txn_id,
            depth: 1,
            rollback_only: false,
            state: TransactionState::Active,
            pending: Vec::new(),
            started_at: Instant::now(),
        }
    }

    /// Number of boundaries currently inside this transaction
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether an inner failure has poisoned this transaction
    pub fn is_rollback_only(&self) -> bool {
        self.rollback_only
    }

    /// Current lifecycle state
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Whether the context can still buffer writes
    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    /// Records waiting for commit
    pub fn pending_writes(&self) -> &[Record] {
        &self.pending
    }

    /// Look up a record saved inside this transaction
    pub fn find_pending(&self, id: RecordId) -> Option<&Record> {
        self.pending.iter().find(|r| r.id == id)
    }

    /// A nested boundary joins; returns the new depth
    pub(crate) fn join(&mut self) -> usize {
        self.depth += 1;
        self.depth
    }

    /// A boundary exits; returns the remaining depth
    pub(crate) fn leave(&mut self) -> usize {
        self.depth = self.depth.saturating_sub(1);
        self.depth
    }

    /// Poison the transaction. Never cleared once set.
    pub(crate) fn set_rollback_only(&mut self) {
        self.rollback_only = true;
    }

    pub(crate) fn buffer_write(&mut self, record: Record) -> Result<()> {
        self.ensure_active()?;
        self.pending.push(record);
        Ok(())
    }

    /// Hand the buffered records to the committer
    pub(crate) fn take_pending(&mut self) -> Vec<Record> {
        std::mem::take(&mut self.pending)
    }

    /// Drop the buffered records; returns how many were discarded
    pub(crate) fn discard_pending(&mut self) -> usize {
        let discarded = self.pending.len();
        self.pending.clear();
        discarded
    }

    /// Move to a terminal state
    pub(crate) fn finish(&mut self, state: TransactionState) -> Result<()> {
        self.ensure_active()?;
        if !state.is_terminal() {
            return Err(Error::InvalidState(format!(
                "{} cannot transition to {}",
                self.txn_id, state
            )));
        }
        self.state = state;
        Ok(())
    }

    /// Snapshot of a finalized context
    pub fn summary(&self, writes: usize) -> TransactionSummary {
        TransactionSummary {
            txn_id: self.txn_id,
            state: self.state,
            rollback_only: self.rollback_only,
            writes,
            elapsed_us: self.started_at.elapsed().as_micros() as u64,
        }
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::InvalidState(format!(
                "{} is already {}",
                self.txn_id, self.state
            )))
        }
    }
}

/// What a finalized transaction leaves behind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionSummary {
    /// Finalized transaction
    pub txn_id: TxnId,
    /// `Committed` or `RolledBack`
    pub state: TransactionState,
    /// Whether an inner boundary had poisoned it
    pub rollback_only: bool,
    /// Records applied (commit) or discarded (rollback)
    pub writes: usize,
    /// Time between the first entry and finalization
    pub elapsed_us: u64,
}

impl TransactionSummary {
    /// Whether the transaction's writes became durable
    pub fn is_committed(&self) -> bool {
        self.state == TransactionState::Committed
    }
}
