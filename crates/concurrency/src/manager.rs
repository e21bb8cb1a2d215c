//! Propagation manager: begins, commits and rolls back transactions
//!
//! The manager owns everything shared between sessions: the work unit store
//! and the transaction id counter. The per-boundary decisions (join or begin,
//! mark rollback-only) are made by [`Session`]; the manager is consulted when
//! a new context is needed and when the outermost boundary exits.
//!
//! ## Outermost Exit
//!
//! ```text
//! body outcome   rollback_only   result
//! ------------   -------------   ----------------------------------------
//! Err(e)         any             RolledBack, return Err(e) unchanged
//! Ok(v)          true            RolledBack, return Err(UnexpectedRollback)
//! Ok(v)          false           apply pending writes:
//!                                  ok   -> Committed, return Ok(v)
//!                                  err  -> RolledBack, return the store error
//! ```

use crate::boundary::Demarcation;
use crate::context::{TransactionContext, TransactionSummary};
use crate::session::Session;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use txprop_core::{Error, Result, TransactionState, TxnId};
use txprop_storage::{MemoryStore, WorkUnitStore};

/// Counters over the manager's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PropagationStats {
    /// Contexts created by an outermost boundary
    pub begun: u64,
    /// Nested boundaries that joined an existing context
    pub joined: u64,
    /// Contexts finalized as `Committed`
    pub committed: u64,
    /// Contexts finalized as `RolledBack`, for any reason
    pub rolled_back: u64,
    /// Rollbacks surfaced as `UnexpectedRollback`
    pub unexpected_rollbacks: u64,
}

/// Coordinates transaction lifecycle for every session of one store
///
/// # Thread Safety
///
/// The manager is shared by reference; all of its state is atomic. Contexts
/// themselves never leave the session that created them.
pub struct PropagationManager {
    store: Arc<dyn WorkUnitStore>,

    /// Next transaction id. Monotonic, never reused.
    next_txn_id: AtomicU64,

    begun: AtomicU64,
    joined: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
    unexpected_rollbacks: AtomicU64,
}

impl PropagationManager {
    /// Create a manager over `store`, numbering transactions from 1
    pub fn new(store: Arc<dyn WorkUnitStore>) -> Self {
        Self::with_txn_id(store, 1)
    }

    /// Create a manager whose first transaction id is `first_txn_id`
    pub fn with_txn_id(store: Arc<dyn WorkUnitStore>, first_txn_id: u64) -> Self {
        PropagationManager {
            store,
            next_txn_id: AtomicU64::new(first_txn_id),
            begun: AtomicU64::new(0),
            joined: AtomicU64::new(0),
            committed: AtomicU64::new(0),
            rolled_back: AtomicU64::new(0),
            unexpected_rollbacks: AtomicU64::new(0),
        }
    }

    /// The store transactions commit into
    pub fn store(&self) -> &Arc<dyn WorkUnitStore> {
        &self.store
    }

    /// Open a session: one logical thread of execution with its own registry
    pub fn session(&self) -> Session<'_> {
        Session::new(self)
    }

    /// Run `f` as a top-level call on a fresh session
    ///
    /// Convenience for callers that issue one entry point per request.
    pub fn run<T, F>(&self, demarcation: Demarcation, f: F) -> Result<T>
    where
        F: for<'s> FnOnce(&mut Session<'s>) -> Result<T>,
    {
        self.session().run(demarcation, f)
    }

    /// Allocate next transaction ID
    pub fn next_txn_id(&self) -> TxnId {
        TxnId::new(self.next_txn_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Snapshot of the lifetime counters
    pub fn stats(&self) -> PropagationStats {
        PropagationStats {
            begun: self.begun.load(Ordering::Relaxed),
            joined: self.joined.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            rolled_back: self.rolled_back.load(Ordering::Relaxed),
            unexpected_rollbacks: self.unexpected_rollbacks.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn begin(&self) -> TransactionContext {
        self.begun.fetch_add(1, Ordering::Relaxed);
        TransactionContext::new(self.next_txn_id())
    }

    pub(crate) fn record_join(&self) {
        self.joined.fetch_add(1, Ordering::Relaxed);
    }

    /// Decide the fate of a context whose outermost boundary just exited
    ///
    /// The context must already be removed from its registry. The body's
    /// error, if any, is returned unchanged.
    pub(crate) fn finalize<T>(
        &self,
        mut ctx: TransactionContext,
        outcome: Result<T>,
    ) -> (Result<T>, TransactionSummary) {
        match outcome {
            Err(err) => {
                let discarded = self.rollback(&mut ctx);
                tracing::warn!(
                    txn_id = %ctx.txn_id,
                    discarded,
                    error = %err,
                    "Rolled back transaction after error"
                );
                let summary = ctx.summary(discarded);
                (Err(err), summary)
            }
            Ok(_) if ctx.is_rollback_only() => {
                let discarded = self.rollback(&mut ctx);
                self.unexpected_rollbacks.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    txn_id = %ctx.txn_id,
                    discarded,
                    "Transaction silently rolled back because it has been marked as rollback-only"
                );
                let summary = ctx.summary(discarded);
                (
                    Err(Error::UnexpectedRollback {
                        txn_id: ctx.txn_id,
                    }),
                    summary,
                )
            }
            Ok(value) => match self.commit(&mut ctx) {
                Ok(applied) => {
                    let summary = ctx.summary(applied);
                    (Ok(value), summary)
                }
                Err(err) => {
                    let summary = ctx.summary(0);
                    (Err(err), summary)
                }
            },
        }
    }

    /// Apply the context's pending writes and mark it committed
    ///
    /// If the store rejects the batch nothing is applied and the context
    /// ends `RolledBack`.
    fn commit(&self, ctx: &mut TransactionContext) -> Result<usize> {
        let records = ctx.take_pending();
        let count = records.len();

        match self.store.apply(records) {
            Ok(applied) => {
                ctx.finish(TransactionState::Committed)?;
                self.committed.fetch_add(1, Ordering::Relaxed);
                tracing::info!(txn_id = %ctx.txn_id, applied, "Committed transaction");
                Ok(applied)
            }
            Err(err) => {
                tracing::error!(
                    txn_id = %ctx.txn_id,
                    discarded = count,
                    error = %err,
                    "Store rejected commit batch, rolling back"
                );
                if let Err(state_err) = ctx.finish(TransactionState::RolledBack) {
                    tracing::error!(txn_id = %ctx.txn_id, error = %state_err, "Rollback failed");
                }
                self.rolled_back.fetch_add(1, Ordering::Relaxed);
                Err(err)
            }
        }
    }

    /// Discard the context's pending writes and mark it rolled back
    fn rollback(&self, ctx: &mut TransactionContext) -> usize {
        let discarded = ctx.discard_pending();
        if let Err(err) = ctx.finish(TransactionState::RolledBack) {
            tracing::error!(txn_id = %ctx.txn_id, error = %err, "Rollback failed");
        }
        self.rolled_back.fetch_add(1, Ordering::Relaxed);
        discarded
    }
}

impl Default for PropagationManager {
    fn default() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}

impl std::fmt::Debug for PropagationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropagationManager")
            .field("records", &self.store.len())
            .field("next_txn_id", &self.next_txn_id.load(Ordering::Relaxed))
            .field("stats", &self.stats())
            .finish()
    }
}
