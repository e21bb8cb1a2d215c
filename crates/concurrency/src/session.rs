//! Session: one logical thread of execution
//!
//! A session replaces the ambient, thread-bound transaction lookup with an
//! explicit handle. Every operation body receives `&mut Session` and reaches
//! the active transaction (if any) only through it:
//!
//! ```text
//! run_transactional(A)              registry: [txn-1 depth 1]
//!   A: save("x")                    txn-1 pending: [x]
//!   A: run_transactional(B)         registry: [txn-1 depth 2]   (join)
//!     B: save("y"), Err(e)          txn-1 pending: [x, y]
//!   B exits with Err, depth 1       txn-1 rollback_only = true, Err(e) to A
//!   A catches e, returns Ok         depth 0: poisoned
//! -> RolledBack, Err(UnexpectedRollback { txn-1 })
//! ```
//!
//! Sessions are not shared across threads; each request opens its own.

use crate::boundary::TransactionScope;
use crate::context::{TransactionContext, TransactionSummary};
use crate::manager::PropagationManager;
use crate::registry::ContextRegistry;
use tracing::{debug, warn};
use txprop_core::{validate_name, Error, Record, RecordId, Result, SessionId, TxnId};

/// Explicit transactional context handle for one request
pub struct Session<'m> {
    id: SessionId,
    pub(crate) manager: &'m PropagationManager,
    pub(crate) registry: ContextRegistry,
    completed: Vec<TransactionSummary>,
}

impl<'m> Session<'m> {
    pub(crate) fn new(manager: &'m PropagationManager) -> Self {
        Self::with_id(manager, SessionId::new())
    }

    fn with_id(manager: &'m PropagationManager, id: SessionId) -> Self {
        Session {
            id,
            manager,
            registry: ContextRegistry::new(),
            completed: Vec::new(),
        }
    }

    /// Identifier used to correlate log lines
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The active transaction, if any
    pub fn current(&self) -> Option<&TransactionContext> {
        self.registry.current()
    }

    /// Whether a transaction is active on this session
    pub fn in_transaction(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Summaries of every transaction this session finalized, oldest first
    pub fn completed(&self) -> &[TransactionSummary] {
        &self.completed
    }

    /// Summary of the most recently finalized transaction
    pub fn last_completed(&self) -> Option<&TransactionSummary> {
        self.completed.last()
    }

    /// Run `f` inside a transaction, joining the active one if present
    ///
    /// Errors from `f` are returned unchanged. Only the outermost boundary
    /// can return [`Error::UnexpectedRollback`].
    ///
    /// # Example
    ///
    /// ```
    /// use txprop_concurrency::PropagationManager;
    ///
    /// let manager = PropagationManager::default();
    /// let mut session = manager.session();
    /// let record = session
    ///     .run_transactional(|s| s.save("John Doe"))
    ///     .unwrap();
    /// assert_eq!(manager.store().get(record.id).unwrap(), Some(record));
    /// ```
    pub fn run_transactional<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session<'m>) -> Result<T>,
    {
        let mut scope = TransactionScope::enter(self)?;
        let outcome = f(scope.session());
        scope.exit(outcome)
    }

    /// Run `f` with no transaction at all
    ///
    /// `f` gets a detached session: its saves are durable immediately and an
    /// enclosing transaction can neither see nor undo them. Transactions that
    /// `f` opens are independent of the enclosing one.
    pub fn run_plain<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session<'m>) -> Result<T>,
    {
        debug!(
            session = %self.id,
            enclosing = ?self.current().map(|ctx| ctx.txn_id),
            "Running plain operation outside any transaction"
        );
        let mut detached = Session::with_id(self.manager, self.id);
        let outcome = f(&mut detached);
        self.completed.append(&mut detached.completed);
        outcome
    }

    /// Persist a record named `name`
    ///
    /// Inside a transaction the record gets its id now but is only written
    /// when the transaction commits. Outside one it is written immediately.
    pub fn save(&mut self, name: &str) -> Result<Record> {
        validate_name(name)?;
        let store = self.manager.store();

        match self.registry.current_mut() {
            Some(ctx) => {
                let record = Record::new(store.allocate_id(), name);
                ctx.buffer_write(record.clone())?;
                debug!(session = %self.id, txn_id = %ctx.txn_id, %record, "Buffered save");
                Ok(record)
            }
            None => {
                let id = store.save(name)?;
                let record = Record::new(id, name);
                debug!(session = %self.id, %record, "Saved without transaction");
                Ok(record)
            }
        }
    }

    /// Look up a record, seeing this session's uncommitted saves first
    pub fn find(&self, id: RecordId) -> Result<Option<Record>> {
        if let Some(record) = self.current().and_then(|ctx| ctx.find_pending(id)) {
            return Ok(Some(record.clone()));
        }
        self.manager.store().get(id)
    }

    /// Like [`find`](Self::find) but a missing record is an error
    pub fn get(&self, id: RecordId) -> Result<Record> {
        self.find(id)?
            .ok_or_else(|| Error::NotFound(format!("record {}", id)))
    }

    /// Poison the active transaction without raising an error
    ///
    /// The outermost boundary will roll back and report
    /// [`Error::UnexpectedRollback`].
    pub fn set_rollback_only(&mut self) -> Result<()> {
        let ctx = self
            .registry
            .current_mut()
            .ok_or_else(|| Error::InvalidState("no active transaction".to_string()))?;
        ctx.set_rollback_only();
        warn!(session = %self.id, txn_id = %ctx.txn_id, "Marked rollback-only by request");
        Ok(())
    }

    /// Exit logic for one transactional boundary
    ///
    /// Runs on every exit path of [`run_transactional`](Self::run_transactional),
    /// including unwinding.
    pub(crate) fn exit_boundary<T>(&mut self, txn_id: TxnId, outcome: Result<T>) -> Result<T> {
        let ctx = match self.registry.current_mut() {
            Some(ctx) if ctx.txn_id == txn_id => ctx,
            _ => {
                return Err(Error::InvalidState(format!(
                    "{} is not the active transaction",
                    txn_id
                )))
            }
        };

        let remaining = ctx.leave();
        if remaining > 0 {
            if let Err(err) = &outcome {
                ctx.set_rollback_only();
                warn!(
                    session = %self.id,
                    txn_id = %txn_id,
                    depth = remaining,
                    error = %err,
                    "Inner boundary failed, transaction marked rollback-only"
                );
            } else {
                debug!(session = %self.id, txn_id = %txn_id, depth = remaining, "Left joined boundary");
            }
            return outcome;
        }

        let ctx = self.registry.pop().ok_or_else(|| {
            Error::InvalidState(format!("{} vanished from the registry", txn_id))
        })?;
        let (result, summary) = self.manager.finalize(ctx, outcome);
        debug!(
            session = %self.id,
            txn_id = %txn_id,
            state = %summary.state,
            writes = summary.writes,
            "Finalized transaction"
        );
        self.completed.push(summary);
        result
    }
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("current", &self.current().map(|ctx| ctx.txn_id))
            .field("completed", &self.completed.len())
            .finish()
    }
}
