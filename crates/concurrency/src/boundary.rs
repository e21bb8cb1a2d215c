//! Call boundary wrapper
//!
//! Operations declare whether they are transactional entry points with a
//! [`Demarcation`]. The wrapper carries no state: it only picks
//! [`Session::run_transactional`] or [`Session::run_plain`].
//!
//! [`TransactionScope`] is the scoped acquisition behind
//! `run_transactional`: entering joins or begins the session's transaction,
//! and the exit decision runs exactly once, either explicitly via
//! [`TransactionScope::exit`] or from `Drop` while a panic unwinds.

use crate::session::Session;
use serde::{Deserialize, Serialize};
use tracing::debug;
use txprop_core::{Error, Result, TxnId};

/// How an operation relates to the session's transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Demarcation {
    /// Join the active transaction or begin one
    Transactional,
    /// Run outside any transaction; saves are durable immediately
    Plain,
}

impl std::fmt::Display for Demarcation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Demarcation::Transactional => write!(f, "transactional"),
            Demarcation::Plain => write!(f, "plain"),
        }
    }
}

impl<'m> Session<'m> {
    /// Run `f` behind a call boundary of the given kind
    pub fn run<T, F>(&mut self, demarcation: Demarcation, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session<'m>) -> Result<T>,
    {
        match demarcation {
            Demarcation::Transactional => self.run_transactional(f),
            Demarcation::Plain => self.run_plain(f),
        }
    }
}

/// A type whose operations all share one demarcation
///
/// ```
/// use txprop_concurrency::{Demarcated, Demarcation, PropagationManager, Session};
/// use txprop_core::{Record, Result};
///
/// struct Signup;
///
/// impl Demarcated for Signup {
///     const DEMARCATION: Demarcation = Demarcation::Transactional;
/// }
///
/// impl Signup {
///     fn register(&self, session: &mut Session<'_>, name: &str) -> Result<Record> {
///         self.within(session, |s| s.save(name))
///     }
/// }
///
/// let manager = PropagationManager::default();
/// let record = Signup.register(&mut manager.session(), "John Doe").unwrap();
/// assert_eq!(manager.store().len(), 1);
/// # let _ = record;
/// ```
pub trait Demarcated {
    /// Demarcation applied to every call made through [`within`](Self::within)
    const DEMARCATION: Demarcation;

    /// Run `f` behind this type's call boundary
    fn within<'m, T, F>(&self, session: &mut Session<'m>, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session<'m>) -> Result<T>,
    {
        session.run(Self::DEMARCATION, f)
    }
}

/// Guard for one transactional boundary
pub(crate) struct TransactionScope<'s, 'm> {
    session: &'s mut Session<'m>,
    txn_id: TxnId,
    armed: bool,
}

impl<'s, 'm> TransactionScope<'s, 'm> {
    /// Join the session's transaction, or begin and register a new one
    pub(crate) fn enter(session: &'s mut Session<'m>) -> Result<Self> {
        let session_id = session.id();
        let txn_id = match session.registry.current_mut() {
            Some(ctx) => {
                let depth = ctx.join();
                session.manager.record_join();
                debug!(session = %session_id, txn_id = %ctx.txn_id, depth, "Joined transaction");
                ctx.txn_id
            }
            None => {
                let ctx = session.manager.begin();
                let txn_id = ctx.txn_id;
                session.registry.push(ctx)?;
                debug!(session = %session_id, txn_id = %txn_id, "Began transaction");
                txn_id
            }
        };

        Ok(Self {
            session,
            txn_id,
            armed: true,
        })
    }

    /// The session, for the body to run against
    pub(crate) fn session(&mut self) -> &mut Session<'m> {
        self.session
    }

    /// Apply the exit decision to the body's outcome
    pub(crate) fn exit<T>(mut self, outcome: Result<T>) -> Result<T> {
        self.armed = false;
        self.session.exit_boundary(self.txn_id, outcome)
    }
}

impl Drop for TransactionScope<'_, '_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // Unwinding out of the body counts as an error exit
        let unwound: Result<()> = Err(Error::InvalidState(format!(
            "{} boundary unwound by panic",
            self.txn_id
        )));
        if let Err(err) = self.session.exit_boundary(self.txn_id, unwound) {
            debug!(txn_id = %self.txn_id, error = %err, "Exited boundary during unwind");
        }
    }
}
