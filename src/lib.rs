//! # txprop
//!
//! REQUIRED-style transaction propagation over an in-memory record store.
//!
//! Every operation runs behind a boundary that is either transactional or
//! plain. Nested transactional boundaries join the outermost one, so a chain
//! of calls commits or rolls back as a single unit.
//!
//! ## Quick Start
//!
//! ```
//! use txprop::prelude::*;
//!
//! let db = Database::ephemeral();
//! let mut session = db.session();
//!
//! // Outermost boundary commits both saves
//! session
//!     .run_transactional(|s| {
//!         s.save("Alice")?;
//!         s.run_transactional(|inner| inner.save("Bob"))
//!     })
//!     .unwrap();
//! assert_eq!(db.len(), 2);
//!
//! // A swallowed inner failure still dooms the transaction
//! let err = session
//!     .run_transactional(|s| {
//!         s.save("Carol")?;
//!         let _ = s.run_transactional(|_| -> Result<()> {
//!             Err(Error::operation_failed("rollback test"))
//!         });
//!         Ok(())
//!     })
//!     .unwrap_err();
//! assert!(err.is_unexpected_rollback());
//! assert_eq!(db.len(), 2);
//! ```
//!
//! ## Layers
//!
//! - [`txprop_core`]: ids, records, errors
//! - [`txprop_storage`]: the work-unit store
//! - [`txprop_concurrency`]: contexts, sessions, boundaries
//! - [`txprop_engine`]: database facade, configuration, demo scenarios

#![warn(missing_docs)]

pub mod prelude;

pub use txprop_concurrency::{
    Demarcated, Demarcation, PropagationManager, PropagationStats, Session, TransactionContext,
    TransactionSummary,
};
pub use txprop_core::{Error, Record, RecordId, Result, SessionId, TransactionState, TxnId};
pub use txprop_engine::{
    Config, Database, DatabaseBuilder, DatabaseMetrics, Expectation, ExpectedOutcome, Scenario,
    ScenarioReport,
};
pub use txprop_storage::{MemoryStore, WorkUnitStore};

pub use txprop_concurrency;
pub use txprop_core;
pub use txprop_engine;
pub use txprop_storage;
