//! Convenient imports for txprop.
//!
//! ```
//! use txprop::prelude::*;
//!
//! let db = Database::ephemeral();
//! let record = db.session().run_transactional(|s| s.save("x")).unwrap();
//! assert_eq!(db.get(record.id).unwrap().name, "x");
//! ```

// Main entry point
pub use crate::{Database, DatabaseBuilder};

// Error handling
pub use crate::{Error, Result};

// Boundaries
pub use crate::{Demarcated, Demarcation, Session};

// Core types
pub use crate::{Record, RecordId, TransactionState, TxnId};
