//! Core types for the transaction propagation engine
//!
//! This crate defines the vocabulary shared by every layer:
//! - Identifiers: [`SessionId`], [`TxnId`], [`RecordId`]
//! - [`TransactionState`]: lifecycle of a transaction context
//! - [`Record`]: the unit persisted by the work unit store
//! - [`Error`] / [`Result`]: the unified error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod record;
pub mod types;

pub use error::{BoxError, Error, Result};
pub use record::{validate_name, Record};
pub use types::{RecordId, SessionId, TransactionState, TxnId};
