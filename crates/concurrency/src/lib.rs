//! Propagation layer
//!
//! This crate implements REQUIRED-style transaction propagation with:
//! - TransactionContext: depth, rollback-only flag and buffered writes
//! - ContextRegistry: at most one active context per session
//! - Session: explicit context handle passed to every operation body
//! - PropagationManager: begin, commit and rollback decisions
//! - Demarcation / Demarcated: the call boundary wrapper

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod context;
pub mod manager;
pub mod registry;
pub mod session;

pub use boundary::{Demarcated, Demarcation};
pub use context::{TransactionContext, TransactionSummary};
pub use manager::{PropagationManager, PropagationStats};
pub use registry::ContextRegistry;
pub use session::Session;
