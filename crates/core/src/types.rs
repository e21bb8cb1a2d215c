//! Core identifier and state types
//!
//! This module defines the fundamental types used throughout the system:
//! - [`SessionId`]: Unique identifier for one logical thread of execution
//! - [`TxnId`]: Identifier of one logical transaction
//! - [`RecordId`]: Identity assigned by the work unit store
//! - [`TransactionState`]: Lifecycle state of a transaction context

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a session (one in-flight request)
///
/// A session is the logical thread of execution that owns at most one
/// active transaction context. The id is only used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random SessionId using UUID v4
    ///
    /// # Examples
    ///
    /// ```
    /// use txprop_core::types::SessionId;
    ///
    /// let id1 = SessionId::new();
    /// let id2 = SessionId::new();
    /// assert_ne!(id1, id2);
    /// ```
    pub fn new() -> Self {
        SessionId(Uuid::new_v4())
    }

    /// Get raw bytes representation
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one logical transaction
///
/// Unique per transaction, not per nested call: every boundary that joins an
/// existing transaction sees the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxnId(u64);

impl TxnId {
    /// Wrap a raw transaction number
    pub const fn new(raw: u64) -> Self {
        TxnId(raw)
    }

    /// The raw transaction number
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TxnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "txn-{}", self.0)
    }
}

/// Identity assigned to a record by the store
///
/// Ids are allocated when a record is saved, even if the surrounding
/// transaction later rolls back, so committed ids may have gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    /// Wrap a raw record id
    pub const fn new(raw: u64) -> Self {
        RecordId(raw)
    }

    /// The raw record id
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(raw: u64) -> Self {
        RecordId(raw)
    }
}

/// Lifecycle state of a transaction context
///
/// State transitions:
/// - `Active` → `Committed` (outermost exit, no error, not rollback-only)
/// - `Active` → `RolledBack` (outermost exit with an error, or rollback-only)
///
/// Terminal states (no transitions allowed):
/// - `Committed`
/// - `RolledBack`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionState {
    /// Transaction is open and may buffer writes
    Active,
    /// Buffered writes were applied to the store
    Committed,
    /// Buffered writes were discarded
    RolledBack,
}

impl TransactionState {
    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionState::Active)
    }
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionState::Active => write!(f, "active"),
            TransactionState::Committed => write!(f, "committed"),
            TransactionState::RolledBack => write!(f, "rolled back"),
        }
    }
}
