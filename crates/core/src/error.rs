//! Unified error types.
//!
//! Every layer returns [`Result`]. A boundary never wraps or rewrites an error
//! raised by the body it guards; the only error it synthesizes is
//! [`Error::UnexpectedRollback`], at the outermost exit.

use crate::types::TxnId;
use thiserror::Error;

/// Boxed business error carried by [`Error::OperationFailed`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All errors raised by the propagation core and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// Business-level failure raised inside an operation body
    #[error("operation failed: {cause}")]
    OperationFailed {
        /// The original error
        #[source]
        cause: BoxError,
    },

    /// Outermost commit found the transaction marked rollback-only
    #[error("transaction {txn_id} silently rolled back because it has been marked as rollback-only")]
    UnexpectedRollback {
        /// Transaction that was rolled back
        txn_id: TxnId,
    },

    /// Record or entity not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Record failed validation (empty name, ...)
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Transaction context misuse (terminal transition, empty registry)
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Store failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for all operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap a business error.
    ///
    /// ```
    /// use txprop_core::Error;
    ///
    /// let err = Error::operation_failed("rollback test");
    /// assert!(err.is_operation_failed());
    /// assert_eq!(err.to_string(), "operation failed: rollback test");
    /// ```
    pub fn operation_failed(cause: impl Into<BoxError>) -> Self {
        Error::OperationFailed {
            cause: cause.into(),
        }
    }

    /// Check if this is a business error raised by an operation body.
    pub fn is_operation_failed(&self) -> bool {
        matches!(self, Error::OperationFailed { .. })
    }

    /// Check if this is the synthetic rollback-only error.
    pub fn is_unexpected_rollback(&self) -> bool {
        matches!(self, Error::UnexpectedRollback { .. })
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Stable short name of the variant, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::OperationFailed { .. } => "OperationFailed",
            Error::UnexpectedRollback { .. } => "UnexpectedRollback",
            Error::NotFound(_) => "NotFound",
            Error::ConstraintViolation(_) => "ConstraintViolation",
            Error::InvalidState(_) => "InvalidState",
            Error::Storage(_) => "Storage",
            Error::Config(_) => "Config",
            Error::Io(_) => "Io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn operation_failed_keeps_cause_as_source() {
        let err = Error::operation_failed("boom");
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".into()));
        assert_eq!(err.kind(), "OperationFailed");
    }

    #[test]
    fn unexpected_rollback_names_transaction() {
        let err = Error::UnexpectedRollback {
            txn_id: TxnId::new(3),
        };
        assert!(err.is_unexpected_rollback());
        assert!(!err.is_operation_failed());
        assert!(err.to_string().contains("txn-3"));
    }

    #[test]
    fn io_errors_convert() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), "Io");
    }
}
