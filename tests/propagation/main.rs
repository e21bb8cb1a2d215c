//! Propagation Test Suite
//!
//! End-to-end checks through the `txprop` facade, organized by behavior:
//! - required: joining, commit, rollback, rollback-only
//! - plain: operations outside any transaction
//! - sessions: isolation between sessions and threads
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test propagation
//! cargo test --test propagation plain::
//! ```

use txprop::prelude::*;

// Test modules
pub mod plain;
pub mod required;
pub mod sessions;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Business failure used by every test body
pub fn rollback_test() -> Error {
    Error::operation_failed("rollback test")
}

/// Names of all committed records in id order
pub fn committed_names(db: &Database) -> Vec<String> {
    db.records().into_iter().map(|r| r.name).collect()
}
