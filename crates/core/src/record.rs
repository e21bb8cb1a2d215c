//! The record persisted by the work unit store

use crate::error::{Error, Result};
use crate::types::RecordId;
use serde::{Deserialize, Serialize};

/// A named record with a store-assigned identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identity assigned at save time
    pub id: RecordId,
    /// Non-empty display name
    pub name: String,
}

impl Record {
    /// Create a record with an already-allocated id
    pub fn new(id: RecordId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Check the record's column constraints
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)
    }
}

/// `name` is a non-nullable column: blank names are rejected
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::ConstraintViolation(
            "record name must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Record(id={}, name={})", self.id, self.name)
    }
}
