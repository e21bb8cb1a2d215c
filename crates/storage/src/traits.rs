//! The work unit store contract
//!
//! The store is the leaf of the system. It knows nothing about transactions:
//! the propagation core either calls [`WorkUnitStore::save`] directly (plain
//! path, durable immediately) or buffers records in a transaction context and
//! hands the whole batch to [`WorkUnitStore::apply`] at commit.

use txprop_core::{Record, RecordId, Result};

/// Opaque, context-unaware persistence
///
/// Every method is synchronous and atomic: it either fully applies or fully
/// fails. Implementations must be shareable across sessions.
pub trait WorkUnitStore: Send + Sync {
    /// Reserve the next identity
    ///
    /// Reserved ids are never handed out twice, even if the record that
    /// reserved one is later discarded.
    fn allocate_id(&self) -> RecordId;

    /// Persist one record immediately and return its assigned id
    fn save(&self, name: &str) -> Result<RecordId>;

    /// Persist a batch of records with pre-allocated ids, all or nothing
    ///
    /// Returns the number of records applied.
    fn apply(&self, records: Vec<Record>) -> Result<usize>;

    /// Look up a committed record
    fn get(&self, id: RecordId) -> Result<Option<Record>>;

    /// All committed records in id order
    fn records(&self) -> Vec<Record>;

    /// Number of committed records
    fn len(&self) -> usize;

    /// Whether no record was committed yet
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
