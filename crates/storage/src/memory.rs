//! In-memory work unit store
//!
//! BTreeMap behind a RwLock, ids from an AtomicU64.
//!
//! # Design
//!
//! - Reads take the read lock and clone out
//! - `save()` and `apply()` take the write lock once, so a commit batch is
//!   never partially visible
//! - Id allocation is lock-free and independent of the map, so ids reserved
//!   by rolled-back transactions leave gaps

use crate::traits::WorkUnitStore;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use txprop_core::{validate_name, Error, Record, RecordId, Result};

/// Process-local store used by the engine and the tests
///
/// # Example
///
/// ```
/// use txprop_storage::{MemoryStore, WorkUnitStore};
///
/// let store = MemoryStore::new();
/// let id = store.save("John Doe").unwrap();
/// assert_eq!(store.get(id).unwrap().unwrap().name, "John Doe");
/// ```
pub struct MemoryStore {
    /// Committed records
    data: RwLock<BTreeMap<RecordId, Record>>,
    /// Next id to hand out
    next_id: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store whose first id is 1
    pub fn new() -> Self {
        Self::with_first_id(1)
    }

    /// Create an empty store starting ids at `first_id`
    pub fn with_first_id(first_id: u64) -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(first_id),
        }
    }

    /// Id the next allocation will return
    pub fn peek_next_id(&self) -> u64 {
        self.next_id.load(Ordering::Acquire)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkUnitStore for MemoryStore {
    fn allocate_id(&self) -> RecordId {
        RecordId::new(self.next_id.fetch_add(1, Ordering::AcqRel))
    }

    fn save(&self, name: &str) -> Result<RecordId> {
        validate_name(name)?;
        let id = self.allocate_id();
        self.data.write().insert(id, Record::new(id, name));
        Ok(id)
    }

    fn apply(&self, records: Vec<Record>) -> Result<usize> {
        // Validate the whole batch before touching the map
        for record in &records {
            record.validate()?;
        }

        let mut data = self.data.write();
        if let Some(dup) = records.iter().find(|r| data.contains_key(&r.id)) {
            return Err(Error::Storage(format!(
                "record id {} is already committed",
                dup.id
            )));
        }

        let count = records.len();
        for record in records {
            data.insert(record.id, record);
        }
        Ok(count)
    }

    fn get(&self, id: RecordId) -> Result<Option<Record>> {
        Ok(self.data.read().get(&id).cloned())
    }

    fn records(&self) -> Vec<Record> {
        self.data.read().values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.data.read().len()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("records", &self.len())
            .field("next_id", &self.peek_next_id())
            .finish()
    }
}
