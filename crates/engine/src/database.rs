//! Database: store, propagation manager and configuration in one place.

use crate::config::Config;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use txprop_concurrency::{PropagationManager, Session};
use txprop_core::{Error, Record, RecordId, Result};
use txprop_storage::{MemoryStore, WorkUnitStore};

/// An in-memory database with declarative transaction propagation
///
/// Each inbound request opens its own [`Session`] with [`Database::session`].
///
/// # Example
///
/// ```
/// use txprop_engine::Database;
///
/// let db = Database::ephemeral();
/// let mut session = db.session();
/// let record = session.run_transactional(|s| s.save("John Doe")).unwrap();
/// assert_eq!(db.get(record.id).unwrap().name, "John Doe");
/// ```
pub struct Database {
    store: Arc<MemoryStore>,
    manager: PropagationManager,
    config: Config,
}

impl Database {
    /// Database with default configuration
    pub fn ephemeral() -> Self {
        Self::from_config(Config::default())
    }

    /// Database with a validated configuration
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_config(config))
    }

    /// Database configured from a TOML file
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(Config::from_path(path)?)
    }

    /// Create a builder for database configuration
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    fn from_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::with_first_id(config.store.first_record_id));
        let shared: Arc<dyn WorkUnitStore> = store.clone();
        let manager = PropagationManager::with_txn_id(shared, config.store.first_txn_id);
        Self {
            store,
            manager,
            config,
        }
    }

    /// Open a session for one request
    pub fn session(&self) -> Session<'_> {
        self.manager.session()
    }

    /// The propagation manager
    pub fn manager(&self) -> &PropagationManager {
        &self.manager
    }

    /// The configuration this database was opened with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Committed record by id
    pub fn get(&self, id: RecordId) -> Result<Record> {
        self.store
            .get(id)?
            .ok_or_else(|| Error::NotFound(format!("record {}", id)))
    }

    /// All committed records in id order
    pub fn records(&self) -> Vec<Record> {
        self.store.records()
    }

    /// Number of committed records
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether nothing was committed yet
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Transaction counters
    pub fn metrics(&self) -> DatabaseMetrics {
        let stats = self.manager.stats();
        let finalized = stats.committed + stats.rolled_back;
        DatabaseMetrics {
            transactions_committed: stats.committed,
            transactions_rolled_back: stats.rolled_back,
            unexpected_rollbacks: stats.unexpected_rollbacks,
            joined_boundaries: stats.joined,
            commit_rate: if finalized == 0 {
                1.0
            } else {
                stats.committed as f64 / finalized as f64
            },
            records: self.store.len(),
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("store", &self.store)
            .field("manager", &self.manager)
            .finish()
    }
}

/// Database metrics.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseMetrics {
    /// Transactions finalized as committed
    pub transactions_committed: u64,
    /// Transactions finalized as rolled back
    pub transactions_rolled_back: u64,
    /// Rollbacks reported as `UnexpectedRollback`
    pub unexpected_rollbacks: u64,
    /// Nested boundaries that joined an existing transaction
    pub joined_boundaries: u64,
    /// Commit success rate (0.0 - 1.0)
    pub commit_rate: f64,
    /// Committed records
    pub records: usize,
}

/// Builder for database configuration.
///
/// ```
/// use txprop_engine::Database;
///
/// let db = Database::builder().first_record_id(100).open().unwrap();
/// let record = db.session().save("x").unwrap();
/// assert_eq!(record.id.as_u64(), 100);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DatabaseBuilder {
    config: Config,
}

impl DatabaseBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// First id handed to a saved record
    pub fn first_record_id(mut self, id: u64) -> Self {
        self.config.store.first_record_id = id;
        self
    }

    /// First transaction id
    pub fn first_txn_id(mut self, id: u64) -> Self {
        self.config.store.first_txn_id = id;
        self
    }

    /// Open the database.
    pub fn open(self) -> Result<Database> {
        Database::open(self.config)
    }
}
