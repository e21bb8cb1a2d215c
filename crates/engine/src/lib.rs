//! Engine layer
//!
//! Ties the propagation layer to a store and a configuration:
//! - Database: store + manager, one session per request
//! - Config: TOML configuration with defaults for every field
//! - services: the demo user services with their demarcation
//! - Scenario: the request catalog and its expected outcomes

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod database;
pub mod scenario;
pub mod services;

pub use config::{Config, DemoConfig, LogConfig, StoreConfig};
pub use database::{Database, DatabaseBuilder, DatabaseMetrics};
pub use scenario::{Expectation, ExpectedOutcome, ReportedError, Scenario, ScenarioReport};
pub use services::{AnotherTransactionalService, NonTransactionalUserService, TransactionalUserService};
