//! Storage layer
//!
//! This crate implements the work unit store:
//! - WorkUnitStore: the opaque, transaction-unaware persistence contract
//! - MemoryStore: BTreeMap-based storage with RwLock and atomic id allocation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::WorkUnitStore;
