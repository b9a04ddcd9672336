//! # Adapters
//!
//! Implementations of the outbound ports:
//!
//! - `storage` - in-memory and file-backed key-value stores
//! - `infra` - system and fixed time sources
//! - `collaborators` - in-memory section source and static officer context
//!   (the test/demo stand-ins for the owning subsystems)

pub mod collaborators;
pub mod infra;
pub mod storage;

pub use collaborators::{InMemorySectionStore, StaticOfficerContext};
pub use infra::{FixedTimeSource, SystemTimeSource};
pub use storage::{FileStore, MemoryStore};
