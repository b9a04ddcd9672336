//! # Ledger Core Engine
//!
//! The hash-chained audit ledger for land-acquisition survey records. Every
//! change to a survey's lifecycle (JMR measurement, notice, payment, award,
//! ownership) lands as an append-only, hash-linked block revision plus one
//! timeline event, and the verifier later proves whether the live data still
//! matches what was recorded.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Pure logic: canonicalization, hashing, block assembly,
//!   timeline chain rules, verdict assembly
//! - `ports/` - Port traits (inbound API, outbound SPI)
//! - `service/` - Application service implementing the API
//! - `adapters/` - Key-value stores, time source, collaborator doubles
//!
//! ## Domain Invariants
//!
//! | # | Invariant |
//! |---|-----------|
//! | 1 | Section hash always equals the digest of its canonicalized data |
//! | 2 | Block `current_hash` is reproducible from persisted fields |
//! | 3 | Revision N links to revision N-1; revision 0 links to genesis |
//! | 4 | Timeline event N links to event N-1's `data_hash` |
//! | 5 | Writes per survey are serialized; a write lands as one batch |
//! | 6 | Blocks and events are never deleted; corrections append |
//!
//! ## Usage
//!
//! ```ignore
//! use ledger_core::{LedgerApi, LedgerConfig, LedgerDependencies, LedgerService};
//! use ledger_core::adapters::{InMemorySectionStore, MemoryStore, StaticOfficerContext, SystemTimeSource};
//!
//! let service = LedgerService::new(
//!     LedgerDependencies {
//!         kv_store: MemoryStore::new(),
//!         section_source: InMemorySectionStore::new(),
//!         context_source: StaticOfficerContext::new("officer-1"),
//!         time_source: SystemTimeSource,
//!     },
//!     LedgerConfig::default(),
//! );
//!
//! let block = service.register_or_update(request)?;
//! let verdict = service.verify_integrity("67/4")?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export key types for convenience
pub use domain::canonical::{canonicalize, to_canonical_json};
pub use domain::config::LedgerConfig;
pub use domain::hashing::{digest, NULL_SECTION_SENTINEL};
pub use ports::inbound::{BulkFilter, LedgerApi, RegisterRequest};
pub use ports::outbound::{
    BatchOperation, KeyValueStore, OfficerContextSource, SectionSource, TimeSource,
};
pub use service::{LedgerDependencies, LedgerService, SyncReport};
