//! # Ledger Types Crate
//!
//! Shared domain entities for the survey ledger: section snapshots, blocks,
//! timeline events, verification verdicts, and the error taxonomy.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a component boundary
//!   lives here, so the engine, its adapters, and the test suite agree on one
//!   definition.
//! - **Findings are data**: a hash mismatch or a broken chain is a verdict,
//!   not an `Err`. Error types cover structural failures only.
//! - **Stable wire shape**: everything serializes with serde; hashes are
//!   lowercase hex SHA-256 strings and timestamps are RFC-3339.

pub mod block;
pub mod errors;
pub mod section;
pub mod timeline;
pub mod verdict;

pub use block::{Block, EventType, OfficerContext, GENESIS_HASH};
pub use errors::{CanonicalizationError, LedgerError, SourceError, StoreError};
pub use section::{SectionKind, SectionSet, SectionSnapshot, SectionStatus};
pub use timeline::TimelineEvent;
pub use verdict::{
    ChainVerdict, ComparisonSource, IntegrityVerdict, SectionVerdict, VerdictStatus,
};
