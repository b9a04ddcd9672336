//! # Domain Layer
//!
//! Pure logic with no I/O: every function here is deterministic given its
//! inputs, which is what makes the hash contracts testable in isolation.
//!
//! - `canonical` - deterministic normalization of records prior to hashing
//! - `hashing` - SHA-256 digests over canonical JSON
//! - `block` - block revision assembly and linking
//! - `timeline` - timeline event construction and chain walking
//! - `verify` - section/chain verdict policy
//! - `keys` - key-value store key encoding
//! - `config` - engine configuration

pub mod block;
pub mod canonical;
pub mod config;
pub mod hashing;
pub mod keys;
pub mod timeline;
pub mod verify;
