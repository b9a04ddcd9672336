//! # Bhoomi Ledger Test Suite
//!
//! Unified test crate exercising the engine through its public API.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── lifecycle.rs    # register -> update -> read flows, chain shape
//!     ├── tamper.rs       # out-of-band edits, store edits, sweeps
//!     └── persistence.rs  # file store reload, concurrent writers
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ledger-tests
//! cargo test -p ledger-tests integration::tamper
//! ```

#![allow(dead_code)]

pub mod integration;
