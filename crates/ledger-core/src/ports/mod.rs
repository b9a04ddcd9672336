//! # Ports
//!
//! - `inbound` - the API this engine exposes to its host (REST layer, jobs)
//! - `outbound` - the interfaces the host must implement (store, live-data
//!   collaborators, officer context, clock)

pub mod inbound;
pub mod outbound;
