//! # Time Sources

use crate::ports::outbound::TimeSource;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

/// Production time source backed by the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Controllable time source for tests: returns a pinned instant until told
/// otherwise.
#[derive(Debug)]
pub struct FixedTimeSource {
    now: RwLock<DateTime<Utc>>,
}

impl FixedTimeSource {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now: RwLock::new(now) }
    }

    /// Move the pinned clock.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write() = now;
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}
