//! # Section Types
//!
//! A survey's ledger entry tracks five data facets ("sections"): the JMR
//! measurement, the notice, the payment, the award, and the landowner record.
//! Each section carries its own snapshot and hash so tampering is localized
//! to the facet that drifted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// The five tracked data facets of a survey.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// Joint Measurement Report (measured area, boundaries).
    Jmr,
    /// Acquisition notice issued to the landowner.
    Notice,
    /// Compensation payment record.
    Payment,
    /// Declared award.
    Award,
    /// Landowner / ownership record.
    Landowner,
}

impl SectionKind {
    /// All sections, in canonical order.
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Jmr,
        SectionKind::Notice,
        SectionKind::Payment,
        SectionKind::Award,
        SectionKind::Landowner,
    ];

    /// The lowercase wire name of this section.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Jmr => "jmr",
            SectionKind::Notice => "notice",
            SectionKind::Payment => "payment",
            SectionKind::Award => "award",
            SectionKind::Landowner => "landowner",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jmr" => Ok(SectionKind::Jmr),
            "notice" => Ok(SectionKind::Notice),
            "payment" => Ok(SectionKind::Payment),
            "award" => Ok(SectionKind::Award),
            "landowner" => Ok(SectionKind::Landowner),
            other => Err(UnknownSection(other.to_string())),
        }
    }
}

/// Parse failure for [`SectionKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSection(pub String);

impl fmt::Display for UnknownSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown section: {}", self.0)
    }
}

impl std::error::Error for UnknownSection {}

/// Lifecycle status of a section within a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    /// No record has ever been written for this section.
    NotCreated,
    /// First snapshot recorded.
    Created,
    /// Snapshot re-recorded after the initial write.
    Updated,
}

/// One section's recorded snapshot inside a block.
///
/// Invariant: `hash` is present exactly when `data` is present, and always
/// equals the digest of the canonicalized `data` as of the last write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSnapshot {
    /// The recorded data, or `None` while the section is `not_created`.
    pub data: Option<Value>,
    /// Lowercase hex SHA-256 of the canonicalized data.
    pub hash: Option<String>,
    /// When this section was last written through the ledger.
    pub last_updated: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: SectionStatus,
}

impl SectionSnapshot {
    /// An empty snapshot for a section that has never been written.
    pub fn not_created() -> Self {
        Self {
            data: None,
            hash: None,
            last_updated: None,
            status: SectionStatus::NotCreated,
        }
    }

    /// A freshly recorded snapshot.
    pub fn recorded(
        data: Value,
        hash: String,
        at: DateTime<Utc>,
        status: SectionStatus,
    ) -> Self {
        Self {
            data: Some(data),
            hash: Some(hash),
            last_updated: Some(at),
            status,
        }
    }

    /// Whether any data has been recorded for this section.
    pub fn has_data(&self) -> bool {
        self.status != SectionStatus::NotCreated
    }
}

impl Default for SectionSnapshot {
    fn default() -> Self {
        Self::not_created()
    }
}

/// The five section snapshots of a block, addressable by [`SectionKind`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionSet {
    pub jmr: SectionSnapshot,
    pub notice: SectionSnapshot,
    pub payment: SectionSnapshot,
    pub award: SectionSnapshot,
    pub landowner: SectionSnapshot,
}

impl SectionSet {
    /// A set with all five sections `not_created`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get a section snapshot by kind.
    pub fn get(&self, kind: SectionKind) -> &SectionSnapshot {
        match kind {
            SectionKind::Jmr => &self.jmr,
            SectionKind::Notice => &self.notice,
            SectionKind::Payment => &self.payment,
            SectionKind::Award => &self.award,
            SectionKind::Landowner => &self.landowner,
        }
    }

    /// Get a mutable section snapshot by kind.
    pub fn get_mut(&mut self, kind: SectionKind) -> &mut SectionSnapshot {
        match kind {
            SectionKind::Jmr => &mut self.jmr,
            SectionKind::Notice => &mut self.notice,
            SectionKind::Payment => &mut self.payment,
            SectionKind::Award => &mut self.award,
            SectionKind::Landowner => &mut self.landowner,
        }
    }

    /// Iterate the sections in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (SectionKind, &SectionSnapshot)> {
        SectionKind::ALL.iter().map(move |k| (*k, self.get(*k)))
    }

    /// Number of sections that carry data.
    pub fn recorded_count(&self) -> usize {
        self.iter().filter(|(_, s)| s.has_data()).count()
    }
}
