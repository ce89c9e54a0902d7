//! Provenance for staged extractions

use crate::ExtractionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a staged extraction, based on UUIDv7
///
/// UUIDv7 sorts chronologically, so listing staged extractions by id
/// lists them in staging order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StagingId(uuid::Uuid);

impl StagingId {
    /// Generate a new identifier
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Parse an identifier from its string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid staging id: {}", e))
    }
}

impl Default for StagingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StagingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a staged agreement came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingProvenance {
    /// Full source text the agreement was extracted from
    pub source_text: String,

    /// Original filename, if the text came from an upload
    pub filename: Option<String>,

    /// When the agreement was staged
    pub staged_at: DateTime<Utc>,
}

impl StagingProvenance {
    /// Provenance stamped with the current time
    pub fn new(source_text: impl Into<String>, filename: Option<String>) -> Self {
        Self {
            source_text: source_text.into(),
            filename,
            staged_at: Utc::now(),
        }
    }
}

/// Listing entry for a staged extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedSummary {
    /// Staging identifier
    pub id: StagingId,

    /// Original filename, if any
    pub filename: Option<String>,

    /// Status of the staged agreement
    pub status: ExtractionStatus,

    /// Number of facilities in the agreement
    pub facility_count: usize,

    /// When it was staged
    pub staged_at: DateTime<Utc>,
}
