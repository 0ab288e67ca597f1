//! Input facility records.

use serde::{Deserialize, Serialize};

/// One input row describing an entity to enrich.
///
/// Records are read-only: they are never mutated, only joined with the
/// lookup outcome for the same row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityRecord {
    /// Zero-based position in the input table
    pub row: usize,
    /// Unique facility identifier (e.g. "OID")
    pub id: String,
    /// Facility website, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Facility name, used when the URL yields no host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl FacilityRecord {
    /// Build a record, treating blank cells as absent
    pub fn new(row: usize, id: impl Into<String>, url: Option<&str>, name: Option<&str>) -> Self {
        Self {
            row,
            id: id.into(),
            url: non_blank(url),
            name: non_blank(name),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
