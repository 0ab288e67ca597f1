//! Enrichment results and per-row lookup outcomes.

use serde::{Deserialize, Serialize};

/// Fields a places provider resolved for one query.
///
/// Every field is plain text; anything the provider left out is blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceMatch {
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Map URL of the place
    pub url: String,
    /// Opening hours serialized as JSON, blank when unknown
    pub hours: String,
    pub summary: String,
}

/// A resolved place joined with the facility it was looked up for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub facility_id: String,
    #[serde(flatten)]
    pub place: PlaceMatch,
}

impl EnrichmentResult {
    pub fn new(facility_id: impl Into<String>, place: PlaceMatch) -> Self {
        Self {
            facility_id: facility_id.into(),
            place,
        }
    }
}

/// Final state of one input row after a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// The provider returned a match
    Enriched(EnrichmentResult),
    /// The provider had no results for the query
    NoMatch,
    /// Neither URL nor name produced a query
    NoQuery,
    /// The lookup failed (transport, provider error, timeout)
    Failed(String),
    /// The batch was cancelled before this row completed
    Cancelled,
    /// Outside the requested row limit
    Skipped,
}

impl RowOutcome {
    pub fn status(&self) -> LookupStatus {
        match self {
            RowOutcome::Enriched(_) => LookupStatus::Ok,
            RowOutcome::NoMatch => LookupStatus::NoMatch,
            RowOutcome::NoQuery => LookupStatus::NoQuery,
            RowOutcome::Failed(_) => LookupStatus::Error,
            RowOutcome::Cancelled => LookupStatus::Cancelled,
            RowOutcome::Skipped => LookupStatus::Skipped,
        }
    }

    /// The resolved place, if any
    pub fn place(&self) -> Option<&PlaceMatch> {
        match self {
            RowOutcome::Enriched(result) => Some(&result.place),
            _ => None,
        }
    }
}

/// Value written to the `lookup_status` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    Ok,
    NoMatch,
    NoQuery,
    Error,
    Cancelled,
    Skipped,
}

impl LookupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupStatus::Ok => "ok",
            LookupStatus::NoMatch => "no_match",
            LookupStatus::NoQuery => "no_query",
            LookupStatus::Error => "error",
            LookupStatus::Cancelled => "cancelled",
            LookupStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for LookupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
