//! Core data models for the lookup pipelines.

pub mod enrichment;
pub mod facility;
pub mod poi;

pub use enrichment::{EnrichmentResult, LookupStatus, PlaceMatch, RowOutcome};
pub use facility::FacilityRecord;
pub use poi::{Coords, OpeningHours, PoiRecord, TimePoint, TimeRange};
