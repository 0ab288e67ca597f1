//! Facility lookup - enrich facility tables from Google Places and search
//! points of interest with Azure Maps.
//!
//! This library provides the shared clients, table I/O and batch machinery for
//! the `lookup_tool` and `poi_search` binaries.

pub mod azure;
pub mod batch;
pub mod config;
pub mod error;
pub mod google;
pub mod models;
pub mod table;

pub use error::{LookupError, Result};
pub use models::{Coords, FacilityRecord, PlaceMatch, PoiRecord, RowOutcome};
