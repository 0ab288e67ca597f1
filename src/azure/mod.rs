//! Azure Maps client: geocoding and POI search.

mod client;
mod types;

pub use client::{AzureMapsClient, PoiQuery};
