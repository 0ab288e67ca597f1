//! Azure Maps wire types.

use serde::Deserialize;

use crate::models::{Coords, OpeningHours, PoiRecord};

/// GeoJSON feature collection returned by the geocoding API
#[derive(Debug, Deserialize)]
pub(super) struct GeocodeResponse {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Feature {
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub(super) struct Geometry {
    /// [lon, lat]
    pub coordinates: Vec<f64>,
}

impl Geometry {
    pub fn coords(&self) -> Option<Coords> {
        match self.coordinates.as_slice() {
            [lon, lat, ..] => Some(Coords {
                lat: *lat,
                lon: *lon,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PoiSearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchResult {
    pub poi: Option<PoiSection>,
    pub address: Option<AddressSection>,
    pub position: Option<Coords>,
    pub dist: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PoiSection {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AddressSection {
    pub freeform_address: Option<String>,
}

/// Error body, e.g. `{"error": {"code": "401 Unauthorized", "message": "..."}}`
#[derive(Debug, Deserialize)]
pub(super) struct ErrorResponse {
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorDetail {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl SearchResult {
    /// Results without a POI section (addresses, streets) are not places
    pub fn into_poi(self) -> Option<PoiRecord> {
        let poi = self.poi?;
        Some(PoiRecord {
            name: poi.name.unwrap_or_default(),
            phone: poi.phone,
            url: poi.url,
            categories: poi.categories,
            address: self.address.and_then(|a| a.freeform_address),
            position: self.position,
            distance_m: self.dist,
            opening_hours: poi.opening_hours,
        })
    }
}
