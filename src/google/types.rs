//! Places API wire types.

use serde::{Deserialize, Serialize};

use crate::models::PlaceMatch;

#[derive(Debug, Deserialize)]
pub(super) struct FindPlaceResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub status: String,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Candidate {
    pub place_id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct DetailsResponse {
    pub result: Option<PlaceDetails>,
    pub status: String,
    pub error_message: Option<String>,
}

/// Subset of Place Details the enrichment asks for
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetails {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub formatted_phone_number: Option<String>,
    /// Google Maps URL for the place
    pub url: Option<String>,
    pub opening_hours: Option<OpeningSchedule>,
    pub editorial_summary: Option<EditorialSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditorialSummary {
    pub overview: Option<String>,
}

/// Weekly opening schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningSchedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
    /// Human-readable line per weekday, e.g. "Monday: 9:00 AM – 5:00 PM"
    #[serde(default)]
    pub weekday_text: Vec<String>,
    #[serde(default)]
    pub periods: Vec<OpeningPeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningPeriod {
    pub open: DayTime,
    /// Absent for places open around the clock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<DayTime>,
}

/// Day of week (0 = Sunday) and "HHMM" local time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTime {
    pub day: u8,
    pub time: String,
}

impl PlaceDetails {
    /// Flatten into output fields; anything missing becomes blank
    pub fn into_match(self) -> PlaceMatch {
        let hours = self
            .opening_hours
            .as_ref()
            .and_then(|h| serde_json::to_string(h).ok())
            .unwrap_or_default();

        PlaceMatch {
            name: self.name.unwrap_or_default(),
            address: self.formatted_address.unwrap_or_default(),
            phone: self.formatted_phone_number.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            hours,
            summary: self
                .editorial_summary
                .and_then(|s| s.overview)
                .unwrap_or_default(),
        }
    }
}
