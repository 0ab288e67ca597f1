//! Coordinates and point-of-interest records from the POI search pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Geographic point (lat/lon)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: f64,
    pub lon: f64,
}

impl std::fmt::Display for Coords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

/// A business or place entity returned by a POI search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoiRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// Single-line formatted address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Coords>,
    /// Distance from the search bias point in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<OpeningHours>,
}

/// Opening hours as reported for the requested window (e.g. next seven days)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default)]
    pub time_ranges: Vec<TimeRange>,
}

impl OpeningHours {
    /// One line per time range, e.g. "Thursday 07:00-21:00"
    pub fn daily_lines(&self) -> Vec<String> {
        self.time_ranges.iter().map(TimeRange::describe).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_time: TimePoint,
    pub end_time: TimePoint,
}

impl TimeRange {
    /// Render the range with weekday names.
    ///
    /// Ranges crossing midnight name both days.
    pub fn describe(&self) -> String {
        let start_day = self.start_time.weekday();
        let end_day = self.end_time.weekday();

        if self.start_time.date == self.end_time.date {
            format!(
                "{} {}-{}",
                start_day,
                self.start_time.clock(),
                self.end_time.clock()
            )
        } else {
            format!(
                "{} {}-{} {}",
                start_day,
                self.start_time.clock(),
                end_day,
                self.end_time.clock()
            )
        }
    }
}

/// Local date and time of day, as the provider reports them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    /// ISO date, "YYYY-MM-DD"
    pub date: String,
    pub hour: u8,
    pub minute: u8,
}

impl TimePoint {
    /// Weekday name for the date, or the raw date when it does not parse
    pub fn weekday(&self) -> String {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map(|d| d.format("%A").to_string())
            .unwrap_or_else(|_| self.date.clone())
    }

    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}
