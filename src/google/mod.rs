//! Google Maps Places client (Find Place + Place Details).

mod client;
mod types;

pub use client::GooglePlacesClient;
pub use types::{DayTime, OpeningSchedule, OpeningPeriod, PlaceDetails};
