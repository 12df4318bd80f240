//! Stage 2 research reports

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::lenient;

pub const DEFAULT_AIRLINE: &str = "Unknown Airline";
pub const DEFAULT_HOTEL_NAME: &str = "Unknown Hotel";
pub const DEFAULT_HOTEL_SUMMARY: &str = "Details not available";

/// One leg of a connecting flight
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightSegment {
    #[serde(deserialize_with = "lenient::string")]
    pub from: String,
    #[serde(deserialize_with = "lenient::string")]
    pub to: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub airline: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub flight_number: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub departure_time: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub arrival_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightOption {
    #[serde(deserialize_with = "lenient::string")]
    pub airline: String,
    #[serde(deserialize_with = "lenient::usd")]
    pub price_usd: u32,
    #[serde(deserialize_with = "lenient::non_negative_f64")]
    pub duration_hours: f64,
    #[serde(deserialize_with = "lenient::usd")]
    pub stops: u32,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub booking_url: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub departure_time: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub arrival_time: Option<String>,
    #[serde(deserialize_with = "lenient::list", skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<FlightSegment>,
}

impl Default for FlightOption {
    fn default() -> Self {
        Self {
            airline: DEFAULT_AIRLINE.to_string(),
            price_usd: 0,
            duration_hours: 0.0,
            stops: 0,
            booking_url: None,
            departure_time: None,
            arrival_time: None,
            segments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotelOption {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::usd")]
    pub price_per_night_usd: u32,
    #[serde(deserialize_with = "lenient::rating")]
    pub rating: f64,
    #[serde(deserialize_with = "lenient::summary")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub booking_url: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub address: Option<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub amenities: Vec<String>,
}

impl Default for HotelOption {
    fn default() -> Self {
        Self {
            name: DEFAULT_HOTEL_NAME.to_string(),
            price_per_night_usd: 0,
            rating: 0.0,
            summary: DEFAULT_HOTEL_SUMMARY.to_string(),
            booking_url: None,
            address: None,
            amenities: Vec::new(),
        }
    }
}

/// What the destination researcher knows about the place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationReport {
    #[serde(deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::string")]
    pub weather_forecast: String,
    #[serde(deserialize_with = "lenient::list")]
    pub key_regions: Vec<String>,
    /// Ordered by relevance, unique per report
    #[serde(deserialize_with = "lenient::list")]
    pub attractions: Vec<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub cultural_and_safety_tips: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub best_time_to_visit: Option<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub local_cuisine: Vec<String>,
}

impl Default for DestinationReport {
    fn default() -> Self {
        Self {
            summary: "Summary unavailable".to_string(),
            weather_forecast: "Weather data unavailable".to_string(),
            key_regions: Vec::new(),
            attractions: Vec::new(),
            cultural_and_safety_tips: "Exercise normal precautions".to_string(),
            best_time_to_visit: None,
            local_cuisine: Vec::new(),
        }
    }
}

impl DestinationReport {
    /// A report with no summary and no attractions carries nothing usable
    pub fn is_empty(&self) -> bool {
        self.summary.trim().is_empty() && self.attractions.is_empty()
    }

    /// Drop blank and case-insensitively repeated attractions, keeping order
    pub fn dedupe_attractions(&mut self) {
        debug!(count = self.attractions.len(), "DestinationReport::dedupe_attractions: called");
        let mut seen = std::collections::HashSet::new();
        self.attractions.retain(|a| {
            let key = a.trim().to_lowercase();
            !key.is_empty() && seen.insert(key)
        });
    }
}

/// Flight and hotel options found for the trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticsReport {
    #[serde(alias = "outbound_flight_options", deserialize_with = "lenient::list")]
    pub outbound_flights: Vec<FlightOption>,
    #[serde(alias = "return_flight_options", deserialize_with = "lenient::list")]
    pub return_flights: Vec<FlightOption>,
    /// Combined list kept for consumers that predate the outbound/return split
    #[serde(alias = "flights", deserialize_with = "lenient::list")]
    pub flight_options: Vec<FlightOption>,
    #[serde(alias = "hotels", deserialize_with = "lenient::list")]
    pub hotel_options: Vec<HotelOption>,
    #[serde(deserialize_with = "lenient::string")]
    pub logistics_summary: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub booking_link_flights: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub booking_link_hotels: Option<String>,
}

impl Default for LogisticsReport {
    fn default() -> Self {
        Self {
            outbound_flights: Vec::new(),
            return_flights: Vec::new(),
            flight_options: Vec::new(),
            hotel_options: Vec::new(),
            logistics_summary: "Details below.".to_string(),
            booking_link_flights: None,
            booking_link_hotels: None,
        }
    }
}

impl LogisticsReport {
    /// No flight or hotel option of any kind
    pub fn is_empty(&self) -> bool {
        self.outbound_flights.is_empty()
            && self.return_flights.is_empty()
            && self.flight_options.is_empty()
            && self.hotel_options.is_empty()
    }

    /// Drop every flight list (used when there is no origin to fly from)
    pub fn clear_flights(&mut self) {
        self.outbound_flights.clear();
        self.return_flights.clear();
        self.flight_options.clear();
    }

    /// First hotel, if any
    pub fn first_hotel(&self) -> Option<&HotelOption> {
        self.hotel_options.first()
    }
}
