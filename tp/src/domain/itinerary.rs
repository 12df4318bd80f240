//! FinalItinerary - the assembled result of a run

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lenient;
use super::{DailyPlan, DestinationReport, FlightOption, HotelOption};
use crate::budget::BudgetAnalysis;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinalItinerary {
    #[serde(deserialize_with = "lenient::string")]
    pub trip_title: String,
    /// Always the requested destination after the consistency check
    #[serde(deserialize_with = "lenient::string")]
    pub destination: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub origin: Option<String>,
    #[serde(deserialize_with = "lenient::opt_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::opt_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::string")]
    pub trip_summary: String,

    pub chosen_outbound_flight: Option<FlightOption>,
    pub chosen_return_flight: Option<FlightOption>,
    /// Headline flight (the outbound one when the split is known)
    pub chosen_flight: Option<FlightOption>,
    pub chosen_hotel: Option<HotelOption>,

    #[serde(deserialize_with = "lenient::list")]
    pub all_flights: Vec<FlightOption>,
    #[serde(deserialize_with = "lenient::list")]
    pub all_hotels: Vec<HotelOption>,

    #[serde(deserialize_with = "lenient::list")]
    pub daily_plans: Vec<DailyPlan>,

    /// Budget narrative; wording differs between analyzed and estimated totals
    #[serde(deserialize_with = "lenient::string")]
    pub budget_overview: String,
    #[serde(deserialize_with = "lenient::usd")]
    pub total_estimated_cost: u32,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub travel_tips: Option<String>,

    /// Present when the user supplied a budget and the analyzer ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_analysis: Option<BudgetAnalysis>,
    pub destination_report: Option<DestinationReport>,
    /// Consistency findings and fallbacks used during the run
    #[serde(deserialize_with = "lenient::list")]
    pub warnings: Vec<String>,
}

impl FinalItinerary {
    /// Number of activities across all days
    pub fn activity_count(&self) -> usize {
        self.daily_plans.iter().map(|d| d.activities.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_partial_assembler_output() {
        let itinerary: FinalItinerary = serde_json::from_value(json!({
            "trip_title": "Tokyo Getaway",
            "destination": "Tokyo",
            "trip_summary": "Temples and ramen",
            "chosen_hotel": {"name": "Hotel Gracery", "price_per_night_usd": "180"},
            "total_estimated_cost": "$1,900",
            "daily_plans": null
        }))
        .unwrap();

        assert_eq!(itinerary.destination, "Tokyo");
        assert_eq!(itinerary.chosen_hotel.as_ref().map(|h| h.price_per_night_usd), Some(180));
        assert_eq!(itinerary.total_estimated_cost, 1900);
        assert!(itinerary.daily_plans.is_empty());
        assert!(itinerary.chosen_flight.is_none());
        assert!(itinerary.warnings.is_empty());
    }
}
