//! Deterministic fallback objects
//!
//! Each builder produces a schema-valid substitute from data the run
//! already has, so a failed stage never leaves a hole downstream.

use tracing::debug;

use crate::config::BookingConfig;
use crate::domain::{
    Activity, DailyPlan, DestinationReport, FinalItinerary, FlightOption, HotelOption, LogisticsReport, TripQuery,
};

pub const PLACEHOLDER_AIRLINE: &str = "Check Online";
pub const PLACEHOLDER_HOTEL: &str = "Check Local Availability";

/// Generic report built from the destination name alone
pub fn destination_report(destination: &str) -> DestinationReport {
    debug!(%destination, "fallback::destination_report: called");
    DestinationReport {
        summary: format!("Welcome to {}. A wonderful place to visit.", destination),
        weather_forecast: "Please check local forecasts.".to_string(),
        key_regions: vec![destination.to_string()],
        attractions: vec![
            format!("{} City Center", destination),
            format!("{} National Museum", destination),
            format!("{} Old Town", destination),
            format!("{} Central Market", destination),
        ],
        ..Default::default()
    }
}

/// Logistics with no options at all
pub fn logistics_report() -> LogisticsReport {
    LogisticsReport {
        logistics_summary: "No live flight or hotel options were found. Use the booking links to search.".to_string(),
        ..Default::default()
    }
}

/// Single arrival day
pub fn daily_plans() -> Vec<DailyPlan> {
    vec![DailyPlan {
        day: 1,
        title: "Arrival".to_string(),
        activities: vec![Activity {
            time: "14:00".to_string(),
            category: "Check-in".to_string(),
            title: "Hotel Check-in".to_string(),
            description: "Arrive and settle in.".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    }]
}

pub fn placeholder_flight(booking: &BookingConfig) -> FlightOption {
    FlightOption {
        airline: PLACEHOLDER_AIRLINE.to_string(),
        booking_url: Some(booking.flight_search_url.clone()),
        departure_time: Some("TBA".to_string()),
        arrival_time: Some("TBA".to_string()),
        ..Default::default()
    }
}

pub fn placeholder_hotel(destination: &str, booking: &BookingConfig) -> HotelOption {
    HotelOption {
        name: PLACEHOLDER_HOTEL.to_string(),
        summary: "Details unavailable".to_string(),
        booking_url: Some(super::sanitize::hotel_search_link("", destination, booking)),
        address: Some("City Center".to_string()),
        ..Default::default()
    }
}

/// Itinerary built straight from the option lists
///
/// Stage 4 overlays the same pipeline data on an assembled itinerary, so
/// this only needs the parts an assembler would have authored.
pub fn itinerary(query: &TripQuery, logistics: &LogisticsReport, booking: &BookingConfig) -> FinalItinerary {
    let destination = query.destination().unwrap_or("Your Destination");
    debug!(%destination, "fallback::itinerary: called");

    FinalItinerary {
        trip_title: format!("Trip to {}", destination),
        destination: destination.to_string(),
        trip_summary: "Here is your generated itinerary based on available data.".to_string(),
        chosen_outbound_flight: logistics.outbound_flights.first().cloned(),
        chosen_return_flight: logistics.return_flights.first().cloned(),
        chosen_flight: logistics
            .flight_options
            .first()
            .or(logistics.outbound_flights.first())
            .cloned()
            .or_else(|| Some(placeholder_flight(booking))),
        chosen_hotel: logistics
            .first_hotel()
            .cloned()
            .or_else(|| Some(placeholder_hotel(destination, booking))),
        budget_overview: "Estimated based on typical costs.".to_string(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_report_mentions_destination() {
        let report = destination_report("Lahore");
        assert!(report.summary.contains("Lahore"));
        assert_eq!(report.attractions.len(), 4);
        assert!(report.attractions.iter().all(|a| a.starts_with("Lahore")));
        assert!(!report.is_empty());
    }

    #[test]
    fn test_logistics_report_is_empty() {
        assert!(logistics_report().is_empty());
    }

    #[test]
    fn test_itinerary_uses_placeholders_without_options() {
        let query = TripQuery {
            destination: Some("Lahore".to_string()),
            ..Default::default()
        };
        let itinerary = itinerary(&query, &LogisticsReport::default(), &BookingConfig::default());

        assert_eq!(itinerary.destination, "Lahore");
        let flight = itinerary.chosen_flight.unwrap();
        assert_eq!(flight.airline, PLACEHOLDER_AIRLINE);
        assert_eq!(flight.booking_url.as_deref(), Some("https://www.google.com/flights"));
        let hotel = itinerary.chosen_hotel.unwrap();
        assert_eq!(hotel.name, PLACEHOLDER_HOTEL);
        assert!(hotel.booking_url.unwrap().starts_with("https://www.booking.com/"));
        assert!(itinerary.chosen_outbound_flight.is_none());
    }

    #[test]
    fn test_itinerary_prefers_first_options() {
        let query = TripQuery {
            destination: Some("Dubai".to_string()),
            ..Default::default()
        };
        let logistics = LogisticsReport {
            outbound_flights: vec![FlightOption {
                airline: "PIA".to_string(),
                price_usd: 300,
                ..Default::default()
            }],
            hotel_options: vec![HotelOption {
                name: "Rove Downtown".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let itinerary = itinerary(&query, &logistics, &BookingConfig::default());

        assert_eq!(itinerary.chosen_flight.unwrap().airline, "PIA");
        assert_eq!(itinerary.chosen_outbound_flight.unwrap().airline, "PIA");
        assert_eq!(itinerary.chosen_hotel.unwrap().name, "Rove Downtown");
    }
}
