//! Domain types for TripCrew
//!
//! Plain records flowing between pipeline stages. Every type that a
//! capability produces deserializes leniently (see [`lenient`]) so that a
//! loosely formatted payload degrades field-by-field instead of failing.

mod itinerary;
pub mod lenient;
mod outcome;
mod plan;
mod query;
mod report;

pub use itinerary::FinalItinerary;
pub use outcome::{ClarificationRequest, InputType, MissingField, PipelineOutcome, TripField};
pub use plan::{Activity, DailyPlan, total_activities_cost};
pub use query::{MAX_TRIP_DAYS, TripQuery, end_for_duration, is_blank};
pub use report::{
    DEFAULT_AIRLINE, DEFAULT_HOTEL_NAME, DEFAULT_HOTEL_SUMMARY, DestinationReport, FlightOption, FlightSegment,
    HotelOption, LogisticsReport,
};
