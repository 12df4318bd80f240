//! Capability interfaces consumed by the pipeline
//!
//! Each capability is an opaque "given this input, produce a structured
//! result or fail" service. The pipeline never looks behind these traits:
//! the [`agents`](crate::agents) module backs them with an LLM, tests back
//! them with the scripted `mock` module (`test-support` feature).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use error::CapabilityError;

use crate::domain::{DailyPlan, DestinationReport, FinalItinerary, LogisticsReport, TripQuery};

/// Input to the itinerary curator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationRequest {
    pub query: TripQuery,
    pub destination: DestinationReport,
    pub logistics: LogisticsReport,
    /// Inclusive number of days to plan
    pub trip_days: u32,
    /// Hotel the days start and end at, when one is known
    pub hotel_name: Option<String>,
}

/// Input to the itinerary assembler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyRequest {
    pub query: TripQuery,
    pub destination: DestinationReport,
    pub logistics: LogisticsReport,
    pub daily_plans: Vec<DailyPlan>,
}

/// Free text to TripQuery
///
/// Leaves a field absent when the text does not state it; never invents one.
#[async_trait]
pub trait QueryParser: Send + Sync {
    async fn parse(&self, text: &str) -> Result<TripQuery, CapabilityError>;
}

#[async_trait]
pub trait DestinationResearcher: Send + Sync {
    async fn research(&self, query: &TripQuery) -> Result<DestinationReport, CapabilityError>;
}

/// Flight and hotel search
///
/// Without an origin the flight lists come back empty; that is not an error.
#[async_trait]
pub trait LogisticsSearcher: Send + Sync {
    async fn search(&self, query: &TripQuery) -> Result<LogisticsReport, CapabilityError>;
}

/// Day-by-day planning
///
/// Returns the raw `{"days": [...]}` payload, possibly wrapped in code
/// fences; the pipeline unwraps and parses it.
#[async_trait]
pub trait ItineraryCurator: Send + Sync {
    async fn curate(&self, request: &CurationRequest) -> Result<String, CapabilityError>;
}

#[async_trait]
pub trait ItineraryAssembler: Send + Sync {
    async fn assemble(&self, request: &AssemblyRequest) -> Result<FinalItinerary, CapabilityError>;
}
