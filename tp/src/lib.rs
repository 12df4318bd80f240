//! TripCrew - multi-agent trip planning pipeline
//!
//! TripCrew turns a free-text trip request into a structured, multi-day
//! itinerary with flight/hotel options and a budget breakdown. Five
//! capabilities (parser, destination researcher, logistics searcher,
//! curator, assembler) are driven by a four-stage pipeline controller.
//!
//! # Core Concepts
//!
//! - **Typed Intake**: the request is normalised once into a [`TripQuery`]
//! - **Ask or Fill**: missing fields either halt the run with clarification
//!   questions or are patched with configured defaults
//! - **Isolated Research**: destination and logistics research run
//!   concurrently and each falls back independently
//! - **Degrade, Never Abort**: after parsing, every failure is replaced by a
//!   deterministic fallback and the run completes
//!
//! # Modules
//!
//! - [`pipeline`] - Stage controller, worker pool, fallbacks, sanitization
//! - [`intake`] - Missing-info detection, auto-fill, answer merge
//! - [`budget`] - Budget analyzer and accommodation cost estimator
//! - [`capability`] - Capability traits consumed by the pipeline
//! - [`agents`] - LLM-backed capability implementations
//! - [`llm`] - LLM client trait and OpenAI-compatible implementation
//! - [`events`] - Stage progress event bus
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod agents;
pub mod budget;
pub mod capability;
pub mod cli;
pub mod config;
pub mod domain;
pub mod events;
pub mod intake;
pub mod llm;
pub mod pipeline;

pub use budget::{BudgetAnalysis, BudgetTier, analyze_budget, estimate_accommodation_cost};
pub use capability::{
    CapabilityError, DestinationResearcher, ItineraryAssembler, ItineraryCurator, LogisticsSearcher, QueryParser,
};
pub use config::Config;
pub use domain::{
    Activity, ClarificationRequest, DailyPlan, DestinationReport, FinalItinerary, FlightOption, HotelOption,
    LogisticsReport, PipelineOutcome, TripQuery,
};
pub use events::{EventBus, StageEvent};
pub use pipeline::{Capabilities, PipelineError, TripPipeline};
