//! Itinerary curator agent

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::AgentContext;
use crate::capability::{CapabilityError, CurationRequest, ItineraryCurator};

/// Attractions handed to the curator, most relevant first
const MAX_ATTRACTIONS: usize = 10;

const DEFAULT_INTERESTS: &str = "general sightseeing";
const DEFAULT_HOTEL: &str = "Central Hotel";

pub struct LlmItineraryCurator {
    ctx: AgentContext,
}

impl LlmItineraryCurator {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }
}

fn curation_context(request: &CurationRequest) -> serde_json::Value {
    let destination = request.query.destination().unwrap_or_default();
    let interests = if request.query.interests.is_empty() {
        DEFAULT_INTERESTS.to_string()
    } else {
        request.query.interests.join(", ")
    };
    let attractions: Vec<&String> = request.destination.attractions.iter().take(MAX_ATTRACTIONS).collect();

    json!({
        "destination": destination,
        "trip_days": request.trip_days.max(1),
        "attractions": attractions,
        "interests": interests,
        "hotel_name": request.hotel_name.as_deref().unwrap_or(DEFAULT_HOTEL),
    })
}

#[async_trait]
impl ItineraryCurator for LlmItineraryCurator {
    /// Raw reply; the pipeline owns unwrapping and validation
    async fn curate(&self, request: &CurationRequest) -> Result<String, CapabilityError> {
        debug!(trip_days = request.trip_days, "LlmItineraryCurator::curate: called");
        let context = curation_context(request);
        let user = format!(
            "Plan {} days in {}.",
            request.trip_days.max(1),
            request.query.destination().unwrap_or("the destination")
        );
        self.ctx.ask("curate", context, user).await
    }
}
