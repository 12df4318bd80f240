//! Final itinerary assembler agent

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::AgentContext;
use crate::capability::{AssemblyRequest, CapabilityError, ItineraryAssembler};
use crate::domain::FinalItinerary;

/// Attractions named in the assembly prompt
const PROMPT_ATTRACTIONS: usize = 5;

pub struct LlmItineraryAssembler {
    ctx: AgentContext,
}

impl LlmItineraryAssembler {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ItineraryAssembler for LlmItineraryAssembler {
    async fn assemble(&self, request: &AssemblyRequest) -> Result<FinalItinerary, CapabilityError> {
        let destination = request.query.destination().unwrap_or("the destination");
        debug!(%destination, days = request.daily_plans.len(), "LlmItineraryAssembler::assemble: called");

        let attractions: Vec<&str> = request
            .destination
            .attractions
            .iter()
            .take(PROMPT_ATTRACTIONS)
            .map(String::as_str)
            .collect();
        let context = json!({
            "destination": destination,
            "num_days": request.daily_plans.len(),
            "num_outbound": request.logistics.outbound_flights.len(),
            "num_return": request.logistics.return_flights.len(),
            "num_hotels": request.logistics.hotel_options.len(),
            "attractions": attractions.join(", "),
        });
        let user = serde_json::to_string(request)?;

        self.ctx.ask_json("assemble", context, user).await
    }
}
