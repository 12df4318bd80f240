//! Destination and logistics research agents

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::AgentContext;
use crate::capability::{CapabilityError, DestinationResearcher, LogisticsSearcher};
use crate::config::BookingConfig;
use crate::domain::{DestinationReport, LogisticsReport, TripQuery};

fn date_or_empty(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

pub struct LlmDestinationResearcher {
    ctx: AgentContext,
}

impl LlmDestinationResearcher {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl DestinationResearcher for LlmDestinationResearcher {
    async fn research(&self, query: &TripQuery) -> Result<DestinationReport, CapabilityError> {
        let destination = query
            .destination()
            .ok_or_else(|| CapabilityError::Unavailable("no destination to research".to_string()))?;
        debug!(%destination, "LlmDestinationResearcher::research: called");

        let context = json!({
            "destination": destination,
            "start_date": date_or_empty(query.start_date),
            "end_date": date_or_empty(query.end_date),
            "interests": query.interests.join(", "),
        });
        let mut report: DestinationReport = self
            .ctx
            .ask_json("destination", context, format!("Research {} for my trip.", destination))
            .await?;

        report.dedupe_attractions();
        debug!(attractions = report.attractions.len(), "LlmDestinationResearcher::research: done");
        Ok(report)
    }
}

pub struct LlmLogisticsSearcher {
    ctx: AgentContext,
    booking: BookingConfig,
}

impl LlmLogisticsSearcher {
    pub fn new(ctx: AgentContext, booking: BookingConfig) -> Self {
        Self { ctx, booking }
    }
}

#[async_trait]
impl LogisticsSearcher for LlmLogisticsSearcher {
    async fn search(&self, query: &TripQuery) -> Result<LogisticsReport, CapabilityError> {
        let destination = query
            .destination()
            .ok_or_else(|| CapabilityError::Unavailable("no destination to search".to_string()))?;
        let origin = query.origin();
        debug!(%destination, ?origin, "LlmLogisticsSearcher::search: called");

        let context = json!({
            "destination": destination,
            "origin": origin,
            "start_date": date_or_empty(query.start_date),
            "end_date": date_or_empty(query.end_date),
            "travelers": query.traveler_count().to_string(),
            "hotel_search_url": self.booking.hotel_search_url,
            "flight_search_url": self.booking.flight_search_url,
        });
        let user = match origin {
            Some(origin) => format!("Find flights from {} and hotels in {}.", origin, destination),
            None => format!("Find hotels in {}.", destination),
        };
        let mut report: LogisticsReport = self.ctx.ask_json("logistics", context, user).await?;

        if origin.is_none() {
            debug!("LlmLogisticsSearcher::search: no origin, dropping flights");
            report.clear_flights();
        }
        Ok(report)
    }
}
