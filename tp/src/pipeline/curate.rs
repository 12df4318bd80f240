//! Stage 3: day-by-day curation

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{RunContext, TripPipeline, consistency, destination_of, fallback, sanitize};
use crate::capability::{CapabilityError, CurationRequest};
use crate::domain::{DailyPlan, DestinationReport, LogisticsReport, TripQuery};
use crate::events::Stage;

/// Trip length assumed when the dates cannot be read
pub const DEFAULT_CURATION_DAYS: u32 = 3;

/// Decode a curator reply into day plans
///
/// Accepts `{"days": [...]}` or a bare array, optionally fenced. Items that
/// do not look like a day are skipped; no days at all is an error.
pub fn parse_days(raw: &str) -> Result<Vec<DailyPlan>, CapabilityError> {
    let body = sanitize::unwrap_code_fence(raw);
    let value: Value = serde_json::from_str(body)?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("days") {
            Some(Value::Array(items)) => items,
            _ => return Err(CapabilityError::Malformed("missing 'days' array".to_string())),
        },
        _ => return Err(CapabilityError::Malformed("expected an object with 'days'".to_string())),
    };

    let days: Vec<DailyPlan> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if days.is_empty() {
        return Err(CapabilityError::Malformed("no usable days".to_string()));
    }
    Ok(days)
}

impl TripPipeline {
    pub(super) async fn curate(
        &self,
        query: &TripQuery,
        destination: &DestinationReport,
        logistics: &LogisticsReport,
        run: &mut RunContext,
    ) -> Vec<DailyPlan> {
        let trip_days = query.trip_days().unwrap_or(DEFAULT_CURATION_DAYS);
        let destination_name = destination_of(query);
        debug!(trip_days, destination = %destination_name, "TripPipeline::curate: called");
        run.emitter.started(Stage::Curate);

        let request = CurationRequest {
            query: query.clone(),
            destination: destination.clone(),
            logistics: logistics.clone(),
            trip_days,
            hotel_name: logistics.first_hotel().map(|h| h.name.clone()),
        };
        let curator = self.capabilities.curator.clone();
        let result = self
            .pool
            .run("curate", async move { curator.curate(&request).await })
            .await
            .and_then(|raw| parse_days(&raw));

        let mut plans = match result {
            Ok(plans) => plans,
            Err(e) => {
                warn!(error = %e, "TripPipeline::curate: curation failed, using arrival-day fallback");
                run.emitter.fallback(Stage::Curate, e.to_string());
                run.warnings.push(format!("Day-by-day plan unavailable ({}); showing arrival day only.", e));
                fallback::daily_plans()
            }
        };

        sanitize::normalize_days(&mut plans, query.start_date);

        let findings = consistency::enforce_attraction_policy(
            &mut plans,
            destination_name,
            self.config.pipeline.foreign_attraction_policy,
        );
        run.warnings.extend(findings);

        info!(days = plans.len(), "TripPipeline::curate: complete");
        run.emitter.completed(Stage::Curate);
        plans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_days_fenced_object() {
        let raw = "```json\n{\"days\": [{\"day\": 1, \"title\": \"Old City\", \"activities\": [{\"title\": \"Lahore Fort\", \"estimated_cost_usd\": \"$5\"}]}]}\n```";
        let days = parse_days(raw).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].activities[0].estimated_cost_usd, 5);
    }

    #[test]
    fn test_parse_days_bare_array_skips_junk() {
        let days = parse_days(r#"[{"day": 1, "title": "A"}, "not a day", {"day": 2, "title": "B"}]"#).unwrap();
        assert_eq!(days.len(), 2);
    }

    #[test]
    fn test_parse_days_failures() {
        assert!(parse_days("Sorry, I cannot help with that").is_err());
        assert!(parse_days(r#"{"itinerary": []}"#).is_err());
        assert!(parse_days(r#"{"days": []}"#).is_err());
        assert!(parse_days("42").is_err());
    }
}
