//! Query parser agent

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use tracing::debug;

use super::AgentContext;
use crate::capability::{CapabilityError, QueryParser};
use crate::domain::TripQuery;

/// Turns free text into a TripQuery, leaving unstated fields absent
pub struct LlmQueryParser {
    ctx: AgentContext,
    today: Option<NaiveDate>,
}

impl LlmQueryParser {
    pub fn new(ctx: AgentContext) -> Self {
        Self { ctx, today: None }
    }

    /// Pin "today" instead of reading the local clock
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[async_trait]
impl QueryParser for LlmQueryParser {
    async fn parse(&self, text: &str) -> Result<TripQuery, CapabilityError> {
        let today = self.today();
        debug!(%today, len = text.len(), "LlmQueryParser::parse: called");
        let context = json!({ "today": today.format("%Y-%m-%d").to_string() });
        self.ctx.ask_json("parse", context, text.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::test_support::context_with;

    #[tokio::test]
    async fn test_parse_lenient_payload() {
        let (ctx, mock) = context_with(
            r#"{"destination": "Tokyo", "origin": "", "start_date": "2025-12-12", "end_date": null,
                "travelers": 2, "budget": "$3,000", "interests": "food"}"#,
        );
        let parser = LlmQueryParser::new(ctx).with_today(NaiveDate::from_ymd_opt(2025, 12, 8).unwrap());

        let query = parser.parse("Tokyo for 2 with $3000, food").await.unwrap();

        assert_eq!(query.destination.as_deref(), Some("Tokyo"));
        assert!(query.origin.is_none());
        assert_eq!(query.start_date, NaiveDate::from_ymd_opt(2025, 12, 12));
        assert!(query.end_date.is_none());
        assert_eq!(query.travelers.as_deref(), Some("2"));
        assert_eq!(query.budget_usd, Some(3000));
        assert_eq!(query.interests, vec!["food".to_string()]);

        let request = &mock.requests()[0];
        assert!(request.system_prompt.contains("2025-12-08"));
        assert_eq!(request.messages[0].content, "Tokyo for 2 with $3000, food");
    }
}
