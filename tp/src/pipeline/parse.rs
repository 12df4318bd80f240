//! Stage 1: parse, merge answers, ask or fill

use tracing::{debug, info, warn};

use super::{RunContext, TripPipeline, sanitize};
use crate::capability::CapabilityError;
use crate::domain::{ClarificationRequest, TripQuery};
use crate::events::Stage;
use crate::intake::{
    Answers, auto_fill, back_extract_duration, budget_supplied, detect_missing, has_required_gaps, merge_answers,
    suggested_query,
};
use crate::pipeline::PipelineError;

pub(super) enum Understood {
    /// Halt and ask the user
    Ask(ClarificationRequest),
    /// Query is complete; `budget_supplied` records whether the user gave a
    /// real budget before defaults were applied
    Ready { query: TripQuery, budget_supplied: bool },
}

impl TripPipeline {
    pub(super) async fn understand(
        &self,
        text: &str,
        ask_if_missing: bool,
        answers: Option<&Answers>,
        run: &mut RunContext,
    ) -> Result<Understood, PipelineError> {
        debug!(%ask_if_missing, has_answers = answers.is_some(), "TripPipeline::understand: called");
        sanitize::guard_input(text).map_err(PipelineError::InvalidInput)?;
        run.emitter.started(Stage::Parse);

        let parser = self.capabilities.parser.clone();
        let owned = text.to_string();
        let mut query = self
            .pool
            .run("parse", async move { parser.parse(&owned).await })
            .await
            .map_err(|e| match e {
                CapabilityError::Panicked(message) => PipelineError::Internal(format!("parser panicked: {}", message)),
                other => {
                    warn!(error = %other, "TripPipeline::understand: parse failed");
                    PipelineError::understand(other.to_string())
                }
            })?;

        if back_extract_duration(&mut query, text) {
            debug!(end = ?query.end_date, "TripPipeline::understand: duration recovered from text");
        }

        if let Some(answers) = answers {
            merge_answers(&mut query, answers, run.today).map_err(|e| PipelineError::InvalidInput(e.to_string()))?;
        }

        let budget_required = self.config.pipeline.budget_required;
        let missing = detect_missing(&query, budget_required);
        if ask_if_missing && has_required_gaps(&missing) {
            debug!(missing = missing.len(), "TripPipeline::understand: asking for missing fields");
            run.emitter.needs_more_info();
            return Ok(Understood::Ask(ClarificationRequest {
                missing_info: missing,
                original_query: text.to_string(),
                suggested_query: suggested_query(&query),
                parsed_so_far: query,
            }));
        }

        let supplied = budget_supplied(&query, self.config.defaults.min_budget_usd);
        let filled = auto_fill(&mut query, &self.config.defaults, run.today);
        if !filled.is_empty() {
            let names: Vec<&str> = filled.iter().map(|f| f.as_str()).collect();
            info!(filled = ?names, "TripPipeline::understand: auto-filled defaults");
        }

        if query.destination().is_none() {
            debug!("TripPipeline::understand: no destination after auto-fill");
            return Err(PipelineError::understand("Missing destination."));
        }
        if query.start_date.is_none() {
            debug!("TripPipeline::understand: no start date after auto-fill");
            return Err(PipelineError::understand("Missing start date."));
        }

        info!(
            destination = ?query.destination,
            start = ?query.start_date,
            end = ?query.end_date,
            budget = ?query.budget_usd,
            "TripPipeline::understand: query ready"
        );
        run.emitter.completed(Stage::Parse);
        Ok(Understood::Ready {
            query,
            budget_supplied: supplied,
        })
    }
}
