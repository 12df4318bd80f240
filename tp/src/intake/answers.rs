//! Merging user-supplied answers into a query

use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use super::dates::parse_relative_date;
use super::duration::parse_duration_answer;
use crate::domain::lenient::{MAX_BUDGET_USD, parse_number};
use crate::domain::{MAX_TRIP_DAYS, TripField, TripQuery};

/// Answers keyed by field; iteration follows [`TripField`] order
pub type Answers = BTreeMap<TripField, Value>;

#[derive(Debug, Error, PartialEq)]
pub enum IntakeError {
    #[error("Invalid answer for {field}: {reason}")]
    InvalidAnswer { field: TripField, reason: String },

    #[error("{0}")]
    UnknownField(String),

    #[error("Expected field=value, got '{0}'")]
    MalformedPair(String),
}

impl IntakeError {
    fn invalid(field: TripField, reason: impl Into<String>) -> Self {
        Self::InvalidAnswer {
            field,
            reason: reason.into(),
        }
    }
}

/// Parse a `field=value` pair from the command line
pub fn parse_answer_pair(pair: &str) -> Result<(TripField, Value), IntakeError> {
    let (field, value) = pair
        .split_once('=')
        .ok_or_else(|| IntakeError::MalformedPair(pair.to_string()))?;
    let field: TripField = field.parse().map_err(IntakeError::UnknownField)?;
    Ok((field, Value::String(value.trim().to_string())))
}

fn answer_text(field: TripField, value: &Value) -> Result<String, IntakeError> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(IntakeError::invalid(field, "expected text")),
    };
    if text.is_empty() {
        return Err(IntakeError::invalid(field, "answer is empty"));
    }
    Ok(text)
}

fn answer_date(field: TripField, value: &Value, today: NaiveDate) -> Result<NaiveDate, IntakeError> {
    let text = answer_text(field, value)?;
    parse_relative_date(&text, today)
        .ok_or_else(|| IntakeError::invalid(field, format!("'{}' is not a date I understand", text)))
}

fn answer_duration(value: &Value) -> Result<u32, IntakeError> {
    let days = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => parse_duration_answer(s),
        _ => None,
    };
    days.filter(|d| (1..=MAX_TRIP_DAYS).contains(d)).ok_or_else(|| {
        IntakeError::invalid(
            TripField::Duration,
            format!("expected between 1 and {} days", MAX_TRIP_DAYS),
        )
    })
}

fn answer_interests(value: &Value) -> Result<Vec<String>, IntakeError> {
    let items: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|i| i.as_str())
            .map(|s| s.trim().to_string())
            .collect(),
        Value::String(s) => s.split(',').map(|s| s.trim().to_string()).collect(),
        _ => return Err(IntakeError::invalid(TripField::Interests, "expected a list")),
    };
    Ok(items.into_iter().filter(|s| !s.is_empty()).collect())
}

/// Overwrite only the answered fields of `query`
///
/// All answers are validated before anything is written, so a rejected
/// answer leaves the query untouched. A duration sets
/// `end = start + (N-1)` when the start date is known, and is remembered
/// otherwise.
pub fn merge_answers(query: &mut TripQuery, answers: &Answers, today: NaiveDate) -> Result<(), IntakeError> {
    debug!(answer_count = answers.len(), %today, "merge_answers: called");
    let mut staged = query.clone();

    for (field, value) in answers {
        debug!(%field, "merge_answers: applying");
        match field {
            TripField::Destination => staged.destination = Some(answer_text(*field, value)?),
            TripField::Origin => staged.origin = Some(answer_text(*field, value)?),
            TripField::StartDate => {
                staged.start_date = Some(answer_date(*field, value, today)?);
                if staged.duration_days.is_some() {
                    staged.apply_duration();
                }
            }
            TripField::EndDate => {
                staged.end_date = Some(answer_date(*field, value, today)?);
                staged.duration_days = None;
            }
            TripField::Duration => {
                staged.duration_days = Some(answer_duration(value)?);
                staged.apply_duration();
            }
            TripField::Travelers => staged.travelers = Some(answer_text(*field, value)?),
            TripField::Budget => {
                let amount = parse_number(value)
                    .filter(|n| n.is_finite() && *n >= 0.0)
                    .ok_or_else(|| IntakeError::invalid(*field, "expected an amount in USD"))?;
                staged.budget_usd = Some((amount as u32).min(MAX_BUDGET_USD));
            }
            TripField::Interests => staged.interests = answer_interests(value)?,
        }
    }

    *query = staged;
    Ok(())
}
