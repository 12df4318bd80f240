//! Missing-information detection and clarification prompts

use tracing::debug;

use crate::domain::{InputType, MissingField, TripField, TripQuery, is_blank};

/// Clarification descriptor for one field
///
/// Priorities fix the asking order. Destination is first since no research
/// can proceed without it.
fn descriptor(field: TripField, required: bool) -> MissingField {
    let (question, input_type, priority, hint) = match field {
        TripField::Destination => (
            "Where would you like to go?",
            InputType::Text,
            1,
            "A city or country, e.g. Tokyo or Portugal",
        ),
        TripField::Origin => (
            "Where will you be traveling from?",
            InputType::Text,
            2,
            "Your departure city, used to search flights",
        ),
        TripField::StartDate => (
            "When do you want to start your trip?",
            InputType::Date,
            3,
            "YYYY-MM-DD, or something like 'next weekend' or 'in 2 weeks'",
        ),
        TripField::Duration | TripField::EndDate => (
            "How many days will the trip last?",
            InputType::Number,
            4,
            "Number of days, or an end date as YYYY-MM-DD",
        ),
        TripField::Travelers => (
            "How many people are traveling?",
            InputType::Number,
            5,
            "e.g. 2",
        ),
        TripField::Budget => (
            "What is your total budget in USD?",
            InputType::Number,
            6,
            "Total for the whole trip, e.g. 2500",
        ),
        TripField::Interests => (
            "What are you interested in?",
            InputType::Text,
            7,
            "e.g. food, museums, hiking",
        ),
    };

    MissingField {
        field,
        question: question.to_string(),
        input_type,
        required,
        priority,
        hint: Some(hint.to_string()),
    }
}

/// List the absent fields of a query, highest priority first
///
/// The budget descriptor is always reported when the budget is absent;
/// `budget_required` only decides whether it blocks the run.
pub fn detect_missing(query: &TripQuery, budget_required: bool) -> Vec<MissingField> {
    debug!(budget_required, "detect_missing: called");
    let mut missing = Vec::new();

    if is_blank(query.destination.as_deref()) {
        debug!("detect_missing: destination absent");
        missing.push(descriptor(TripField::Destination, true));
    }
    if is_blank(query.origin.as_deref()) {
        debug!("detect_missing: origin absent");
        missing.push(descriptor(TripField::Origin, true));
    }
    if query.start_date.is_none() {
        debug!("detect_missing: start date absent");
        missing.push(descriptor(TripField::StartDate, true));
    }
    if query.end_date.is_none() && query.duration_days.is_none() {
        debug!("detect_missing: end date and duration absent");
        missing.push(descriptor(TripField::Duration, true));
    }
    if is_blank(query.travelers.as_deref()) {
        debug!("detect_missing: travelers absent");
        missing.push(descriptor(TripField::Travelers, true));
    }
    if query.budget_usd.is_none_or(|b| b == 0) {
        debug!("detect_missing: budget absent");
        missing.push(descriptor(TripField::Budget, budget_required));
    }

    missing.sort_by_key(|m| m.priority);
    missing
}

/// True when any descriptor blocks the run
pub fn has_required_gaps(missing: &[MissingField]) -> bool {
    missing.iter().any(|m| m.required)
}

/// Rebuild a request sentence from the fields known so far
pub fn suggested_query(query: &TripQuery) -> String {
    debug!("suggested_query: called");
    let mut parts = Vec::new();

    match query.trip_days().or(query.duration_days) {
        Some(days) => parts.push(format!("Plan a {}-day trip", days)),
        None => parts.push("Plan a trip".to_string()),
    }
    if let Some(destination) = query.destination() {
        parts.push(format!("to {}", destination));
    }
    if let Some(origin) = query.origin() {
        parts.push(format!("from {}", origin));
    }
    if let Some(start) = query.start_date {
        parts.push(format!("starting {}", start.format("%Y-%m-%d")));
    }
    if let Some(travelers) = query.travelers.as_deref().filter(|t| !t.trim().is_empty()) {
        parts.push(format!("for {} traveler(s)", travelers.trim()));
    }
    if let Some(budget) = query.budget_usd.filter(|b| *b > 0) {
        parts.push(format!("with a budget of ${}", budget));
    }

    let mut sentence = parts.join(" ");
    if !query.interests.is_empty() {
        sentence.push_str(&format!(". Interests: {}", query.interests.join(", ")));
    }
    sentence.push('.');
    sentence
}
