//! Query normalizer and missing-info detector
//!
//! Operates on a [`TripQuery`](crate::domain::TripQuery) between parsing and
//! research:
//!
//! - [`detect_missing`] lists absent fields as clarification descriptors
//! - [`auto_fill`] patches absent fields with configured defaults
//! - [`merge_answers`] applies user answers, field by field
//! - [`back_extract_duration`] recovers a trip length from the raw text

mod answers;
mod autofill;
mod dates;
mod duration;
mod missing;

pub use answers::{Answers, IntakeError, merge_answers, parse_answer_pair};
pub use autofill::{auto_fill, budget_supplied};
pub use dates::{next_friday, parse_count, parse_relative_date};
pub use duration::{back_extract_duration, extract_duration, parse_duration_answer};
pub use missing::{detect_missing, has_required_gaps, suggested_query};
