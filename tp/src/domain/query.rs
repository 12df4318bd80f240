//! TripQuery - the normalized trip request

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::lenient;

/// Structured representation of the user's travel request
///
/// Built once at the parse boundary; every downstream component reads only
/// this type. Text fields are `None` rather than blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripQuery {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub destination: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub origin: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "lenient::opt_date")]
    pub end_date: Option<NaiveDate>,

    /// Number of travelers as stated ("2", "2 adults")
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub travelers: Option<String>,

    /// Total budget in USD, capped at [`lenient::MAX_BUDGET_USD`]
    #[serde(default, alias = "budget", deserialize_with = "lenient::budget")]
    pub budget_usd: Option<u32>,

    #[serde(default, deserialize_with = "lenient::list")]
    pub interests: Vec<String>,

    /// Requested trip length, kept so a later start date still yields the
    /// right end date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
}

/// True when the text is absent or whitespace-only
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Longest trip length accepted from text or answers
pub const MAX_TRIP_DAYS: u32 = 365;

/// Last day of an N-day trip starting on `start` (day N is start + N-1)
///
/// `None` when the end falls outside the representable calendar.
pub fn end_for_duration(start: NaiveDate, days: u32) -> Option<NaiveDate> {
    let span = days.max(1) - 1;
    start.checked_add_days(chrono::Days::new(u64::from(span)))
}

impl TripQuery {
    /// Destination if present and non-blank
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref().filter(|d| !d.trim().is_empty())
    }

    /// Origin if present and non-blank
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref().filter(|o| !o.trim().is_empty())
    }

    /// Inclusive trip length in days when both dates are known and ordered
    pub fn trip_days(&self) -> Option<u32> {
        debug!(start = ?self.start_date, end = ?self.end_date, "TripQuery::trip_days: called");
        let (start, end) = (self.start_date?, self.end_date?);
        let span = (end - start).num_days();
        if span < 0 {
            debug!("TripQuery::trip_days: end precedes start");
            return None;
        }
        u32::try_from(span + 1).ok()
    }

    /// Number of travelers as a count, reading the leading digits
    pub fn traveler_count(&self) -> u32 {
        self.travelers
            .as_deref()
            .and_then(|t| {
                let digits: String = t.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse::<u32>().ok()
            })
            .filter(|n| *n > 0)
            .unwrap_or(1)
    }

    /// Apply a known duration to the start date, if both are available
    pub fn apply_duration(&mut self) {
        if let Some(start) = self.start_date
            && let Some(days) = self.duration_days
        {
            debug!(%start, days, "TripQuery::apply_duration: deriving end date");
            self.end_date = end_for_duration(start, days);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_deserialize_lenient_query() {
        let query: TripQuery = serde_json::from_value(json!({
            "destination": "Dubai",
            "origin": "  ",
            "start_date": "2025-12-12",
            "end_date": "not a date",
            "travelers": 2,
            "budget_usd": "$2,000",
            "interests": null
        }))
        .unwrap();

        assert_eq!(query.destination.as_deref(), Some("Dubai"));
        assert_eq!(query.origin, None);
        assert_eq!(query.start_date, Some(date(2025, 12, 12)));
        assert_eq!(query.end_date, None);
        assert_eq!(query.travelers.as_deref(), Some("2"));
        assert_eq!(query.budget_usd, Some(2000));
        assert!(query.interests.is_empty());
    }

    #[test]
    fn test_budget_alias() {
        let query: TripQuery = serde_json::from_value(json!({"budget": 1500})).unwrap();
        assert_eq!(query.budget_usd, Some(1500));
    }

    #[test]
    fn test_end_for_duration_is_inclusive() {
        assert_eq!(end_for_duration(date(2025, 12, 12), 5), Some(date(2025, 12, 16)));
        assert_eq!(end_for_duration(date(2025, 12, 12), 1), Some(date(2025, 12, 12)));
        assert_eq!(end_for_duration(date(2025, 12, 30), 3), Some(date(2026, 1, 1)));
    }

    #[test]
    fn test_end_for_duration_out_of_range() {
        assert_eq!(end_for_duration(NaiveDate::MAX, 2), None);
        assert_eq!(end_for_duration(NaiveDate::MAX, 1), Some(NaiveDate::MAX));
    }

    #[test]
    fn test_trip_days() {
        let mut query = TripQuery {
            start_date: Some(date(2025, 12, 12)),
            end_date: Some(date(2025, 12, 16)),
            ..Default::default()
        };
        assert_eq!(query.trip_days(), Some(5));

        query.end_date = Some(date(2025, 12, 10));
        assert_eq!(query.trip_days(), None);
    }

    #[test]
    fn test_traveler_count() {
        let mut query = TripQuery::default();
        assert_eq!(query.traveler_count(), 1);
        query.travelers = Some("3 adults".to_string());
        assert_eq!(query.traveler_count(), 3);
        query.travelers = Some("a couple".to_string());
        assert_eq!(query.traveler_count(), 1);
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some("  \t")));
        assert!(!is_blank(Some("Paris")));
    }
}
