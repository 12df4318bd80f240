//! Trip duration extraction from free text

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::dates::parse_count;
use crate::domain::{MAX_TRIP_DAYS, TripQuery};

/// Duration phrases in the order they are tried
///
/// "for N days", "N-day", "N day(s) trip", "for N weeks", "N-week"
static DURATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bfor\s+(?:a\s+|about\s+)?(?P<n>\d+|[a-z]+)\s+(?P<unit>days?|weeks?)\b",
        r"(?i)\b(?P<n>\d+|[a-z]+)[\s-](?P<unit>days?|weeks?)\b",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Number of trip days mentioned in the text, if any
///
/// Weeks count as seven days. Zero-length matches and trips longer than
/// [`MAX_TRIP_DAYS`] are ignored.
pub fn extract_duration(text: &str) -> Option<u32> {
    debug!(text_len = text.len(), "extract_duration: called");
    for pattern in DURATION_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let Some(n) = caps.name("n").and_then(|m| parse_count(m.as_str())) else {
                continue;
            };
            let unit = caps.name("unit").map(|m| m.as_str().to_lowercase()).unwrap_or_default();
            let days = if unit.starts_with("week") { n.saturating_mul(7) } else { n };
            if days > MAX_TRIP_DAYS {
                debug!(days, "extract_duration: duration out of range, skipping");
                continue;
            }
            if days > 0 {
                debug!(days, "extract_duration: matched");
                return Some(days);
            }
        }
    }
    debug!("extract_duration: no duration found");
    None
}

/// Interpret a duration answer: a bare count means days
pub fn parse_duration_answer(text: &str) -> Option<u32> {
    debug!(%text, "parse_duration_answer: called");
    let trimmed = text.trim();
    if let Some(n) = parse_count(trimmed).filter(|n| *n > 0) {
        return (n <= MAX_TRIP_DAYS).then_some(n);
    }
    // "5 days", "one week", "a week"
    let padded = format!("for {}", trimmed);
    extract_duration(&padded)
}

/// Fill the end date from a duration mentioned in the raw request
///
/// Runs only when the parser produced a start date without an end date.
/// The duration is also recorded so it survives later date changes.
pub fn back_extract_duration(query: &mut TripQuery, raw_text: &str) -> bool {
    debug!(start = ?query.start_date, end = ?query.end_date, "back_extract_duration: called");
    if query.end_date.is_some() {
        debug!("back_extract_duration: end date already known");
        return false;
    }

    let Some(days) = extract_duration(raw_text) else {
        return false;
    };

    query.duration_days = Some(days);
    if query.start_date.is_some() {
        query.apply_duration();
        debug!(end = ?query.end_date, "back_extract_duration: end date derived");
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_extract_duration_patterns() {
        assert_eq!(extract_duration("Trip to Paris for 5 days in June"), Some(5));
        assert_eq!(extract_duration("a 10-day trip from Madinah to Rome"), Some(10));
        assert_eq!(extract_duration("7 days trip to Bali"), Some(7));
        assert_eq!(extract_duration("Tokyo for two weeks"), Some(14));
        assert_eq!(extract_duration("for a week in Lisbon"), Some(7));
        assert_eq!(extract_duration("3 day weekend in Prague"), Some(3));
    }

    #[test]
    fn test_extract_duration_none() {
        assert_eq!(extract_duration("Trip to Paris with 2 adults"), None);
        assert_eq!(extract_duration("Budget is $2000"), None);
        assert_eq!(extract_duration("for 0 days"), None);
        assert_eq!(extract_duration("Tokyo for 100000000 days"), None);
        assert_eq!(extract_duration("a 400-day trip"), None);
    }

    #[test]
    fn test_parse_duration_answer() {
        assert_eq!(parse_duration_answer("5"), Some(5));
        assert_eq!(parse_duration_answer("five"), Some(5));
        assert_eq!(parse_duration_answer("5 days"), Some(5));
        assert_eq!(parse_duration_answer("one week"), Some(7));
        assert_eq!(parse_duration_answer("0"), None);
        assert_eq!(parse_duration_answer("a while"), None);
        assert_eq!(parse_duration_answer("365"), Some(365));
        assert_eq!(parse_duration_answer("366"), None);
        assert_eq!(parse_duration_answer("100 weeks"), None);
    }

    #[test]
    fn test_back_extract_sets_end_date() {
        let mut query = TripQuery {
            destination: Some("Dubai".to_string()),
            start_date: Some(date(2025, 12, 12)),
            ..Default::default()
        };

        assert!(back_extract_duration(&mut query, "Dubai for 5 days from Dec 12"));
        assert_eq!(query.end_date, Some(date(2025, 12, 16)));
        assert_eq!(query.duration_days, Some(5));
    }

    #[test]
    fn test_back_extract_respects_existing_end() {
        let mut query = TripQuery {
            start_date: Some(date(2025, 12, 12)),
            end_date: Some(date(2025, 12, 14)),
            ..Default::default()
        };
        assert!(!back_extract_duration(&mut query, "for 9 days"));
        assert_eq!(query.end_date, Some(date(2025, 12, 14)));
    }

    #[test]
    fn test_back_extract_without_start_records_duration() {
        let mut query = TripQuery::default();
        assert!(!back_extract_duration(&mut query, "a 4-day trip to Rome"));
        assert_eq!(query.duration_days, Some(4));
        assert_eq!(query.end_date, None);
    }
}
