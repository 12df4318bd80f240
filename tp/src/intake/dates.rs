//! Relative date and count parsing

use chrono::{Datelike, Days, Months, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// "in 3 days", "in two weeks", "5 days from now"
static OFFSET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^in\s+(?P<n>\d+|[a-z]+)\s+(?P<unit>days?|weeks?|months?)$",
        r"^(?P<n>\d+|[a-z]+)\s+(?P<unit>days?|weeks?|months?)\s+from\s+(?:now|today)$",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Absolute formats accepted besides ISO
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y", "%B %d %Y", "%d %B %Y", "%b %d, %Y", "%d %b %Y"];

/// The next Friday strictly after `today` (a Friday maps to a week later)
pub fn next_friday(today: NaiveDate) -> NaiveDate {
    let weekday = today.weekday().num_days_from_monday();
    let mut days_ahead = (4 + 7 - weekday) % 7;
    if days_ahead == 0 {
        days_ahead = 7;
    }
    today + Days::new(u64::from(days_ahead))
}

/// Parse a small count written as digits or a word ("3", "three", "a")
pub fn parse_count(word: &str) -> Option<u32> {
    let word = word.trim().to_lowercase();
    if let Ok(n) = word.parse::<u32>() {
        return Some(n);
    }
    let n = match word.as_str() {
        "a" | "an" | "one" => 1,
        "two" | "couple" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        "thirteen" => 13,
        "fourteen" => 14,
        "fifteen" => 15,
        "twenty" => 20,
        "thirty" => 30,
        _ => return None,
    };
    Some(n)
}

/// Resolve a date answer, absolute or relative to `today`
///
/// Understands ISO and long-form dates, "today", "tomorrow",
/// "next weekend" (the next Friday), "next week", "next month",
/// "in N days/weeks/months" and "N days from now".
pub fn parse_relative_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    debug!(%text, %today, "parse_relative_date: called");
    let cleaned = text.trim().trim_end_matches('.').to_lowercase();
    if cleaned.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text.trim(), format) {
            debug!(%date, %format, "parse_relative_date: absolute date");
            return Some(date);
        }
    }

    let resolved = match cleaned.as_str() {
        "today" | "now" => Some(today),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        "next weekend" | "this weekend" | "weekend" | "next friday" | "friday" => Some(next_friday(today)),
        "next week" => today.checked_add_days(Days::new(7)),
        "next month" => today.checked_add_months(Months::new(1)),
        _ => None,
    };
    if resolved.is_some() {
        debug!(?resolved, "parse_relative_date: keyword");
        return resolved;
    }

    for pattern in OFFSET_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(&cleaned)
            && let Some(n) = caps.name("n").and_then(|m| parse_count(m.as_str()))
        {
            let unit = caps.name("unit").map(|m| m.as_str()).unwrap_or("day");
            debug!(n, %unit, "parse_relative_date: offset");
            return if unit.starts_with("month") {
                today.checked_add_months(Months::new(n))
            } else if unit.starts_with("week") {
                today.checked_add_days(Days::new(u64::from(n) * 7))
            } else {
                today.checked_add_days(Days::new(u64::from(n)))
            };
        }
    }

    debug!("parse_relative_date: unrecognised");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_next_friday() {
        // 2025-12-08 is a Monday
        assert_eq!(next_friday(date(2025, 12, 8)), date(2025, 12, 12));
        // Thursday
        assert_eq!(next_friday(date(2025, 12, 11)), date(2025, 12, 12));
        // Friday rolls to the following week
        assert_eq!(next_friday(date(2025, 12, 12)), date(2025, 12, 19));
        // Saturday
        assert_eq!(next_friday(date(2025, 12, 13)), date(2025, 12, 19));
    }

    #[test]
    fn test_absolute_dates() {
        let today = date(2025, 12, 1);
        assert_eq!(parse_relative_date("2026-01-15", today), Some(date(2026, 1, 15)));
        assert_eq!(parse_relative_date("December 24, 2025", today), Some(date(2025, 12, 24)));
        assert_eq!(parse_relative_date("24 December 2025", today), Some(date(2025, 12, 24)));
    }

    #[test]
    fn test_keywords() {
        let today = date(2025, 12, 8);
        assert_eq!(parse_relative_date("Today", today), Some(today));
        assert_eq!(parse_relative_date("tomorrow", today), Some(date(2025, 12, 9)));
        assert_eq!(parse_relative_date("next weekend", today), Some(date(2025, 12, 12)));
        assert_eq!(parse_relative_date("next week", today), Some(date(2025, 12, 15)));
        assert_eq!(parse_relative_date("next month", today), Some(date(2026, 1, 8)));
    }

    #[test]
    fn test_offsets() {
        let today = date(2025, 12, 8);
        assert_eq!(parse_relative_date("in 3 days", today), Some(date(2025, 12, 11)));
        assert_eq!(parse_relative_date("in two weeks", today), Some(date(2025, 12, 22)));
        assert_eq!(parse_relative_date("in a week", today), Some(date(2025, 12, 15)));
        assert_eq!(parse_relative_date("10 days from now", today), Some(date(2025, 12, 18)));
    }

    #[test]
    fn test_unrecognised() {
        let today = date(2025, 12, 8);
        assert_eq!(parse_relative_date("sometime soon", today), None);
        assert_eq!(parse_relative_date("", today), None);
        assert_eq!(parse_relative_date("in many days", today), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("12"), Some(12));
        assert_eq!(parse_count("Five"), Some(5));
        assert_eq!(parse_count("a"), Some(1));
        assert_eq!(parse_count("several"), None);
    }
}
