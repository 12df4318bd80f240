//! Lenient field deserializers for capability payloads
//!
//! LLM output is loosely typed: prices arrive as "$2,000", numbers as
//! strings, lists as null. These helpers accept what is recoverable and map
//! the rest to a neutral value instead of failing the whole payload.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Upper bound for a trip budget in USD
pub const MAX_BUDGET_USD: u32 = 1_000_000;

/// Maximum characters kept from a hotel summary
pub const MAX_SUMMARY_CHARS: usize = 500;

/// Parse a loosely formatted number ("$2,000", "4.5", 12)
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| !matches!(c, '$' | ',')).collect();
            cleaned.trim().parse::<f64>().ok()
        }
        _ => None,
    }
}

/// Clamp a float into the u32 range, dropping the fraction
fn to_u32(n: f64) -> u32 {
    if n.is_nan() || n <= 0.0 {
        0
    } else if n >= u32::MAX as f64 {
        u32::MAX
    } else {
        n as u32
    }
}

/// Whole USD amount: invalid or negative becomes 0
pub fn usd<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(parse_number(&value).map(to_u32).unwrap_or(0))
}

/// Non-negative float: invalid or negative becomes 0.0
pub fn non_negative_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(parse_number(&value).filter(|n| n.is_finite() && *n > 0.0).unwrap_or(0.0))
}

/// Rating clamped to 0-5
pub fn rating<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(parse_number(&value)
        .filter(|n| n.is_finite())
        .map(|n| n.clamp(0.0, 5.0))
        .unwrap_or(0.0))
}

/// Trip budget: absent stays absent, anything else is parsed and capped
pub fn budget<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let value = Value::deserialize(d)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(parse_number(&value).map(to_u32).unwrap_or(0).min(MAX_BUDGET_USD)))
}

/// Optional text: blank becomes absent, numbers are stringified
pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Required text: null becomes empty
pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Hotel summary: null gets a placeholder, long text is truncated
pub fn summary<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    let text = match value {
        Value::Null => return Ok(crate::domain::DEFAULT_HOTEL_SUMMARY.to_string()),
        Value::String(s) => s,
        other => other.to_string(),
    };
    Ok(text.chars().take(MAX_SUMMARY_CHARS).collect())
}

/// Boolean accepting "yes"/"true"/1; anything else is false
pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "y" | "1"),
        _ => false,
    })
}

/// ISO date (YYYY-MM-DD); anything unparseable is absent
pub fn opt_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
        _ => None,
    })
}

/// List that may arrive as null or as a single item
pub fn list<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        single => serde_json::from_value(single).map(|item| vec![item]).unwrap_or_default(),
    })
}
