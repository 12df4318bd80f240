//! Average nightly lodging cost by destination

use tracing::debug;

/// Destination keys (lowercase) and average nightly cost in USD
///
/// Order matters: substring matching takes the first entry that matches.
const NIGHTLY_COSTS: &[(&str, u32)] = &[
    ("dubai", 150),
    ("paris", 180),
    ("london", 200),
    ("new york", 250),
    ("tokyo", 150),
    ("singapore", 180),
    ("hong kong", 170),
    ("sydney", 170),
    ("rome", 140),
    ("barcelona", 130),
    ("amsterdam", 170),
    ("istanbul", 90),
    ("bangkok", 60),
    ("bali", 70),
    ("lisbon", 110),
    ("prague", 90),
    ("cairo", 60),
    ("maldives", 400),
    ("lahore", 50),
    ("karachi", 50),
    ("islamabad", 60),
    ("delhi", 50),
    ("mumbai", 70),
];

/// Estimate the nightly lodging cost for a destination
///
/// An exact case-insensitive key match wins; otherwise the first table entry
/// that is a substring of the destination (or contains it) is used. Returns
/// `fallback` when nothing matches.
pub fn estimate_accommodation_cost(destination: &str, fallback: u32) -> u32 {
    debug!(%destination, fallback, "estimate_accommodation_cost: called");
    let needle = destination.trim().to_lowercase();
    if needle.is_empty() {
        debug!("estimate_accommodation_cost: empty destination");
        return fallback;
    }

    if let Some((_, cost)) = NIGHTLY_COSTS.iter().find(|(key, _)| *key == needle) {
        debug!(cost, "estimate_accommodation_cost: exact match");
        return *cost;
    }

    match NIGHTLY_COSTS
        .iter()
        .find(|(key, _)| needle.contains(key) || key.contains(needle.as_str()))
    {
        Some((key, cost)) => {
            debug!(%key, cost, "estimate_accommodation_cost: substring match");
            *cost
        }
        None => {
            debug!("estimate_accommodation_cost: no match, using fallback");
            fallback
        }
    }
}
