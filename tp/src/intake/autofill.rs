//! Default patching for queries that will run without asking

use chrono::{Days, NaiveDate};
use tracing::{debug, warn};

use super::dates::next_friday;
use crate::config::DefaultsConfig;
use crate::domain::{TripField, TripQuery, is_blank};

/// True when the user gave a budget large enough to analyze against
pub fn budget_supplied(query: &TripQuery, min_budget_usd: u32) -> bool {
    query.budget_usd.is_some_and(|b| b >= min_budget_usd)
}

/// Patch absent fields with defaults, returning which fields were filled
///
/// - start date: the next Friday after `today`
/// - end date: start + known duration, else start + `trip-days`
/// - budget: `budget-usd` when absent or below `min-budget-usd`
/// - travelers: `travelers`
///
/// An end date earlier than the start date is repaired the same way.
pub fn auto_fill(query: &mut TripQuery, defaults: &DefaultsConfig, today: NaiveDate) -> Vec<TripField> {
    debug!(?query, %today, "auto_fill: called");
    let mut filled = Vec::new();

    if query.start_date.is_none() {
        let start = next_friday(today);
        debug!(%start, "auto_fill: start date defaulted to next Friday");
        query.start_date = Some(start);
        filled.push(TripField::StartDate);
    }

    if query.end_date.is_none() {
        if query.duration_days.is_some() {
            debug!("auto_fill: end date from recorded duration");
            query.apply_duration();
        } else if let Some(start) = query.start_date {
            debug!(trip_days = defaults.trip_days, "auto_fill: end date from default trip length");
            query.end_date = start.checked_add_days(Days::new(u64::from(defaults.trip_days)));
        }
        filled.push(TripField::EndDate);
    }

    if let (Some(start), Some(end)) = (query.start_date, query.end_date)
        && end < start
    {
        warn!(%start, %end, "auto_fill: end date precedes start date, repairing");
        query.end_date = start.checked_add_days(Days::new(u64::from(defaults.trip_days)));
        filled.push(TripField::EndDate);
    }

    if !budget_supplied(query, defaults.min_budget_usd) {
        debug!(budget = ?query.budget_usd, "auto_fill: budget defaulted");
        query.budget_usd = Some(defaults.budget_usd);
        filled.push(TripField::Budget);
    }

    if is_blank(query.travelers.as_deref()) {
        debug!("auto_fill: travelers defaulted");
        query.travelers = Some(defaults.travelers.clone());
        filled.push(TripField::Travelers);
    }

    filled.dedup();
    filled
}
