//! Destination consistency rules
//!
//! Two fixed tables catch the usual hallucinations: landmarks that belong to
//! another well-known city showing up in curated days, and a handful of
//! cities the assembler tends to substitute for the requested one.

use regex::{NoExpand, Regex};
use tracing::{debug, warn};

use crate::config::ForeignAttractionPolicy;
use crate::domain::{DailyPlan, FinalItinerary};

/// Landmark (lowercase) and the city it belongs to
pub const ATTRACTION_CITIES: &[(&str, &str)] = &[
    ("eiffel tower", "paris"),
    ("louvre", "paris"),
    ("big ben", "london"),
    ("tower bridge", "london"),
    ("buckingham palace", "london"),
    ("burj khalifa", "dubai"),
    ("dubai mall", "dubai"),
    ("palm jumeirah", "dubai"),
    ("statue of liberty", "new york"),
    ("times square", "new york"),
    ("colosseum", "rome"),
    ("sagrada familia", "barcelona"),
    ("tokyo tower", "tokyo"),
    ("shibuya crossing", "tokyo"),
    ("sydney opera house", "sydney"),
    ("taj mahal", "agra"),
    ("marina bay sands", "singapore"),
];

/// Cities commonly substituted for the requested destination
pub const HALLUCINATED_CITIES: &[&str] = &[
    "Paris",
    "London",
    "Dubai",
    "New York",
    "Rome",
    "Tokyo",
    "Barcelona",
    "Singapore",
];

/// An activity naming a landmark from another city
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignAttraction {
    pub day: u32,
    pub activity: String,
    pub attraction: &'static str,
    pub city: &'static str,
}

impl ForeignAttraction {
    pub fn describe(&self, destination: &str) -> String {
        format!(
            "Day {}: '{}' mentions {} ({}), which is not in {}",
            self.day, self.activity, self.attraction, self.city, destination
        )
    }
}

fn foreign_landmark(text: &str, destination_lc: &str) -> Option<(&'static str, &'static str)> {
    let text = text.to_lowercase();
    ATTRACTION_CITIES
        .iter()
        .find(|(attraction, city)| text.contains(attraction) && !destination_lc.contains(city))
        .copied()
}

/// Scan activity titles and descriptions for other cities' landmarks
pub fn find_foreign_attractions(plans: &[DailyPlan], destination: &str) -> Vec<ForeignAttraction> {
    debug!(%destination, days = plans.len(), "find_foreign_attractions: called");
    let destination_lc = destination.to_lowercase();

    plans
        .iter()
        .flat_map(|plan| plan.activities.iter().map(move |a| (plan.day, a)))
        .filter_map(|(day, activity)| {
            let text = format!("{} {}", activity.title, activity.description);
            foreign_landmark(&text, &destination_lc).map(|(attraction, city)| ForeignAttraction {
                day,
                activity: activity.title.clone(),
                attraction,
                city,
            })
        })
        .collect()
}

/// Apply the configured policy; returns one warning per finding
pub fn enforce_attraction_policy(
    plans: &mut [DailyPlan],
    destination: &str,
    policy: ForeignAttractionPolicy,
) -> Vec<String> {
    let findings = find_foreign_attractions(plans, destination);
    if findings.is_empty() {
        return Vec::new();
    }

    for finding in &findings {
        warn!(day = finding.day, activity = %finding.activity, city = finding.city, %destination, "enforce_attraction_policy: possible hallucination");
    }

    if policy == ForeignAttractionPolicy::Remove {
        debug!(count = findings.len(), "enforce_attraction_policy: removing activities");
        let destination_lc = destination.to_lowercase();
        for plan in plans.iter_mut() {
            plan.activities.retain(|a| {
                foreign_landmark(&format!("{} {}", a.title, a.description), &destination_lc).is_none()
            });
        }
    }

    let suffix = match policy {
        ForeignAttractionPolicy::Warn => "",
        ForeignAttractionPolicy::Remove => " (removed)",
    };
    findings
        .iter()
        .map(|f| format!("{}{}", f.describe(destination), suffix))
        .collect()
}

fn replace_ignore_case(text: &str, needle: &str, replacement: &str) -> String {
    match Regex::new(&format!("(?i){}", regex::escape(needle))) {
        Ok(re) => re.replace_all(text, NoExpand(replacement)).into_owned(),
        Err(_) => text.to_string(),
    }
}

/// Force the itinerary back onto the requested destination
///
/// A commonly hallucinated city in the assembled destination (absent from
/// the request) is corrected and rewritten out of the title. Returns a
/// warning when a correction was made.
pub fn correct_destination(itinerary: &mut FinalItinerary, requested: &str) -> Option<String> {
    debug!(assembled = %itinerary.destination, %requested, "correct_destination: called");
    let requested_lc = requested.to_lowercase();
    let assembled_lc = itinerary.destination.to_lowercase();

    let wrong = HALLUCINATED_CITIES.iter().find(|city| {
        let city_lc = city.to_lowercase();
        assembled_lc.contains(&city_lc) && !requested_lc.contains(&city_lc)
    });

    let finding = wrong.map(|city| {
        warn!(%city, %requested, "correct_destination: assembled itinerary names the wrong city");
        itinerary.trip_title = replace_ignore_case(&itinerary.trip_title, city, requested);
        format!("Assembled destination '{}' corrected to '{}'", itinerary.destination, requested)
    });

    if itinerary.destination != requested {
        debug!("correct_destination: setting requested destination");
        itinerary.destination = requested.to_string();
    }
    if itinerary.trip_title.trim().is_empty() {
        itinerary.trip_title = format!("Trip to {}", requested);
    }
    finding
}
