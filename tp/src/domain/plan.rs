//! Day-by-day plan types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lenient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    /// Time label ("09:00", "Morning")
    #[serde(deserialize_with = "lenient::string")]
    pub time: String,
    /// Category tag ("Sightseeing", "Food", "Check-in")
    #[serde(rename = "type", deserialize_with = "lenient::string")]
    pub category: String,
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(deserialize_with = "lenient::usd")]
    pub estimated_cost_usd: u32,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub booking_required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyPlan {
    /// 1-based, contiguous once sanitized
    #[serde(deserialize_with = "lenient::usd")]
    pub day: u32,
    #[serde(deserialize_with = "lenient::opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(deserialize_with = "lenient::list")]
    pub activities: Vec<Activity>,
    #[serde(deserialize_with = "lenient::usd")]
    pub daily_budget: u32,
}

impl DailyPlan {
    /// Sum of this day's activity costs
    pub fn activities_cost(&self) -> u64 {
        self.activities.iter().map(|a| u64::from(a.estimated_cost_usd)).sum()
    }
}

/// Sum of activity costs over all days
pub fn total_activities_cost(plans: &[DailyPlan]) -> u64 {
    plans.iter().map(DailyPlan::activities_cost).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_activity_type_field() {
        let activity: Activity = serde_json::from_value(json!({
            "time": "09:00",
            "type": "Sightseeing",
            "title": "Senso-ji Temple",
            "description": "Early visit",
            "estimated_cost_usd": "$0",
            "booking_required": "no"
        }))
        .unwrap();

        assert_eq!(activity.category, "Sightseeing");
        assert_eq!(activity.estimated_cost_usd, 0);
        assert!(!activity.booking_required);

        let back = serde_json::to_value(&activity).unwrap();
        assert_eq!(back["type"], "Sightseeing");
    }

    #[test]
    fn test_activity_costs_sum() {
        let plans: Vec<DailyPlan> = serde_json::from_value(json!([
            {"day": 1, "title": "Arrival", "activities": [{"title": "a", "estimated_cost_usd": 40}]},
            {"day": "2", "title": "Museums", "activities": [
                {"title": "b", "estimated_cost_usd": 25},
                {"title": "c", "estimated_cost_usd": null}
            ]}
        ]))
        .unwrap();

        assert_eq!(plans[1].day, 2);
        assert_eq!(plans[1].activities_cost(), 25);
        assert_eq!(total_activities_cost(&plans), 65);
    }
}
