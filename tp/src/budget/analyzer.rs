//! Tiered budget assessment
//!
//! Pure and deterministic: the same inputs always give the same analysis.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Per-day baseline spend for one comfort level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierBaseline {
    pub accommodation: f64,
    pub food: f64,
    pub activities: f64,
    pub transport: f64,
}

impl TierBaseline {
    pub const fn per_day(&self) -> f64 {
        self.accommodation + self.food + self.activities + self.transport
    }
}

pub const BUDGET_BASELINE: TierBaseline = TierBaseline {
    accommodation: 30.0,
    food: 25.0,
    activities: 20.0,
    transport: 15.0,
};

pub const MODERATE_BASELINE: TierBaseline = TierBaseline {
    accommodation: 80.0,
    food: 50.0,
    activities: 40.0,
    transport: 30.0,
};

pub const LUXURY_BASELINE: TierBaseline = TierBaseline {
    accommodation: 200.0,
    food: 100.0,
    activities: 80.0,
    transport: 50.0,
};

/// Comfort tier, ordered from most to least comfortable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Luxury,
    Moderate,
    Budget,
    Tight,
}

impl BudgetTier {
    /// Select the highest tier whose daily threshold is met (inclusive)
    pub fn classify(daily_remaining: f64) -> Self {
        if daily_remaining >= LUXURY_BASELINE.per_day() {
            Self::Luxury
        } else if daily_remaining >= MODERATE_BASELINE.per_day() {
            Self::Moderate
        } else if daily_remaining >= BUDGET_BASELINE.per_day() {
            Self::Budget
        } else {
            Self::Tight
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Luxury => "Luxury",
            Self::Moderate => "Comfortable",
            Self::Budget => "Budget-Friendly",
            Self::Tight => "Tight Budget",
        }
    }

    /// Closing line appended to the itinerary's budget narrative
    fn narrative_suffix(&self) -> &'static str {
        match self {
            Self::Luxury => "You can enjoy premium experiences throughout your trip!",
            Self::Moderate => "You'll have a great time with quality experiences!",
            Self::Budget => "Stick to budget-friendly options and you'll have a wonderful trip!",
            Self::Tight => {
                "We're making it work, but consider the suggestions below for a more comfortable experience."
            }
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the money goes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub flights: f64,
    pub accommodation: f64,
    pub activities: f64,
    /// What is left for day-to-day spending (negative when over budget)
    pub daily_expenses: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAnalysis {
    pub tier: BudgetTier,
    pub tier_label: String,
    pub message: String,
    pub recommendations: Vec<String>,
    pub breakdown: BudgetBreakdown,
    pub remaining_budget: f64,
    pub daily_remaining: f64,
    /// Fixed costs as a share of the budget, one decimal place
    pub utilization_percent: f64,
    pub is_sufficient: bool,
    pub suggested_budget: f64,
    /// Extra money needed to reach the budget tier (tight tier only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_up: Option<f64>,
}

impl BudgetAnalysis {
    /// Message plus the tier's closing line, for the itinerary overview
    pub fn narrative(&self) -> String {
        format!("{}\n\n{}", self.message, self.tier.narrative_suffix())
    }
}

/// Format a dollar amount with thousands separators ("$12,500")
pub fn format_usd(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative { format!("-${}", grouped) } else { format!("${}", grouped) }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Assess a budget against the trip's fixed costs
///
/// `trip_days` below 1 is treated as 1.
pub fn analyze_budget(
    total_budget: f64,
    trip_days: u32,
    flight_cost: f64,
    hotel_cost: f64,
    activities_cost: f64,
) -> BudgetAnalysis {
    debug!(total_budget, trip_days, flight_cost, hotel_cost, activities_cost, "analyze_budget: called");
    let days = trip_days.max(1);
    let days_f = f64::from(days);

    let total_cost = flight_cost + hotel_cost + activities_cost;
    let remaining = total_budget - total_cost;
    let daily_remaining = remaining / days_f;
    let tier = BudgetTier::classify(daily_remaining);
    let budget_str = format_usd(total_budget);

    let mut top_up = None;
    let (message, recommendations) = match tier {
        BudgetTier::Luxury => {
            debug!("analyze_budget: luxury tier");
            (
                format!(
                    "Excellent Budget! You have {} for this {}-day trip. This allows for luxury accommodations, fine dining, and premium experiences!",
                    budget_str, days
                ),
                strings(&[
                    "Stay at 5-star hotels or luxury resorts",
                    "Dine at top-rated restaurants",
                    "Book exclusive tours and VIP experiences",
                    "Use private transportation",
                    "Don't miss premium activities and shows",
                ]),
            )
        }
        BudgetTier::Moderate => {
            debug!("analyze_budget: moderate tier");
            (
                format!(
                    "Great Budget! Your {} budget provides a comfortable {}-day experience with good accommodations and quality activities.",
                    budget_str, days
                ),
                strings(&[
                    "Choose 3-4 star hotels with good reviews",
                    "Mix of local restaurants and popular eateries",
                    "Book popular tours and attractions",
                    "Use taxis and public transport",
                    "Enjoy main tourist spots and activities",
                ]),
            )
        }
        BudgetTier::Budget => {
            debug!("analyze_budget: budget tier");
            (
                format!(
                    "Workable Budget - Your {} covers essentials for {} days, but you'll need to be mindful of spending.",
                    budget_str, days
                ),
                strings(&[
                    "Consider budget hotels or hostels",
                    "Eat at local cafes and street food",
                    "Use public transport and walk when possible",
                    "Focus on free or low-cost attractions",
                    "Book activities in advance for discounts",
                ]),
            )
        }
        BudgetTier::Tight => {
            let shortage = BUDGET_BASELINE.per_day() * days_f - remaining;
            debug!(shortage, "analyze_budget: tight tier");
            top_up = Some(shortage);
            let shortage_str = format_usd(shortage);
            (
                format!(
                    "Budget Alert! Your {} budget is tight for {} days. We recommend adding {} to enjoy the trip comfortably.",
                    budget_str, days, shortage_str
                ),
                vec![
                    format!("Consider increasing budget by {}", shortage_str),
                    "Look for shared accommodations or budget stays".to_string(),
                    "Self-catering options to save on food".to_string(),
                    "Use only public transportation".to_string(),
                    "Focus on free walking tours and attractions".to_string(),
                    "Consider shortening trip duration".to_string(),
                ],
            )
        }
    };

    let utilization = if total_budget > 0.0 {
        total_cost / total_budget * 100.0
    } else {
        0.0
    };

    BudgetAnalysis {
        tier,
        tier_label: tier.label().to_string(),
        message,
        recommendations,
        breakdown: BudgetBreakdown {
            flights: flight_cost,
            accommodation: hotel_cost,
            activities: activities_cost,
            daily_expenses: remaining,
            total: total_cost,
        },
        remaining_budget: remaining,
        daily_remaining,
        utilization_percent: (utilization * 10.0).round() / 10.0,
        is_sufficient: remaining >= 0.0,
        suggested_budget: total_budget.max(total_cost + BUDGET_BASELINE.per_day() * days_f),
        top_up,
    }
}
