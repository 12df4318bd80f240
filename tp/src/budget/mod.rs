//! Budget analysis and cost estimation

mod accommodation;
mod analyzer;

pub use accommodation::estimate_accommodation_cost;
pub use analyzer::{
    BUDGET_BASELINE, BudgetAnalysis, BudgetBreakdown, BudgetTier, LUXURY_BASELINE, MODERATE_BASELINE, TierBaseline,
    analyze_budget, format_usd,
};
