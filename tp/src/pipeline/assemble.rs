//! Stage 4: assembly, destination correction and budget overlay

use tracing::{debug, info, warn};

use super::{RunContext, TripPipeline, consistency, destination_of, fallback, sanitize};
use crate::budget::{analyze_budget, estimate_accommodation_cost, format_usd};
use crate::capability::AssemblyRequest;
use crate::config::{BookingConfig, DefaultsConfig};
use crate::domain::{DailyPlan, DestinationReport, FinalItinerary, LogisticsReport, TripQuery, total_activities_cost};
use crate::events::Stage;

/// Per-category costs behind the budget overview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetOverlay {
    pub trip_days: u32,
    pub nights: u32,
    pub flights: u64,
    pub nightly_rate: u64,
    pub accommodation: u64,
    pub activities: u64,
}

impl BudgetOverlay {
    /// Work out costs from the chosen options and curated activities
    ///
    /// Flights are the chosen outbound plus return fares (or the headline
    /// flight), replaced by the configured estimate when that comes to zero.
    /// A zero-priced hotel falls back to the accommodation estimator.
    pub fn compute(itinerary: &FinalItinerary, trip_days: u32, defaults: &DefaultsConfig) -> Self {
        let trip_days = trip_days.max(1);
        let price = |f: &Option<crate::domain::FlightOption>| f.as_ref().map_or(0, |f| u64::from(f.price_usd));

        let mut flights = if itinerary.chosen_outbound_flight.is_some() || itinerary.chosen_return_flight.is_some() {
            price(&itinerary.chosen_outbound_flight) + price(&itinerary.chosen_return_flight)
        } else {
            price(&itinerary.chosen_flight)
        };
        if flights == 0 {
            debug!(estimate = defaults.flight_estimate_usd, "BudgetOverlay::compute: flight estimate used");
            flights = u64::from(defaults.flight_estimate_usd);
        }

        let nights = trip_days.saturating_sub(1).max(1);
        let chosen_rate = itinerary
            .chosen_hotel
            .as_ref()
            .map_or(0, |h| u64::from(h.price_per_night_usd));
        let nightly_rate = if chosen_rate > 0 {
            chosen_rate
        } else {
            let estimate = estimate_accommodation_cost(&itinerary.destination, defaults.hotel_nightly_fallback_usd);
            debug!(estimate, "BudgetOverlay::compute: nightly rate estimated");
            u64::from(estimate)
        };

        Self {
            trip_days,
            nights,
            flights,
            nightly_rate,
            accommodation: nightly_rate * u64::from(nights),
            activities: total_activities_cost(&itinerary.daily_plans),
        }
    }

    pub fn fixed_costs(&self) -> u64 {
        self.flights + self.accommodation + self.activities
    }
}

fn to_u32(amount: u64) -> u32 {
    u32::try_from(amount).unwrap_or(u32::MAX)
}

/// Write the budget overview and total onto the itinerary
///
/// With a user budget the analyzer runs and its narrative is used; without
/// one the total is an estimate including daily incidentals.
pub fn apply_budget_overlay(
    itinerary: &mut FinalItinerary,
    budget: Option<u32>,
    trip_days: u32,
    defaults: &DefaultsConfig,
) -> BudgetOverlay {
    let overlay = BudgetOverlay::compute(itinerary, trip_days, defaults);
    debug!(?overlay, ?budget, "apply_budget_overlay: called");

    match budget {
        Some(budget) => {
            let analysis = analyze_budget(
                f64::from(budget),
                overlay.trip_days,
                overlay.flights as f64,
                overlay.accommodation as f64,
                overlay.activities as f64,
            );
            debug!(tier = ?analysis.tier, "apply_budget_overlay: analyzed");
            itinerary.total_estimated_cost = to_u32(overlay.fixed_costs());
            itinerary.budget_overview = analysis.narrative();
            itinerary.budget_analysis = Some(analysis);
        }
        None => {
            let per_day = u64::from(defaults.incidentals_per_day_usd);
            let incidentals = per_day * u64::from(overlay.trip_days);
            let total = overlay.fixed_costs() + incidentals;
            debug!(total, "apply_budget_overlay: estimated");
            itinerary.total_estimated_cost = to_u32(total);
            itinerary.budget_analysis = None;
            itinerary.budget_overview = format!(
                "Estimated total: {}. Flights {}, accommodation {} ({} nights at {}/night), activities {}, \
                 food and local transport {} ({}/day). No budget was given, so this is based on typical costs.",
                format_usd(total as f64),
                format_usd(overlay.flights as f64),
                format_usd(overlay.accommodation as f64),
                overlay.nights,
                format_usd(overlay.nightly_rate as f64),
                format_usd(overlay.activities as f64),
                format_usd(incidentals as f64),
                format_usd(per_day as f64),
            );
        }
    }
    overlay
}

/// Pipeline-owned data always wins over what the assembler wrote
fn overlay_pipeline_data(
    itinerary: &mut FinalItinerary,
    query: &TripQuery,
    destination: DestinationReport,
    logistics: &LogisticsReport,
    daily_plans: Vec<DailyPlan>,
    booking: &BookingConfig,
) {
    let destination_name = destination_of(query);
    itinerary.origin = query.origin.clone();
    itinerary.start_date = query.start_date;
    itinerary.end_date = query.end_date;
    itinerary.all_flights = logistics.flight_options.clone();
    itinerary.all_hotels = logistics.hotel_options.clone();
    itinerary.daily_plans = daily_plans;

    if itinerary.chosen_outbound_flight.is_none() {
        itinerary.chosen_outbound_flight = logistics.outbound_flights.first().cloned();
    }
    if itinerary.chosen_return_flight.is_none() {
        itinerary.chosen_return_flight = logistics.return_flights.first().cloned();
    }
    if itinerary.chosen_flight.is_none() {
        itinerary.chosen_flight = itinerary
            .chosen_outbound_flight
            .clone()
            .or_else(|| logistics.flight_options.first().cloned())
            .or_else(|| Some(fallback::placeholder_flight(booking)));
    }
    let mut hotel = itinerary
        .chosen_hotel
        .take()
        .or_else(|| logistics.first_hotel().cloned())
        .unwrap_or_else(|| fallback::placeholder_hotel(destination_name, booking));
    sanitize::sanitize_hotel(&mut hotel, destination_name, booking);
    itinerary.chosen_hotel = Some(hotel);

    if itinerary.trip_summary.trim().is_empty() {
        itinerary.trip_summary = destination.summary.clone();
    }
    if itinerary.travel_tips.as_deref().is_none_or(|t| t.trim().is_empty()) {
        itinerary.travel_tips = Some(destination.cultural_and_safety_tips.clone());
    }
    itinerary.destination_report = Some(destination);
}

impl TripPipeline {
    pub(super) async fn assemble(
        &self,
        query: &TripQuery,
        budget_supplied: bool,
        destination: DestinationReport,
        logistics: LogisticsReport,
        daily_plans: Vec<DailyPlan>,
        run: &mut RunContext,
    ) -> FinalItinerary {
        let destination_name = destination_of(query);
        debug!(destination = %destination_name, days = daily_plans.len(), "TripPipeline::assemble: called");
        run.emitter.started(Stage::Assemble);

        let request = AssemblyRequest {
            query: query.clone(),
            destination: destination.clone(),
            logistics: logistics.clone(),
            daily_plans: daily_plans.clone(),
        };
        let assembler = self.capabilities.assembler.clone();
        let assembled = self
            .pool
            .run("assemble", async move { assembler.assemble(&request).await })
            .await;

        let mut itinerary = match assembled {
            Ok(itinerary) => itinerary,
            Err(e) => {
                warn!(error = %e, "TripPipeline::assemble: assembly failed, building from options");
                run.emitter.fallback(Stage::Assemble, e.to_string());
                run.warnings.push(format!("Itinerary assembly unavailable ({}); built from search results.", e));
                fallback::itinerary(query, &logistics, &self.config.booking)
            }
        };

        overlay_pipeline_data(
            &mut itinerary,
            query,
            destination,
            &logistics,
            daily_plans,
            &self.config.booking,
        );

        if let Some(finding) = consistency::correct_destination(&mut itinerary, destination_name) {
            run.warnings.push(finding);
        }

        let trip_days = query.trip_days().unwrap_or(self.config.defaults.trip_days);
        let budget = if budget_supplied { query.budget_usd } else { None };
        apply_budget_overlay(&mut itinerary, budget, trip_days, &self.config.defaults);

        itinerary.warnings.append(&mut run.warnings);

        info!(
            total = itinerary.total_estimated_cost,
            analyzed = itinerary.budget_analysis.is_some(),
            "TripPipeline::assemble: complete"
        );
        run.emitter.completed(Stage::Assemble);
        itinerary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetTier;
    use crate::domain::{Activity, FlightOption, HotelOption};

    fn itinerary(flight: u32, hotel: u32) -> FinalItinerary {
        FinalItinerary {
            destination: "Dubai".to_string(),
            chosen_outbound_flight: Some(FlightOption {
                price_usd: flight,
                ..Default::default()
            }),
            chosen_hotel: Some(HotelOption {
                price_per_night_usd: hotel,
                ..Default::default()
            }),
            daily_plans: vec![DailyPlan {
                day: 1,
                activities: vec![Activity {
                    estimated_cost_usd: 40,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_overlay_uses_chosen_prices() {
        let overlay = BudgetOverlay::compute(&itinerary(600, 100), 5, &DefaultsConfig::default());
        assert_eq!(overlay.flights, 600);
        assert_eq!(overlay.nights, 4);
        assert_eq!(overlay.accommodation, 400);
        assert_eq!(overlay.activities, 40);
        assert_eq!(overlay.fixed_costs(), 1040);
    }

    #[test]
    fn test_overlay_falls_back_to_estimates() {
        let overlay = BudgetOverlay::compute(&itinerary(0, 0), 1, &DefaultsConfig::default());
        assert_eq!(overlay.flights, 500);
        assert_eq!(overlay.nights, 1);
        assert_eq!(overlay.nightly_rate, 150);
    }

    #[test]
    fn test_budget_supplied_runs_analyzer() {
        let mut it = itinerary(600, 100);
        apply_budget_overlay(&mut it, Some(150), 5, &DefaultsConfig::default());

        let analysis = it.budget_analysis.as_ref().unwrap();
        assert_eq!(analysis.tier, BudgetTier::Tight);
        assert!(analysis.top_up.unwrap() > 0.0);
        assert_eq!(it.total_estimated_cost, 1040);
        assert!(it.budget_overview.starts_with("Budget Alert!"));
    }

    #[test]
    fn test_no_budget_adds_incidentals() {
        let mut it = itinerary(600, 100);
        apply_budget_overlay(&mut it, None, 5, &DefaultsConfig::default());

        assert!(it.budget_analysis.is_none());
        assert_eq!(it.total_estimated_cost, 1040 + 250);
        assert!(it.budget_overview.starts_with("Estimated total: $1,290."));
    }
}
