//! CLI command definitions and output rendering

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::debug;

use crate::budget::{BudgetAnalysis, format_usd};
use crate::domain::{ClarificationRequest, FinalItinerary, FlightOption};
use crate::events::{StageEvent, StageStatus};

/// TripCrew - multi-agent trip planner
#[derive(Parser)]
#[command(
    name = "tp",
    about = "Plan a trip from a free-text request: research, logistics, day-by-day plan and budget",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan a trip from a free-text request
    Plan {
        /// The request, e.g. "5 days in Tokyo from Lahore next month, $2500"
        query: String,

        /// Fill missing fields with defaults instead of asking
        #[arg(long)]
        auto_fill: bool,

        /// Answer a clarification question (repeatable), e.g. --answer budget=1500
        #[arg(short, long = "answer", value_name = "FIELD=VALUE")]
        answers: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Analyze a budget against known trip costs
    Budget {
        /// Total budget in USD
        #[arg(short, long)]
        budget: f64,

        /// Trip length in days
        #[arg(short, long)]
        days: u32,

        /// Flight cost in USD
        #[arg(long, default_value = "0")]
        flights: f64,

        /// Total accommodation cost in USD
        #[arg(long, default_value = "0")]
        hotel: f64,

        /// Total activities cost in USD
        #[arg(long, default_value = "0")]
        activities: f64,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Estimate the nightly hotel cost for a destination
    Estimate {
        destination: String,

        /// Nightly cost used when the destination is unknown
        #[arg(long, default_value = "100")]
        fallback: u32,
    },

    /// Print the effective configuration as YAML
    Config,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripcrew")
        .join("logs")
        .join("tripcrew.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Output format for plan/budget commands
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use: text or json", s))
            }
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// One progress line for a stage event
pub fn render_event(event: &StageEvent) -> String {
    let label = format!("[{}/4 {}]", event.stage.number(), event.stage);
    match &event.status {
        StageStatus::Started => format!("{} {}", label.dimmed(), "started".dimmed()),
        StageStatus::Completed => format!("{} {}", label.dimmed(), "done".green()),
        StageStatus::Fallback { reason } => format!("{} {} {}", label.dimmed(), "fallback:".yellow(), reason),
        StageStatus::NeedsMoreInfo => format!("{} {}", label.dimmed(), "needs more info".cyan()),
    }
}

/// Questions to put to the user, highest priority first
pub fn render_clarification(request: &ClarificationRequest) -> String {
    debug!(missing = request.missing_info.len(), "render_clarification: called");
    let mut fields: Vec<_> = request.missing_info.iter().collect();
    fields.sort_by_key(|f| f.priority);

    let mut out = String::new();
    let _ = writeln!(out, "{}", "A few details are missing:".bold());
    for field in fields {
        let marker = if field.required { "*".red().to_string() } else { " ".to_string() };
        let _ = write!(out, " {} {} ", marker, field.question);
        let _ = write!(out, "{}", format!("(--answer {}=...)", field.field).dimmed());
        if let Some(hint) = &field.hint {
            let _ = write!(out, " {}", hint.dimmed());
        }
        out.push('\n');
    }
    if !request.suggested_query.is_empty() {
        let _ = writeln!(out, "\nUnderstood so far: {}", request.suggested_query);
    }
    out
}

fn render_flight(label: &str, flight: &FlightOption) -> String {
    let stops = match flight.stops {
        0 => "direct".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{} stops", n),
    };
    let mut line = format!("  {:<9} {} {} ({})", label, flight.airline, format_usd(f64::from(flight.price_usd)), stops);
    if let Some(url) = &flight.booking_url {
        let _ = write!(line, " {}", url.dimmed());
    }
    line
}

/// Human-readable itinerary
pub fn render_itinerary(itinerary: &FinalItinerary) -> String {
    debug!(destination = %itinerary.destination, "render_itinerary: called");
    let mut out = String::new();

    let _ = writeln!(out, "{}", itinerary.trip_title.bold());
    let dates = match (itinerary.start_date, itinerary.end_date) {
        (Some(start), Some(end)) => format!("{} to {}", start, end),
        (Some(start), None) => start.to_string(),
        _ => "dates not set".to_string(),
    };
    let from = itinerary
        .origin
        .as_deref()
        .map(|o| format!(" from {}", o))
        .unwrap_or_default();
    let _ = writeln!(out, "{}{}, {}", itinerary.destination, from, dates);
    if !itinerary.trip_summary.is_empty() {
        let _ = writeln!(out, "\n{}", itinerary.trip_summary);
    }

    let _ = writeln!(out, "\n{}", "Travel".bold());
    if let Some(flight) = &itinerary.chosen_outbound_flight {
        let _ = writeln!(out, "{}", render_flight("Outbound", flight));
    }
    if let Some(flight) = &itinerary.chosen_return_flight {
        let _ = writeln!(out, "{}", render_flight("Return", flight));
    }
    if itinerary.chosen_outbound_flight.is_none()
        && let Some(flight) = &itinerary.chosen_flight
    {
        let _ = writeln!(out, "{}", render_flight("Flight", flight));
    }
    if let Some(hotel) = &itinerary.chosen_hotel {
        let _ = write!(
            out,
            "  {:<9} {} {}/night",
            "Hotel",
            hotel.name,
            format_usd(f64::from(hotel.price_per_night_usd))
        );
        if let Some(url) = &hotel.booking_url {
            let _ = write!(out, " {}", url.dimmed());
        }
        out.push('\n');
    }

    for day in &itinerary.daily_plans {
        let date = day.date.map(|d| format!(" ({})", d)).unwrap_or_default();
        let _ = writeln!(out, "\n{}", format!("Day {}{}: {}", day.day, date, day.title).bold());
        for activity in &day.activities {
            let cost = if activity.estimated_cost_usd > 0 {
                format!(" {}", format_usd(f64::from(activity.estimated_cost_usd)))
            } else {
                String::new()
            };
            let _ = writeln!(out, "  {:<7} {}{}", activity.time, activity.title, cost.dimmed());
        }
    }

    let _ = writeln!(out, "\n{}", "Budget".bold());
    let _ = writeln!(out, "{}", itinerary.budget_overview);
    let _ = writeln!(
        out,
        "Total estimated cost: {}",
        format_usd(f64::from(itinerary.total_estimated_cost)).bold()
    );
    if let Some(analysis) = &itinerary.budget_analysis {
        for rec in &analysis.recommendations {
            let _ = writeln!(out, "  - {}", rec);
        }
    }

    if let Some(tips) = itinerary.travel_tips.as_deref().filter(|t| !t.is_empty()) {
        let _ = writeln!(out, "\n{}\n{}", "Tips".bold(), tips);
    }

    if !itinerary.warnings.is_empty() {
        let _ = writeln!(out, "\n{}", "Warnings".yellow().bold());
        for warning in &itinerary.warnings {
            let _ = writeln!(out, "  ! {}", warning);
        }
    }
    out
}

/// Human-readable budget analysis
pub fn render_budget(analysis: &BudgetAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "Tier:".bold(), analysis.tier_label);
    let _ = writeln!(out, "{}\n", analysis.message);
    let b = &analysis.breakdown;
    let _ = writeln!(out, "  Flights        {:>10}", format_usd(b.flights));
    let _ = writeln!(out, "  Accommodation  {:>10}", format_usd(b.accommodation));
    let _ = writeln!(out, "  Activities     {:>10}", format_usd(b.activities));
    let _ = writeln!(out, "  Daily expenses {:>10}", format_usd(b.daily_expenses));
    let _ = writeln!(
        out,
        "  Per day left   {:>10}   ({:.1}% of budget committed)",
        format_usd(analysis.daily_remaining),
        analysis.utilization_percent
    );
    if let Some(top_up) = analysis.top_up {
        let _ = writeln!(out, "  Suggested top-up {}", format_usd(top_up).red());
    }
    out.push('\n');
    for rec in &analysis.recommendations {
        let _ = writeln!(out, "  - {}", rec);
    }
    out
}
