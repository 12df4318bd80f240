//! TripCrew - multi-agent trip planner
//!
//! CLI entry point for planning trips and running the budget tools.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use tripcrew::agents::llm_capabilities;
use tripcrew::budget::{analyze_budget, estimate_accommodation_cost, format_usd};
use tripcrew::cli::{Cli, Command, OutputFormat, render_budget, render_clarification, render_event, render_itinerary};
use tripcrew::config::Config;
use tripcrew::domain::PipelineOutcome;
use tripcrew::events::EventBus;
use tripcrew::intake::{Answers, parse_answer_pair};
use tripcrew::llm::create_client;
use tripcrew::pipeline::TripPipeline;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripcrew")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("tripcrew.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(model = %config.llm.model, "TripCrew loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Plan {
            query,
            auto_fill,
            answers,
            format,
        } => {
            debug!(%auto_fill, answers = answers.len(), %format, "main: matched Plan command");
            cmd_plan(config, &query, auto_fill, &answers, format).await
        }
        Command::Budget {
            budget,
            days,
            flights,
            hotel,
            activities,
            format,
        } => {
            debug!(budget, days, "main: matched Budget command");
            cmd_budget(budget, days, flights, hotel, activities, format)
        }
        Command::Estimate { destination, fallback } => {
            debug!(%destination, fallback, "main: matched Estimate command");
            cmd_estimate(&destination, fallback);
            Ok(())
        }
        Command::Config => {
            debug!("main: matched Config command");
            cmd_config(&config)
        }
    }
}

fn collect_answers(pairs: &[String]) -> Result<Option<Answers>> {
    if pairs.is_empty() {
        return Ok(None);
    }
    let mut answers = Answers::new();
    for pair in pairs {
        let (field, value) = parse_answer_pair(pair)?;
        answers.insert(field, value);
    }
    Ok(Some(answers))
}

/// Run the pipeline for one request, printing progress to stderr
async fn cmd_plan(config: Config, query: &str, auto_fill: bool, pairs: &[String], format: OutputFormat) -> Result<()> {
    debug!(%auto_fill, "cmd_plan: called");
    let answers = collect_answers(pairs)?;

    config.validate()?;
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let capabilities = llm_capabilities(llm, &config);
    let ask_if_missing = config.pipeline.ask_if_missing && !auto_fill;

    let bus = Arc::new(EventBus::with_default_capacity());
    let mut events = bus.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            eprintln!("{}", render_event(&event));
        }
    });

    let pipeline = TripPipeline::new(capabilities, config).with_events(bus.clone());
    let outcome = pipeline.run(query, ask_if_missing, answers.as_ref()).await;

    // Close the channel so the printer drains and exits
    drop(pipeline);
    drop(bus);
    let _ = printer.await;

    let outcome = outcome?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Text => match &outcome {
            PipelineOutcome::NeedsMoreInfo(request) => print!("{}", render_clarification(request)),
            PipelineOutcome::Complete(itinerary) => print!("{}", render_itinerary(itinerary)),
        },
    }
    Ok(())
}

fn cmd_budget(budget: f64, days: u32, flights: f64, hotel: f64, activities: f64, format: OutputFormat) -> Result<()> {
    debug!(budget, days, flights, hotel, activities, "cmd_budget: called");
    if !budget.is_finite() || budget < 0.0 {
        return Err(eyre::eyre!("Budget must be a non-negative amount, got {}", budget));
    }
    let analysis = analyze_budget(budget, days, flights, hotel, activities);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
        OutputFormat::Text => print!("{}", render_budget(&analysis)),
    }
    Ok(())
}

fn cmd_estimate(destination: &str, fallback: u32) {
    debug!(%destination, fallback, "cmd_estimate: called");
    let nightly = estimate_accommodation_cost(destination, fallback);
    println!("{}: {} per night", destination.bold(), format_usd(f64::from(nightly)));
}

fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    print!("{}", serde_yaml::to_string(config).context("Failed to serialize config")?);
    Ok(())
}
