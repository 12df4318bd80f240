//! Stage pipeline controller
//!
//! Drives one trip request through four sequential stages:
//!
//! 1. **Parse** - free text to [`TripQuery`]; may halt with clarification
//!    questions. The only stage whose failure ends the run.
//! 2. **Research** - destination research and logistics search run
//!    concurrently; each branch falls back on its own.
//! 3. **Curate** - day-by-day plan; falls back to a single arrival day.
//! 4. **Assemble** - option selection, destination correction and budget
//!    overlay; falls back to an itinerary built from the option lists.
//!
//! Capability calls go through a bounded [`WorkerPool`]. Research results
//! are cached in a shared [`TtlCache`].

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use tripcache::TtlCache;

mod assemble;
pub mod consistency;
mod curate;
mod error;
pub mod fallback;
mod parse;
mod pool;
mod research;
pub mod sanitize;

pub use assemble::{BudgetOverlay, apply_budget_overlay};
pub use error::PipelineError;
pub use pool::WorkerPool;

use crate::capability::{DestinationResearcher, ItineraryAssembler, ItineraryCurator, LogisticsSearcher, QueryParser};
use crate::config::Config;
use crate::domain::{PipelineOutcome, TripQuery};
use crate::events::{EventBus, EventEmitter};
use crate::intake::Answers;

/// The five capabilities a run consumes
#[derive(Clone)]
pub struct Capabilities {
    pub parser: Arc<dyn QueryParser>,
    pub researcher: Arc<dyn DestinationResearcher>,
    pub logistics: Arc<dyn LogisticsSearcher>,
    pub curator: Arc<dyn ItineraryCurator>,
    pub assembler: Arc<dyn ItineraryAssembler>,
}

/// Research cache shared across runs (values are serialized reports)
pub type ResearchCache = TtlCache<serde_json::Value>;

/// Per-run state threaded through the stages
struct RunContext {
    emitter: EventEmitter,
    today: NaiveDate,
    /// Fallbacks used and consistency findings, copied onto the itinerary
    warnings: Vec<String>,
}

/// Explicit context object for pipeline runs
///
/// Construct once and share behind an `Arc`; runs do not interfere except
/// through the research cache.
pub struct TripPipeline {
    capabilities: Capabilities,
    config: Config,
    cache: Arc<ResearchCache>,
    pool: WorkerPool,
    events: Option<Arc<EventBus>>,
    today: Option<NaiveDate>,
}

impl TripPipeline {
    pub fn new(capabilities: Capabilities, config: Config) -> Self {
        debug!(
            pool_size = config.pipeline.worker_pool_size,
            ttl_hours = config.cache.ttl_hours,
            "TripPipeline::new: called"
        );
        let cache = Arc::new(ResearchCache::new(config.cache.ttl()));
        let pool = WorkerPool::from_config(&config.pipeline);
        Self {
            capabilities,
            config,
            cache,
            pool,
            events: None,
            today: None,
        }
    }

    /// Share an existing research cache
    pub fn with_cache(mut self, cache: Arc<ResearchCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    /// Pin "today" for date defaults and relative answers
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ResearchCache> {
        &self.cache
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Run the four stages for one request
    ///
    /// With `ask_if_missing` the run halts with a clarification request when
    /// required fields are absent; otherwise they are auto-filled. `answers`
    /// are merged over the parsed query before that decision.
    pub async fn run(
        &self,
        text: &str,
        ask_if_missing: bool,
        answers: Option<&Answers>,
    ) -> Result<PipelineOutcome, PipelineError> {
        let run_id = uuid::Uuid::now_v7().to_string();
        let started = Instant::now();
        info!(%run_id, %ask_if_missing, "TripPipeline::run: starting");

        let emitter = match &self.events {
            Some(bus) => bus.emitter_for(run_id.clone()),
            None => EventEmitter::detached(run_id.clone()),
        };
        let mut run = RunContext {
            emitter,
            today: self.today(),
            warnings: Vec::new(),
        };

        self.prepare_cache().await;

        let (query, budget_supplied) = match self.understand(text, ask_if_missing, answers, &mut run).await? {
            parse::Understood::Ask(request) => {
                info!(%run_id, missing = request.missing_info.len(), "TripPipeline::run: needs more info");
                return Ok(PipelineOutcome::NeedsMoreInfo(request));
            }
            parse::Understood::Ready { query, budget_supplied } => (query, budget_supplied),
        };

        let (destination, logistics) = self.research(&query, &mut run).await;
        let daily_plans = self.curate(&query, &destination, &logistics, &mut run).await;
        let itinerary = self
            .assemble(&query, budget_supplied, destination, logistics, daily_plans, &mut run)
            .await;

        info!(
            %run_id,
            destination = %itinerary.destination,
            days = itinerary.daily_plans.len(),
            warnings = itinerary.warnings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "TripPipeline::run: complete"
        );
        Ok(PipelineOutcome::Complete(Box::new(itinerary)))
    }

    /// Sweep expired entries; clear everything when configured per run
    async fn prepare_cache(&self) {
        let removed = self.cache.cleanup_expired().await;
        if removed > 0 {
            tracing::warn!(removed, "TripPipeline::prepare_cache: expired cache entries swept");
        }
        if self.config.cache.clear_per_run {
            debug!("TripPipeline::prepare_cache: clearing cache for this run");
            self.cache.clear().await;
        }
    }
}

/// Destination of a validated query (Stage 1 guarantees one)
fn destination_of(query: &TripQuery) -> &str {
    query.destination().unwrap_or_default()
}
