//! Stage 2: concurrent destination research and logistics search

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::{debug, info, warn};

use super::{RunContext, TripPipeline, destination_of, fallback, sanitize};
use crate::capability::CapabilityError;
use crate::domain::{DestinationReport, LogisticsReport, TripQuery};
use crate::events::Stage;

impl TripPipeline {
    pub(super) async fn research(
        &self,
        query: &TripQuery,
        run: &mut RunContext,
    ) -> (DestinationReport, LogisticsReport) {
        let destination = destination_of(query);
        debug!(%destination, origin = ?query.origin, "TripPipeline::research: called");
        run.emitter.started(Stage::Research);

        let (destination_result, logistics_result) =
            tokio::join!(self.research_destination(query), self.search_logistics(query));

        let report = match destination_result {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, %destination, "TripPipeline::research: destination branch failed, using fallback");
                run.emitter.fallback(Stage::Research, format!("destination research: {}", e));
                run.warnings.push(format!("Destination research unavailable ({}); showing general information.", e));
                fallback::destination_report(destination)
            }
        };

        let mut logistics = match logistics_result {
            Ok(logistics) => logistics,
            Err(e) => {
                warn!(error = %e, %destination, "TripPipeline::research: logistics branch failed, using fallback");
                run.emitter.fallback(Stage::Research, format!("logistics search: {}", e));
                run.warnings.push(format!("Flight and hotel search unavailable ({}).", e));
                fallback::logistics_report()
            }
        };

        let rewritten = sanitize::sanitize_logistics(&mut logistics, destination, &self.config.booking);
        if rewritten > 0 {
            debug!(rewritten, "TripPipeline::research: hotel booking urls rewritten");
        }

        info!(
            attractions = report.attractions.len(),
            outbound = logistics.outbound_flights.len(),
            returns = logistics.return_flights.len(),
            hotels = logistics.hotel_options.len(),
            "TripPipeline::research: complete"
        );
        run.emitter.completed(Stage::Research);
        (report, logistics)
    }

    async fn research_destination(&self, query: &TripQuery) -> Result<DestinationReport, CapabilityError> {
        let key = tripcache::cache_key(
            "destination",
            &(destination_of(query), query.start_date, query.end_date),
        );
        let researcher = self.capabilities.researcher.clone();
        let owned = query.clone();

        self.cached(key, || async move {
            let report = self
                .pool
                .run("destination", async move { researcher.research(&owned).await })
                .await?;
            if report.is_empty() {
                return Err(CapabilityError::Malformed("empty destination report".to_string()));
            }
            Ok(report)
        })
        .await
    }

    async fn search_logistics(&self, query: &TripQuery) -> Result<LogisticsReport, CapabilityError> {
        let key = tripcache::cache_key(
            "logistics",
            &(
                query.origin(),
                destination_of(query),
                query.start_date,
                query.end_date,
                query.travelers.as_deref(),
            ),
        );
        let searcher = self.capabilities.logistics.clone();
        let owned = query.clone();

        self.cached(key, || async move {
            let report = self
                .pool
                .run("logistics", async move { searcher.search(&owned).await })
                .await?;
            if report.is_empty() {
                return Err(CapabilityError::Malformed("no flight or hotel options".to_string()));
            }
            Ok(report)
        })
        .await
    }

    /// Serve from the research cache or compute and store
    ///
    /// Only successful results are stored. Without a usable key the call is
    /// made uncached.
    async fn cached<T, F, Fut>(&self, key: Result<String, serde_json::Error>, compute: F) -> Result<T, CapabilityError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CapabilityError>>,
    {
        let key = match key {
            Ok(key) => key,
            Err(e) => {
                debug!(error = %e, "TripPipeline::cached: no cache key, calling directly");
                return compute().await;
            }
        };

        let value = self
            .cache
            .get_or_insert_with(&key, self.config.cache.ttl(), || async move {
                let result = compute().await?;
                Ok::<_, CapabilityError>(serde_json::to_value(&result)?)
            })
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}
