//! Scripted capabilities for tests and offline runs

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

use super::{
    AssemblyRequest, CapabilityError, CurationRequest, DestinationResearcher, ItineraryAssembler, ItineraryCurator,
    LogisticsSearcher, QueryParser,
};
use crate::domain::{DestinationReport, FinalItinerary, LogisticsReport, TripQuery};

/// What a mock does on every call
#[derive(Debug, Clone)]
pub enum Script<T> {
    /// Return a clone of the value
    Return(T),
    /// Return the value after a delay
    Delay(Duration, T),
    /// Fail with `CapabilityError::Unavailable`
    Fail(String),
    /// Panic inside the call
    Panic(String),
    /// Never complete
    Hang,
}

/// Mock capability with a fixed script and call bookkeeping
pub struct MockCapability<T> {
    script: Script<T>,
    call_count: AtomicUsize,
    inputs: Mutex<Vec<serde_json::Value>>,
}

impl<T: Clone + Send + Sync> MockCapability<T> {
    pub fn new(script: Script<T>) -> Self {
        debug!("MockCapability::new: called");
        Self {
            script,
            call_count: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn returning(value: T) -> Self {
        Self::new(Script::Return(value))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(Script::Fail(message.into()))
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Inputs seen so far, serialized as JSON
    pub fn inputs(&self) -> Vec<serde_json::Value> {
        self.inputs.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    async fn respond<I: Serialize + ?Sized>(&self, input: &I) -> Result<T, CapabilityError> {
        let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
        debug!(%idx, "MockCapability::respond: called");
        if let Ok(value) = serde_json::to_value(input)
            && let Ok(mut guard) = self.inputs.lock()
        {
            guard.push(value);
        }

        match &self.script {
            Script::Return(value) => Ok(value.clone()),
            Script::Delay(delay, value) => {
                tokio::time::sleep(*delay).await;
                Ok(value.clone())
            }
            Script::Fail(message) => Err(CapabilityError::Unavailable(message.clone())),
            Script::Panic(message) => panic!("{}", message),
            Script::Hang => {
                std::future::pending::<()>().await;
                Err(CapabilityError::Unavailable("unreachable".to_string()))
            }
        }
    }
}

#[async_trait]
impl QueryParser for MockCapability<TripQuery> {
    async fn parse(&self, text: &str) -> Result<TripQuery, CapabilityError> {
        self.respond(text).await
    }
}

#[async_trait]
impl DestinationResearcher for MockCapability<DestinationReport> {
    async fn research(&self, query: &TripQuery) -> Result<DestinationReport, CapabilityError> {
        self.respond(query).await
    }
}

#[async_trait]
impl LogisticsSearcher for MockCapability<LogisticsReport> {
    async fn search(&self, query: &TripQuery) -> Result<LogisticsReport, CapabilityError> {
        self.respond(query).await
    }
}

#[async_trait]
impl ItineraryCurator for MockCapability<String> {
    async fn curate(&self, request: &CurationRequest) -> Result<String, CapabilityError> {
        self.respond(request).await
    }
}

#[async_trait]
impl ItineraryAssembler for MockCapability<FinalItinerary> {
    async fn assemble(&self, request: &AssemblyRequest) -> Result<FinalItinerary, CapabilityError> {
        self.respond(request).await
    }
}
