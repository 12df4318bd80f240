//! Stage progress events
//!
//! The pipeline emits a [`StageEvent`] whenever a stage starts, completes,
//! falls back or halts for clarification. Consumers (the CLI progress line,
//! tests) subscribe to the [`EventBus`]; with no subscribers events are
//! dropped.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tripcrew::events::{EventBus, Stage};
//! use std::sync::Arc;
//!
//! let bus = Arc::new(EventBus::with_default_capacity());
//! let mut rx = bus.subscribe();
//!
//! let emitter = bus.emitter_for("0193a1c2-...");
//! emitter.started(Stage::Research);
//!
//! while let Ok(event) = rx.recv().await {
//!     println!("{} {}", event.stage, event.status);
//! }
//! ```

mod bus;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, EventEmitter};
pub use types::{Stage, StageEvent, StageStatus};
