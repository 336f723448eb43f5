//! In-process event queue with adaptive backpressure
//!
//! Producers append events; a consumer drains them in batches. The queue
//! keeps a cached backpressure flag that producers read to throttle
//! themselves, and can optionally widen its own depth under sustained load.
//!
//! # Overview
//!
//! - **Soft or hard capacity**: `CapacityPolicy::SoftThreshold` always accepts
//!   and only signals; `CapacityPolicy::HardReject` refuses with `QueueFull`
//! - **Cached signal**: the flag is evaluated on enqueue, drain and explicit
//!   `should_activate_backpressure()` calls, and read without evaluation by
//!   `stats()` and `is_backpressure_active()`; only enqueue and drain advance
//!   auto-scaling
//! - **Non-blocking drain**: `drain(limit)` returns what is there, oldest first
//! - **Auto-scaling**: sustained pressure grows the effective depth, sustained
//!   idleness shrinks it back, never below the configured depth
//! - **Observability**: state changes are reported to an `ObservabilityPort`
//!   when enabled; sink failures never reach producers or consumers
//!
//! # State machine
//!
//! ```text
//!            size > depth
//!   ┌────────┐ ─────────────▶ ┌──────────────┐
//!   │ Normal │                │ Backpressure │
//!   └────────┘ ◀───────────── └──────────────┘
//!            size <= depth
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use eventqueue::observability::api::LogObservability;
//! use eventqueue::queue::api::{Event, EventQueueCore, QueueSettings};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = QueueSettings {
//!     max_queue_depth: 500,
//!     batch_size: 50,
//!     enable_observability: true,
//!     ..QueueSettings::default()
//! };
//! let queue = EventQueueCore::from_settings(Arc::new(LogObservability::default()), &settings)?;
//!
//! queue.enqueue(Event::from_json("order.placed", json!({"id": 1}))).await?;
//!
//! while !queue.is_empty() {
//!     for event in queue.drain_batch().await? {
//!         println!("{}", event.event_type());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod event;
mod event_queue;
mod scaling;
mod stats;

pub mod api;

#[cfg(test)]
mod tests;
