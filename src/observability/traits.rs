//! The sink contract consumed by the queue

use crate::observability::error::ObservabilityError;
use crate::observability::event::Attributes;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Instant;

/// Destination for queue state reports
///
/// The queue owns no back-reference through this trait; a sink is an
/// append-only consumer of named reports. Failures are returned to the queue,
/// which logs and counts them but never passes them on to producers or
/// consumers.
#[async_trait]
pub trait ObservabilityPort: Send + Sync {
    /// Record one named report with its attributes
    async fn report(&self, event_name: &str, attributes: Attributes)
        -> Result<(), ObservabilityError>;

    /// Short identifier used in log lines
    fn sink_name(&self) -> &str;
}

/// Delivery statistics kept per channel subscriber
pub struct SubscriberStatistics {
    reports_delivered: AtomicUsize,
    reports_filtered: AtomicUsize,
    last_delivery_time: RwLock<Option<Instant>>,
}

impl Default for SubscriberStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriberStatistics {
    pub fn new() -> Self {
        Self {
            reports_delivered: AtomicUsize::new(0),
            reports_filtered: AtomicUsize::new(0),
            last_delivery_time: RwLock::new(None),
        }
    }

    pub fn reports_delivered(&self) -> usize {
        self.reports_delivered.load(Ordering::Relaxed)
    }

    pub fn record_delivery(&self) {
        self.reports_delivered.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut time) = self.last_delivery_time.write() {
            *time = Some(Instant::now());
        }
    }

    pub fn reports_filtered(&self) -> usize {
        self.reports_filtered.load(Ordering::Relaxed)
    }

    pub fn record_filtered(&self) {
        self.reports_filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn last_delivery_time(&self) -> Option<Instant> {
        *self.last_delivery_time.read().ok()?
    }
}
