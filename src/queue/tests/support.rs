//! Shared sinks and builders for queue tests

use crate::observability::api::{Attributes, ObservabilityError, ObservabilityPort};
use crate::queue::api::{CapacityPolicy, Event, EventQueueCore, QueueSettings};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Sink that keeps every report it receives
#[derive(Default)]
pub(super) struct RecordingSink {
    reports: Mutex<Vec<(String, Attributes)>>,
}

impl RecordingSink {
    pub(super) fn calls(&self) -> usize {
        self.reports.lock().unwrap().len()
    }

    pub(super) fn names(&self) -> Vec<String> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub(super) fn named(&self, name: &str) -> Vec<Attributes> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, attributes)| attributes.clone())
            .collect()
    }
}

#[async_trait]
impl ObservabilityPort for RecordingSink {
    async fn report(&self, event_name: &str, attributes: Attributes) -> Result<(), ObservabilityError> {
        self.reports
            .lock()
            .unwrap()
            .push((event_name.to_string(), attributes));
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "recording"
    }
}

/// Sink that fails every report
#[derive(Default)]
pub(super) struct FailingSink {
    attempts: AtomicUsize,
}

impl FailingSink {
    pub(super) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObservabilityPort for FailingSink {
    async fn report(&self, event_name: &str, _attributes: Attributes) -> Result<(), ObservabilityError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ObservabilityError::SinkUnavailable {
            message: format!("refusing {}", event_name),
        })
    }

    fn sink_name(&self) -> &str {
        "failing"
    }
}

pub(super) fn settings(max_queue_depth: usize, batch_size: usize) -> QueueSettings {
    QueueSettings {
        max_queue_depth,
        batch_size,
        ..QueueSettings::default()
    }
}

pub(super) fn hard_reject(max_queue_depth: usize, batch_size: usize) -> QueueSettings {
    QueueSettings {
        capacity_policy: CapacityPolicy::HardReject,
        ..settings(max_queue_depth, batch_size)
    }
}

/// Queue reporting into a fresh recording sink
pub(super) fn observed_queue(mut settings: QueueSettings) -> (EventQueueCore, Arc<RecordingSink>) {
    settings.enable_observability = true;
    let sink = Arc::new(RecordingSink::default());
    let queue = EventQueueCore::from_settings(sink.clone(), &settings).unwrap();
    (queue, sink)
}

/// Queue reporting into the no-op sink
pub(super) fn quiet_queue(settings: QueueSettings) -> EventQueueCore {
    EventQueueCore::from_settings(
        Arc::new(crate::observability::api::NoopObservability),
        &settings,
    )
    .unwrap()
}

pub(super) fn event(index: usize) -> Event {
    Event::from_json("test.event", json!({ "index": index }))
}

pub(super) fn index_of(event: &Event) -> u64 {
    event.body()["index"].as_u64().unwrap()
}
