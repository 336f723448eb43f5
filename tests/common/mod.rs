//! Shared helpers for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use eventqueue::observability::api::{Attributes, ObservabilityError, ObservabilityPort};
use eventqueue::queue::api::{CapacityPolicy, Event, EventQueueCore, QueueSettings};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Sink that keeps every report name it is given
#[derive(Default)]
pub struct CollectingSink {
    names: Mutex<Vec<String>>,
}

impl CollectingSink {
    pub fn names(&self) -> Vec<String> {
        self.names.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.names().iter().filter(|n| n.as_str() == name).count()
    }
}

#[async_trait]
impl ObservabilityPort for CollectingSink {
    async fn report(
        &self,
        event_name: &str,
        _attributes: Attributes,
    ) -> Result<(), ObservabilityError> {
        self.names.lock().unwrap().push(event_name.to_string());
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "collecting"
    }
}

pub fn settings(depth: usize, batch: usize, policy: CapacityPolicy) -> QueueSettings {
    QueueSettings {
        max_queue_depth: depth,
        batch_size: batch,
        capacity_policy: policy,
        ..QueueSettings::default()
    }
}

pub fn queue_with(settings: QueueSettings) -> (EventQueueCore, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::default());
    let queue = EventQueueCore::from_settings(sink.clone(), &settings).unwrap();
    (queue, sink)
}

pub fn order(id: u64) -> Event {
    Event::from_json("order.placed", json!({ "order_id": id, "total": id * 10 }))
}
