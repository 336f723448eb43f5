//! Event payloads carried by the queue
//!
//! The queue never looks inside an event. Identity is the position in the
//! buffer; two events with the same type tag and body are still two events.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::mem;

/// An immutable, type-tagged payload
///
/// # Example
///
/// ```rust
/// use eventqueue::queue::api::Event;
/// use serde_json::json;
///
/// let event = Event::from_json("user.created", json!({"id": 42}));
/// assert_eq!(event.event_type(), "user.created");
/// assert_eq!(event.body()["id"], 42);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    event_type: String,
    body: Map<String, Value>,
    created_at: DateTime<Utc>,
    #[serde(skip)]
    size_hint: usize,
}

impl Event {
    pub fn new(event_type: impl Into<String>, body: Map<String, Value>) -> Self {
        let event_type = event_type.into();
        let size_hint = estimate_size(&event_type, &body);
        Self {
            event_type,
            body,
            created_at: Utc::now(),
            size_hint,
        }
    }

    /// Build an event from any JSON value; non-object values are stored
    /// under a single `value` key
    pub fn from_json(event_type: impl Into<String>, body: Value) -> Self {
        let body = match body {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Self::new(event_type, body)
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Approximate heap + inline footprint in bytes, fixed at creation
    pub fn size_hint(&self) -> usize {
        self.size_hint
    }
}

fn estimate_size(event_type: &str, body: &Map<String, Value>) -> usize {
    let body_bytes = serde_json::to_string(body).map(|s| s.len()).unwrap_or(0);
    mem::size_of::<Event>() + event_type.len() + body_bytes
}

/// Creates events on behalf of producers
///
/// The queue accepts any `Event`; a factory lets producers share one
/// construction policy (extra metadata, naming conventions) without the
/// queue knowing about it.
pub trait EventFactory: Send + Sync {
    fn create(&self, type_tag: &str, body: Map<String, Value>) -> Event;
}

/// Factory that builds events exactly as given
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultEventFactory;

impl EventFactory for DefaultEventFactory {
    fn create(&self, type_tag: &str, body: Map<String, Value>) -> Event {
        Event::new(type_tag, body)
    }
}

/// Factory that stamps every body with the producing component's name
#[derive(Debug, Clone)]
pub struct SourceTaggingFactory {
    source: String,
}

impl SourceTaggingFactory {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl EventFactory for SourceTaggingFactory {
    fn create(&self, type_tag: &str, mut body: Map<String, Value>) -> Event {
        body.insert("source".to_string(), Value::String(self.source.clone()));
        Event::new(type_tag, body)
    }
}
