//! Built-in sinks that need no subscribers

use crate::observability::error::ObservabilityError;
use crate::observability::event::Attributes;
use crate::observability::traits::ObservabilityPort;
use async_trait::async_trait;

/// Sink for disabled observability; accepts and discards every report
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObservability;

#[async_trait]
impl ObservabilityPort for NoopObservability {
    async fn report(
        &self,
        _event_name: &str,
        _attributes: Attributes,
    ) -> Result<(), ObservabilityError> {
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "noop"
    }
}

/// Sink that writes every report through the `log` facade
///
/// Attributes are rendered as compact JSON after the report name.
#[derive(Debug, Clone)]
pub struct LogObservability {
    level: log::Level,
}

impl Default for LogObservability {
    fn default() -> Self {
        Self::new(log::Level::Info)
    }
}

impl LogObservability {
    pub fn new(level: log::Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> log::Level {
        self.level
    }
}

#[async_trait]
impl ObservabilityPort for LogObservability {
    async fn report(&self, event_name: &str, attributes: Attributes) -> Result<(), ObservabilityError> {
        let rendered = serde_json::to_string(&attributes).map_err(|e| {
            ObservabilityError::SinkUnavailable {
                message: format!("could not render attributes for {}: {}", event_name, e),
            }
        })?;
        log::log!(self.level, "{} {}", event_name, rendered);
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attributes() -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("size".to_string(), json!(6));
        attributes
    }

    #[tokio::test]
    async fn test_noop_accepts_everything() {
        let sink = NoopObservability;
        assert!(sink.report("queue.enqueued", attributes()).await.is_ok());
        assert_eq!(sink.sink_name(), "noop");
    }

    #[tokio::test]
    async fn test_log_sink_reports_without_logger_installed() {
        let sink = LogObservability::new(log::Level::Debug);
        assert_eq!(sink.level(), log::Level::Debug);
        assert!(sink
            .report("queue.backpressure_changed", attributes())
            .await
            .is_ok());
    }
}
