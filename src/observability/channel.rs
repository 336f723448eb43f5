//! Fan-out sink delivering reports to in-process subscribers

use crate::core::sync::{handle_rwlock_read, handle_rwlock_write};
use crate::observability::error::ObservabilityError;
use crate::observability::event::{Attributes, ObservedReport, ReportFilter};
use crate::observability::traits::{ObservabilityPort, SubscriberStatistics};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

struct SubscriberInfo {
    filter: ReportFilter,
    source: String,
    sender: UnboundedSender<ObservedReport>,
    statistics: SubscriberStatistics,
}

/// Sink that forwards each report to every subscriber whose filter accepts it
///
/// Subscribers receive reports over unbounded channels, so a report never
/// waits on a slow subscriber. A subscriber whose receiver has been dropped is
/// removed on the next report, and that report returns
/// `ObservabilityError::PublishFailed` naming it.
#[derive(Default)]
pub struct ChannelObservability {
    subscribers: RwLock<HashMap<String, SubscriberInfo>>,
}

fn sink_unavailable(message: String) -> ObservabilityError {
    ObservabilityError::SinkUnavailable { message }
}

impl ChannelObservability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber, replacing any existing one with the same id
    pub fn subscribe(
        &self,
        subscriber_id: String,
        filter: ReportFilter,
        source: String,
    ) -> Result<UnboundedReceiver<ObservedReport>, ObservabilityError> {
        let (sender, receiver) = unbounded_channel();

        let subscriber_info = SubscriberInfo {
            filter,
            source: source.clone(),
            sender,
            statistics: SubscriberStatistics::new(),
        };

        let mut subscribers = handle_rwlock_write(self.subscribers.write(), sink_unavailable)?;
        if let Some(existing) = subscribers.insert(subscriber_id.clone(), subscriber_info) {
            log::warn!(
                "Subscriber '{}' replaced existing subscription (source: {} -> {})",
                subscriber_id,
                existing.source,
                source
            );
        }

        Ok(receiver)
    }

    pub fn unsubscribe(&self, subscriber_id: &str) -> Result<bool, ObservabilityError> {
        let mut subscribers = handle_rwlock_write(self.subscribers.write(), sink_unavailable)?;
        Ok(subscribers.remove(subscriber_id).is_some())
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn has_subscriber(&self, subscriber_id: &str) -> bool {
        self.subscribers
            .read()
            .map(|s| s.contains_key(subscriber_id))
            .unwrap_or(false)
    }

    /// (delivered, filtered) counts for one subscriber
    pub fn subscriber_counts(&self, subscriber_id: &str) -> Option<(usize, usize)> {
        let subscribers = self.subscribers.read().ok()?;
        subscribers.get(subscriber_id).map(|info| {
            (
                info.statistics.reports_delivered(),
                info.statistics.reports_filtered(),
            )
        })
    }

    fn publish(&self, report: ObservedReport) -> Result<(), ObservabilityError> {
        let mut failed_subscribers = Vec::new();

        {
            let subscribers = handle_rwlock_read(self.subscribers.read(), sink_unavailable)?;
            for (subscriber_id, subscriber_info) in subscribers.iter() {
                if !subscriber_info.filter.accepts(&report.name) {
                    subscriber_info.statistics.record_filtered();
                    continue;
                }

                if subscriber_info.sender.send(report.clone()).is_err() {
                    failed_subscribers.push(subscriber_id.clone());
                } else {
                    subscriber_info.statistics.record_delivery();
                }
            }
        }

        if failed_subscribers.is_empty() {
            return Ok(());
        }

        let mut subscribers = handle_rwlock_write(self.subscribers.write(), sink_unavailable)?;
        for subscriber_id in &failed_subscribers {
            subscribers.remove(subscriber_id);
        }
        log::debug!(
            "Removed {} closed subscriber(s) after {}",
            failed_subscribers.len(),
            report.name
        );

        Err(ObservabilityError::PublishFailed {
            report: report.name,
            failed_subscribers,
        })
    }
}

#[async_trait]
impl ObservabilityPort for ChannelObservability {
    async fn report(&self, event_name: &str, attributes: Attributes) -> Result<(), ObservabilityError> {
        self.publish(ObservedReport::new(event_name, attributes))
    }

    fn sink_name(&self) -> &str {
        "channel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::event::ReportKind;

    #[tokio::test]
    async fn test_subscribe_and_count() {
        let sink = ChannelObservability::new();

        let _a = sink
            .subscribe("dashboard".to_string(), ReportFilter::All, "test:a".to_string())
            .unwrap();
        let _b = sink
            .subscribe(
                "pager".to_string(),
                ReportFilter::BackpressureOnly,
                "test:b".to_string(),
            )
            .unwrap();

        assert_eq!(sink.subscriber_count(), 2);
        assert!(sink.has_subscriber("dashboard"));
        assert!(!sink.has_subscriber("missing"));
    }

    #[tokio::test]
    async fn test_reports_respect_filters() {
        let sink = ChannelObservability::new();
        let mut all = sink
            .subscribe("all".to_string(), ReportFilter::All, "test".to_string())
            .unwrap();
        let mut pager = sink
            .subscribe(
                "pager".to_string(),
                ReportFilter::BackpressureOnly,
                "test".to_string(),
            )
            .unwrap();

        sink.report(ReportKind::Enqueued.as_ref(), Attributes::new())
            .await
            .unwrap();
        sink.report(ReportKind::BackpressureChanged.as_ref(), Attributes::new())
            .await
            .unwrap();

        assert_eq!(all.recv().await.unwrap().kind(), Some(ReportKind::Enqueued));
        assert_eq!(
            all.recv().await.unwrap().kind(),
            Some(ReportKind::BackpressureChanged)
        );
        assert_eq!(
            pager.recv().await.unwrap().kind(),
            Some(ReportKind::BackpressureChanged)
        );
        assert!(pager.try_recv().is_err());

        assert_eq!(sink.subscriber_counts("pager"), Some((1, 1)));
        assert_eq!(sink.subscriber_counts("all"), Some((2, 0)));
    }

    #[tokio::test]
    async fn test_closed_subscriber_is_removed_and_reported() {
        let sink = ChannelObservability::new();
        let _kept = sink
            .subscribe("kept".to_string(), ReportFilter::All, "test".to_string())
            .unwrap();
        let dropped = sink
            .subscribe("dropped".to_string(), ReportFilter::All, "test".to_string())
            .unwrap();
        drop(dropped);

        let result = sink.report("queue.enqueued", Attributes::new()).await;
        match result {
            Err(ObservabilityError::PublishFailed {
                report,
                failed_subscribers,
            }) => {
                assert_eq!(report, "queue.enqueued");
                assert_eq!(failed_subscribers, vec!["dropped".to_string()]);
            }
            other => panic!("Expected PublishFailed, got {:?}", other),
        }

        assert_eq!(sink.subscriber_count(), 1);
        assert!(sink.report("queue.enqueued", Attributes::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let sink = ChannelObservability::new();
        let _rx = sink
            .subscribe("temp".to_string(), ReportFilter::All, "test".to_string())
            .unwrap();

        assert!(sink.unsubscribe("temp").unwrap());
        assert!(!sink.unsubscribe("temp").unwrap());
        assert_eq!(sink.subscriber_count(), 0);
    }
}
