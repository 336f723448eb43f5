//! Report names and payloads emitted by the queue

use serde_json::{Map, Value};
use std::str::FromStr;
use std::time::SystemTime;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Attribute map attached to every report
pub type Attributes = Map<String, Value>;

/// Everything the queue reports to an observability sink
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter)]
pub enum ReportKind {
    #[strum(serialize = "queue.enqueued")]
    Enqueued,
    #[strum(serialize = "queue.rejected")]
    Rejected,
    #[strum(serialize = "queue.drained")]
    Drained,
    #[strum(serialize = "queue.backpressure_changed")]
    BackpressureChanged,
    #[strum(serialize = "queue.resized")]
    Resized,
}

/// A report as delivered to channel subscribers
#[derive(Clone, Debug)]
pub struct ObservedReport {
    pub name: String,
    pub attributes: Attributes,
    pub timestamp: SystemTime,
}

impl ObservedReport {
    pub fn new(name: &str, attributes: Attributes) -> Self {
        Self {
            name: name.to_string(),
            attributes,
            timestamp: SystemTime::now(),
        }
    }

    /// The known report kind, if the name is one the queue emits
    pub fn kind(&self) -> Option<ReportKind> {
        ReportKind::from_str(&self.name).ok()
    }
}

/// Which reports a channel subscriber wants to see
#[derive(Clone, Debug, PartialEq)]
pub enum ReportFilter {
    /// enqueued, rejected and drained
    TrafficOnly,
    /// backpressure transitions only
    BackpressureOnly,
    /// capacity resizes only
    ScalingOnly,
    /// backpressure transitions and resizes
    StateChanges,
    All,
}

impl ReportFilter {
    /// Check if a report name should be accepted by this filter
    ///
    /// Names the queue never emits are only accepted by `All`.
    pub fn accepts(&self, name: &str) -> bool {
        let kind = match ReportKind::from_str(name) {
            Ok(kind) => kind,
            Err(_) => return matches!(self, ReportFilter::All),
        };

        matches!(
            (self, kind),
            (ReportFilter::TrafficOnly, ReportKind::Enqueued)
                | (ReportFilter::TrafficOnly, ReportKind::Rejected)
                | (ReportFilter::TrafficOnly, ReportKind::Drained)
                | (ReportFilter::BackpressureOnly, ReportKind::BackpressureChanged)
                | (ReportFilter::ScalingOnly, ReportKind::Resized)
                | (ReportFilter::StateChanges, ReportKind::BackpressureChanged)
                | (ReportFilter::StateChanges, ReportKind::Resized)
                | (ReportFilter::All, _)
        )
    }
}
