//! Public API for observability sinks
//!
//! External modules should import from here rather than from the internal
//! modules.

pub use crate::observability::channel::ChannelObservability;
pub use crate::observability::error::ObservabilityError;
pub use crate::observability::event::{Attributes, ObservedReport, ReportFilter, ReportKind};
pub use crate::observability::sinks::{LogObservability, NoopObservability};
pub use crate::observability::traits::{ObservabilityPort, SubscriberStatistics};
