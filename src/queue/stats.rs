//! Read-only views of queue state

use crate::queue::config::CapacityPolicy;
use serde::Serialize;
use strum_macros::Display;

/// Backpressure signalling state; the queue starts `Normal` and cycles
/// between the two for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackpressureState {
    Normal,
    Backpressure,
}

impl From<bool> for BackpressureState {
    fn from(active: bool) -> Self {
        if active {
            BackpressureState::Backpressure
        } else {
            BackpressureState::Normal
        }
    }
}

/// Point-in-time projection of a queue
///
/// `backpressure_active` is the cached flag as of the last evaluation point,
/// not a value recomputed for the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Events currently buffered
    pub size: usize,
    pub backpressure_active: bool,
    /// Effective depth, including any auto-scaling adjustment
    pub max_queue_depth: usize,
    pub batch_size: usize,
    /// Depth the queue was configured with
    pub configured_max_depth: usize,
    pub capacity_policy: CapacityPolicy,
    pub total_enqueued: u64,
    pub total_rejected: u64,
    pub total_drained: u64,
    /// Highest size observed after any enqueue
    pub peak_size: usize,
    /// Sum of `Event::size_hint` over buffered events
    pub buffered_bytes: usize,
    pub scale_ups: u64,
    pub scale_downs: u64,
    /// Reports the sink failed to record
    pub report_failures: u64,
}

impl StatsSnapshot {
    pub fn state(&self) -> BackpressureState {
        BackpressureState::from(self.backpressure_active)
    }

    /// size / effective depth; above 1.0 when a soft threshold is exceeded
    pub fn utilisation(&self) -> f64 {
        if self.max_queue_depth == 0 {
            0.0
        } else {
            self.size as f64 / self.max_queue_depth as f64
        }
    }

    pub fn is_scaled(&self) -> bool {
        self.max_queue_depth != self.configured_max_depth
    }
}
