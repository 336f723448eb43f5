//! Queue configuration
//!
//! `QueueSettings` is the editable, serde-friendly form (all fields defaulted,
//! loadable from TOML). `QueueConfiguration` is what the queue is built from:
//! it only exists after validation and exposes read-only getters.

use crate::core::validation::{
    require_at_least_one, require_growth_factor, require_open_unit_interval,
};
use crate::queue::error::{QueueError, QueueResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strum_macros::Display;

pub const DEFAULT_MAX_QUEUE_DEPTH: usize = 1000;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_PRESSURE_WINDOW: usize = 3;
pub const DEFAULT_IDLE_WINDOW: usize = 5;
pub const DEFAULT_GROWTH_FACTOR: f64 = 1.5;
pub const DEFAULT_LOW_WATERMARK: f64 = 0.25;
/// Scaled depth ceiling as a multiple of the configured depth
pub const DEFAULT_MAX_SCALE_MULTIPLIER: usize = 4;

/// What happens when an event arrives at a queue that is at capacity
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Always accept; capacity only drives the backpressure signal
    #[default]
    #[strum(serialize = "soft_threshold")]
    SoftThreshold,
    /// Refuse new events with `QueueFull` once capacity is reached
    #[strum(serialize = "hard_reject")]
    HardReject,
}

/// Editable auto-scaling tuning, the `[auto_scaling]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AutoScalingSettings {
    /// Consecutive pressured evaluations before growing
    pub pressure_window: usize,
    /// Consecutive low-utilisation evaluations before shrinking
    pub idle_window: usize,
    pub growth_factor: f64,
    /// Utilisation at or below which an evaluation counts as idle
    pub low_watermark: f64,
    /// Upper bound for the scaled depth; defaults to 4x the configured depth
    pub max_scaled_depth: Option<usize>,
}

impl Default for AutoScalingSettings {
    fn default() -> Self {
        Self {
            pressure_window: DEFAULT_PRESSURE_WINDOW,
            idle_window: DEFAULT_IDLE_WINDOW,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            low_watermark: DEFAULT_LOW_WATERMARK,
            max_scaled_depth: None,
        }
    }
}

/// Editable queue settings
///
/// # Example
///
/// ```rust
/// use eventqueue::queue::api::{CapacityPolicy, QueueSettings};
///
/// let config = QueueSettings::from_toml_str(
///     r#"
///     max_queue_depth = 5
///     batch_size = 2
///     capacity_policy = "hard_reject"
///     "#,
/// )
/// .unwrap()
/// .validate()
/// .unwrap();
///
/// assert_eq!(config.max_queue_depth(), 5);
/// assert_eq!(config.capacity_policy(), CapacityPolicy::HardReject);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueueSettings {
    pub max_queue_depth: usize,
    pub batch_size: usize,
    pub enable_observability: bool,
    pub enable_auto_scaling: bool,
    pub capacity_policy: CapacityPolicy,
    pub auto_scaling: AutoScalingSettings,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            max_queue_depth: DEFAULT_MAX_QUEUE_DEPTH,
            batch_size: DEFAULT_BATCH_SIZE,
            enable_observability: false,
            enable_auto_scaling: false,
            capacity_policy: CapacityPolicy::SoftThreshold,
            auto_scaling: AutoScalingSettings::default(),
        }
    }
}

impl QueueSettings {
    /// Parse settings from a TOML document whose top level is the queue table
    pub fn from_toml_str(contents: &str) -> QueueResult<Self> {
        toml::from_str(contents)
            .map_err(|e| QueueError::invalid(format!("could not parse queue settings: {}", e)))
    }

    /// Read and parse a queue settings file
    pub async fn load(path: &Path) -> QueueResult<Self> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            QueueError::invalid(format!("could not read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check every field and freeze the result
    pub fn validate(&self) -> QueueResult<QueueConfiguration> {
        let max_queue_depth =
            require_at_least_one("max_queue_depth", self.max_queue_depth).map_err(QueueError::invalid)?;
        let batch_size =
            require_at_least_one("batch_size", self.batch_size).map_err(QueueError::invalid)?;

        let scaling = &self.auto_scaling;
        let pressure_window = require_at_least_one("auto_scaling.pressure_window", scaling.pressure_window)
            .map_err(QueueError::invalid)?;
        let idle_window = require_at_least_one("auto_scaling.idle_window", scaling.idle_window)
            .map_err(QueueError::invalid)?;
        let growth_factor = require_growth_factor("auto_scaling.growth_factor", scaling.growth_factor)
            .map_err(QueueError::invalid)?;
        let low_watermark = require_open_unit_interval("auto_scaling.low_watermark", scaling.low_watermark)
            .map_err(QueueError::invalid)?;

        let max_scaled_depth = match scaling.max_scaled_depth {
            Some(ceiling) if ceiling < max_queue_depth => {
                return Err(QueueError::invalid(format!(
                    "auto_scaling.max_scaled_depth ({}) is below max_queue_depth ({})",
                    ceiling, max_queue_depth
                )));
            }
            Some(ceiling) => ceiling,
            None => max_queue_depth.saturating_mul(DEFAULT_MAX_SCALE_MULTIPLIER),
        };

        Ok(QueueConfiguration {
            max_queue_depth,
            batch_size,
            enable_observability: self.enable_observability,
            enable_auto_scaling: self.enable_auto_scaling,
            capacity_policy: self.capacity_policy,
            auto_scaling: AutoScalingPolicy {
                pressure_window,
                idle_window,
                growth_factor,
                low_watermark,
                max_scaled_depth,
            },
        })
    }
}

/// Validated auto-scaling tuning
#[derive(Debug, Clone, PartialEq)]
pub struct AutoScalingPolicy {
    pressure_window: usize,
    idle_window: usize,
    growth_factor: f64,
    low_watermark: f64,
    max_scaled_depth: usize,
}

impl AutoScalingPolicy {
    pub fn pressure_window(&self) -> usize {
        self.pressure_window
    }

    pub fn idle_window(&self) -> usize {
        self.idle_window
    }

    pub fn growth_factor(&self) -> f64 {
        self.growth_factor
    }

    pub fn low_watermark(&self) -> f64 {
        self.low_watermark
    }

    pub fn max_scaled_depth(&self) -> usize {
        self.max_scaled_depth
    }
}

/// Immutable, validated queue configuration
#[derive(Debug, Clone, PartialEq)]
pub struct QueueConfiguration {
    max_queue_depth: usize,
    batch_size: usize,
    enable_observability: bool,
    enable_auto_scaling: bool,
    capacity_policy: CapacityPolicy,
    auto_scaling: AutoScalingPolicy,
}

impl QueueConfiguration {
    /// Soft-threshold configuration with observability and auto-scaling off
    pub fn new(max_queue_depth: usize, batch_size: usize) -> QueueResult<Self> {
        QueueSettings {
            max_queue_depth,
            batch_size,
            ..QueueSettings::default()
        }
        .validate()
    }

    pub fn max_queue_depth(&self) -> usize {
        self.max_queue_depth
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn enable_observability(&self) -> bool {
        self.enable_observability
    }

    pub fn enable_auto_scaling(&self) -> bool {
        self.enable_auto_scaling
    }

    pub fn capacity_policy(&self) -> CapacityPolicy {
        self.capacity_policy
    }

    pub fn auto_scaling(&self) -> &AutoScalingPolicy {
        &self.auto_scaling
    }
}

impl TryFrom<QueueSettings> for QueueConfiguration {
    type Error = QueueError;

    fn try_from(settings: QueueSettings) -> QueueResult<Self> {
        settings.validate()
    }
}
