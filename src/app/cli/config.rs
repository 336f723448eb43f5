//! TOML configuration file loading for the simulator
//!
//! The file has three optional tables:
//!
//! ```toml
//! [queue]
//! max_queue_depth = 500
//! capacity_policy = "hard_reject"
//!
//! [simulation]
//! producers = 8
//! sink = "channel"
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! Command line values override the file; the file overrides defaults.

use super::args::Args;
use crate::queue::api::{CapacityPolicy, QueueError, QueueResult, QueueSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PRODUCERS: usize = 4;
pub const DEFAULT_EVENTS_PER_PRODUCER: usize = 1000;
pub const DEFAULT_DRAIN_INTERVAL_MS: u64 = 5;
pub const DEFAULT_THROTTLE_PAUSE_MS: u64 = 1;

/// Observability sink used by the simulator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Reporting disabled
    #[default]
    None,
    /// Every report written to the log
    Log,
    /// State changes streamed to an in-process subscriber
    Channel,
}

/// The `[simulation]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub producers: usize,
    pub events_per_producer: usize,
    pub drain_interval_ms: u64,
    /// Producers pause while the backpressure signal is raised
    pub throttle: bool,
    pub throttle_pause_ms: u64,
    pub sink: SinkKind,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            producers: DEFAULT_PRODUCERS,
            events_per_producer: DEFAULT_EVENTS_PER_PRODUCER,
            drain_interval_ms: DEFAULT_DRAIN_INTERVAL_MS,
            throttle: true,
            throttle_pause_ms: DEFAULT_THROTTLE_PAUSE_MS,
            sink: SinkKind::None,
        }
    }
}

/// The `[logging]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
    pub file: Option<PathBuf>,
    pub color: Option<bool>,
}

/// Everything the simulator reads from its configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub queue: QueueSettings,
    pub simulation: SimulationSettings,
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// `<config dir>/EventQueue/eventqueue.toml`, when a config dir exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("EventQueue").join("eventqueue.toml"))
    }

    pub fn from_toml_str(contents: &str) -> QueueResult<Self> {
        toml::from_str(contents)
            .map_err(|e| QueueError::invalid(format!("could not parse configuration: {}", e)))
    }

    pub async fn load(path: &Path) -> QueueResult<Self> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            QueueError::invalid(format!(
                "could not read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            QueueError::InvalidConfiguration { message } => {
                QueueError::invalid(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    /// Locate and load the configuration
    ///
    /// An explicitly named file must exist. Without one, the default location
    /// is used when present and built-in defaults otherwise.
    pub async fn discover(config_file: Option<&Path>) -> QueueResult<Self> {
        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(QueueError::invalid(format!(
                        "the specified configuration file does not exist: {}",
                        path.display()
                    )));
                }
                Self::load(path).await
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => {
                    log::debug!("Using default configuration {}", path.display());
                    Self::load(&path).await
                }
                _ => Ok(Self::default()),
            },
        }
    }

    /// Layer command line values over the loaded configuration
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(depth) = args.max_depth {
            self.queue.max_queue_depth = depth;
        }
        if let Some(batch) = args.batch_size {
            self.queue.batch_size = batch;
        }
        if args.hard_reject {
            self.queue.capacity_policy = CapacityPolicy::HardReject;
        }
        if args.auto_scale {
            self.queue.enable_auto_scaling = true;
        }

        if let Some(producers) = args.producers {
            self.simulation.producers = producers;
        }
        if let Some(events) = args.events_per_producer {
            self.simulation.events_per_producer = events;
        }
        if let Some(interval) = args.drain_interval_ms {
            self.simulation.drain_interval_ms = interval as u64;
        }
        if args.no_throttle {
            self.simulation.throttle = false;
        }
        if let Some(sink) = args.sink {
            self.simulation.sink = sink;
        }
        // Choosing a sink turns reporting on
        if self.simulation.sink != SinkKind::None {
            self.queue.enable_observability = true;
        }

        if args.log_level.is_some() {
            self.logging.level = args.log_level.clone();
        }
        if args.log_format.is_some() {
            self.logging.format = args.log_format.clone();
        }
        match args.log_file.as_deref() {
            Some(path) if path == Path::new("none") || path == Path::new("-") => {
                self.logging.file = None
            }
            Some(path) => self.logging.file = Some(path.to_path_buf()),
            None => {}
        }
        if let Some(color) = args.color_choice() {
            self.logging.color = Some(color);
        }
    }
}
