//! Command line arguments for the burst simulator
//!
//! Every option is optional: anything left unset falls back to the
//! configuration file, then to the built-in defaults.

use super::config::SinkKind;
use crate::core::validation::validate_positive_int;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "eventqueue")]
#[command(about = "Burst simulator for the backpressure-aware event queue")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Force colored output (overrides TTY detection)
    #[arg(long = "color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", conflicts_with = "color")]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Number of concurrent producers
    #[arg(short = 'p', long = "producers", value_name = "N", value_parser = validate_positive_int)]
    pub producers: Option<usize>,

    /// Events emitted by each producer
    #[arg(short = 'n', long = "events", value_name = "N", value_parser = validate_positive_int)]
    pub events_per_producer: Option<usize>,

    /// Queue depth that triggers backpressure
    #[arg(short = 'd', long = "max-depth", value_name = "N", value_parser = validate_positive_int)]
    pub max_depth: Option<usize>,

    /// Events handed to the consumer per drain
    #[arg(short = 'b', long = "batch-size", value_name = "N", value_parser = validate_positive_int)]
    pub batch_size: Option<usize>,

    /// Milliseconds between consumer drains
    #[arg(short = 'i', long = "drain-interval-ms", value_name = "MS", value_parser = validate_positive_int)]
    pub drain_interval_ms: Option<usize>,

    /// Refuse events once the queue is full instead of only signalling
    #[arg(long = "hard-reject")]
    pub hard_reject: bool,

    /// Let the queue adjust its depth under sustained load
    #[arg(long = "auto-scale")]
    pub auto_scale: bool,

    /// Producers ignore the backpressure signal
    #[arg(long = "no-throttle")]
    pub no_throttle: bool,

    /// Where queue reports go
    #[arg(short = 's', long = "sink", value_name = "SINK", value_enum)]
    pub sink: Option<SinkKind>,

    /// Print the summary as JSON instead of a table
    #[arg(long = "json")]
    pub json: bool,
}

impl Args {
    /// Explicit color choice, `None` when it should follow the terminal
    pub fn color_choice(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            None
        }
    }
}
