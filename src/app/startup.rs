//! Simulator startup
//!
//! Order matters: configuration is resolved first (file, then command line)
//! so that logging can be initialised from it, and only then is the queue
//! built. Configuration errors found before logging exists go to stderr.

use super::cli::args::Args;
use super::cli::config::{AppConfig, SinkKind};
use super::cli::display::display_summary;
use super::simulation::run_simulation;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::observability::api::{
    ChannelObservability, LogObservability, NoopObservability, ObservabilityError,
    ObservabilityPort, ReportFilter,
};
use crate::queue::api::EventQueueCore;
use clap::Parser;
use serde_json::Value;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_INTERRUPTED: i32 = 130;

const MONITOR_ID: &str = "simulator-monitor";

/// Parse arguments, load configuration, start logging and run the simulator
///
/// Returns the process exit code.
pub async fn startup() -> i32 {
    let args = Args::parse();

    let mut config = match AppConfig::discover(args.config_file.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_FAILURE;
        }
    };
    config.apply_args(&args);

    let use_color = config
        .logging
        .color
        .unwrap_or_else(|| std::io::stdout().is_terminal());
    let log_file = config.logging.file.as_ref().map(|p| p.to_string_lossy().into_owned());
    if let Err(e) = init_logging(
        config.logging.level.as_deref(),
        config.logging.format.as_deref(),
        log_file.as_deref(),
        use_color,
    ) {
        eprintln!("Error: could not start logging: {}", e);
        return EXIT_FAILURE;
    }

    log::info!(
        "eventqueue {} ({} {}, built {}) starting",
        env!("CARGO_PKG_VERSION"),
        crate::GIT_HASH,
        crate::BUILD_PROFILE,
        crate::BUILD_TIME
    );
    log::debug!("Configuration: {:?}", config);

    run(&config, use_color, args.json).await
}

/// Build the queue from resolved configuration and run one simulation
pub async fn run(config: &AppConfig, use_color: bool, as_json: bool) -> i32 {
    let sink = match ReportSink::build(config.simulation.sink) {
        Ok(sink) => sink,
        Err(e) => {
            log_error_with_context(&e, "Observability setup");
            return EXIT_FAILURE;
        }
    };

    let queue = match EventQueueCore::from_settings(sink.port(), &config.queue) {
        Ok(queue) => Arc::new(queue),
        Err(e) => {
            log_error_with_context(&e, "Queue construction");
            return EXIT_FAILURE;
        }
    };
    log::info!(
        "Queue ready: depth {}, batch {}, policy {}, auto-scaling {}, sink {:?}",
        queue.configuration().max_queue_depth(),
        queue.configuration().batch_size(),
        queue.configuration().capacity_policy(),
        queue.configuration().enable_auto_scaling(),
        config.simulation.sink
    );

    let outcome = tokio::select! {
        result = run_simulation(Arc::clone(&queue), &config.simulation) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let code = match outcome {
        Some(Ok(report)) => match display_summary(&report, use_color, as_json) {
            Ok(()) => EXIT_OK,
            Err(e) => {
                log::error!("{}", e);
                EXIT_FAILURE
            }
        },
        Some(Err(e)) => {
            log_error_with_context(&e, "Simulation");
            EXIT_FAILURE
        }
        None => {
            log::warn!("Interrupted, flushing {} buffered events", queue.len());
            match queue.drain_all().await {
                Ok(flushed) => log::info!("Flushed {} events", flushed.len()),
                Err(e) => log_error_with_context(&e, "Flush"),
            }
            EXIT_INTERRUPTED
        }
    };

    sink.finish().await;
    code
}

/// The sink handed to the queue, plus the monitor task for channel sinks
struct ReportSink {
    port: Arc<dyn ObservabilityPort>,
    monitor: Option<(Arc<ChannelObservability>, JoinHandle<u64>)>,
}

impl ReportSink {
    fn build(kind: SinkKind) -> Result<Self, ObservabilityError> {
        match kind {
            SinkKind::None => Ok(Self {
                port: Arc::new(NoopObservability),
                monitor: None,
            }),
            SinkKind::Log => Ok(Self {
                port: Arc::new(LogObservability::default()),
                monitor: None,
            }),
            SinkKind::Channel => {
                let channel = Arc::new(ChannelObservability::new());
                let mut receiver = channel.subscribe(
                    MONITOR_ID.to_string(),
                    ReportFilter::StateChanges,
                    "startup".to_string(),
                )?;
                let handle = tokio::spawn(async move {
                    let mut seen = 0u64;
                    while let Some(report) = receiver.recv().await {
                        seen += 1;
                        log::info!(
                            "[monitor] {} {}",
                            report.name,
                            Value::Object(report.attributes)
                        );
                    }
                    seen
                });
                Ok(Self {
                    port: channel.clone(),
                    monitor: Some((channel, handle)),
                })
            }
        }
    }

    fn port(&self) -> Arc<dyn ObservabilityPort> {
        Arc::clone(&self.port)
    }

    /// Close the monitor subscription and wait for it to drain
    async fn finish(self) {
        let Some((channel, handle)) = self.monitor else {
            return;
        };
        if let Err(e) = channel.unsubscribe(MONITOR_ID) {
            log::warn!("Could not close monitor subscription: {}", e);
            return;
        }
        match handle.await {
            Ok(seen) => log::info!("Monitor observed {} state changes", seen),
            Err(e) => log::warn!("Monitor task failed: {}", e),
        }
    }
}
