//! Burst simulation driving the queue with concurrent producers
//!
//! Producers push events as fast as they can, pausing while the queue raises
//! its backpressure signal (unless throttling is off). A single consumer
//! drains one batch per tick. When every producer has finished, the consumer
//! keeps ticking until the buffer is empty. If the consumer stops early, a
//! throttled producer gives up instead of waiting on a signal nobody clears.

use crate::app::cli::config::SimulationSettings;
use crate::queue::api::{
    Event, EventFactory, EventQueueCore, QueueError, QueueResult, SourceTaggingFactory,
    StatsSnapshot,
};
use futures::future::join_all;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What one producer managed to do
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProducerOutcome {
    pub accepted: u64,
    pub rejected: u64,
    /// Pauses taken because the backpressure signal was raised
    pub throttle_waits: u64,
}

impl ProducerOutcome {
    fn merge(&mut self, other: &ProducerOutcome) {
        self.accepted += other.accepted;
        self.rejected += other.rejected;
        self.throttle_waits += other.throttle_waits;
    }
}

/// Consumer side totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsumerOutcome {
    pub drained: u64,
    /// Non-empty drains
    pub batches: u64,
    pub largest_batch: usize,
}

/// Result of a complete simulation run
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub producers: usize,
    pub events_per_producer: usize,
    pub throttled: bool,
    pub produced: ProducerOutcome,
    pub consumed: ConsumerOutcome,
    pub elapsed_ms: u64,
    pub final_stats: StatsSnapshot,
}

impl SimulationReport {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    /// Accepted events per second over the whole run
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.produced.accepted as f64 / secs
        } else {
            0.0
        }
    }
}

/// Run producers and the consumer to completion
pub async fn run_simulation(
    queue: Arc<EventQueueCore>,
    settings: &SimulationSettings,
) -> QueueResult<SimulationReport> {
    log::info!(
        "Simulating {} producers x {} events (throttle: {})",
        settings.producers,
        settings.events_per_producer,
        settings.throttle
    );
    let started = Instant::now();
    let producers_done = Arc::new(AtomicBool::new(false));
    let consumer_stopped = Arc::new(AtomicBool::new(false));

    let consumer = tokio::spawn(consume(
        Arc::clone(&queue),
        Duration::from_millis(settings.drain_interval_ms.max(1)),
        Arc::clone(&producers_done),
        StopSignal(Arc::clone(&consumer_stopped)),
    ));

    let handles: Vec<_> = (0..settings.producers)
        .map(|id| {
            let queue = Arc::clone(&queue);
            let settings = settings.clone();
            let consumer_stopped = Arc::clone(&consumer_stopped);
            tokio::spawn(async move { produce(id, queue, &settings, &consumer_stopped).await })
        })
        .collect();

    let mut produced = ProducerOutcome::default();
    let mut first_error = None;
    for (id, result) in join_all(handles).await.into_iter().enumerate() {
        match result {
            Ok(Ok(outcome)) => {
                log::debug!("Producer {} finished: {:?}", id, outcome);
                produced.merge(&outcome);
            }
            Ok(Err(e)) => {
                log::error!("Producer {} failed: {}", id, e);
                first_error.get_or_insert(e);
            }
            Err(e) => {
                log::error!("Producer {} panicked: {}", id, e);
                first_error.get_or_insert(QueueError::Internal {
                    message: format!("producer {} panicked: {}", id, e),
                });
            }
        }
    }
    producers_done.store(true, Ordering::Release);

    let consumed = consumer.await.map_err(|e| QueueError::Internal {
        message: format!("consumer task failed: {}", e),
    })??;

    if let Some(e) = first_error {
        return Err(e);
    }

    let report = SimulationReport {
        producers: settings.producers,
        events_per_producer: settings.events_per_producer,
        throttled: settings.throttle,
        produced,
        consumed,
        elapsed_ms: started.elapsed().as_millis() as u64,
        final_stats: queue.stats()?,
    };
    log::info!(
        "Simulation finished in {} ms: {} accepted, {} rejected, {} drained",
        report.elapsed_ms,
        report.produced.accepted,
        report.produced.rejected,
        report.consumed.drained
    );
    Ok(report)
}

/// Raises its flag when dropped, so the consumer signals on every exit path
struct StopSignal(Arc<AtomicBool>);

impl Drop for StopSignal {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

async fn produce(
    id: usize,
    queue: Arc<EventQueueCore>,
    settings: &SimulationSettings,
    consumer_stopped: &AtomicBool,
) -> QueueResult<ProducerOutcome> {
    let factory = SourceTaggingFactory::new(format!("producer-{}", id));
    let pause = Duration::from_millis(settings.throttle_pause_ms);
    let mut outcome = ProducerOutcome::default();

    for seq in 0..settings.events_per_producer {
        if settings.throttle {
            while queue.is_backpressure_active() {
                // Nothing will drain the queue any more
                if consumer_stopped.load(Ordering::Acquire) {
                    return Err(QueueError::Internal {
                        message: format!(
                            "consumer stopped while producer {} was throttled",
                            id
                        ),
                    });
                }
                outcome.throttle_waits += 1;
                pause_for(pause).await;
            }
        }

        match queue.enqueue(burst_event(&factory, id, seq)).await {
            Ok(()) => outcome.accepted += 1,
            Err(QueueError::QueueFull { .. }) => {
                outcome.rejected += 1;
                pause_for(pause).await;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(outcome)
}

async fn consume(
    queue: Arc<EventQueueCore>,
    period: Duration,
    producers_done: Arc<AtomicBool>,
    _stopped: StopSignal,
) -> QueueResult<ConsumerOutcome> {
    let mut ticker = tokio::time::interval(period);
    let mut outcome = ConsumerOutcome::default();

    loop {
        ticker.tick().await;
        // Read before draining so nothing enqueued after the flag is missed
        let finished = producers_done.load(Ordering::Acquire);

        let batch = queue.drain_batch().await?;
        if !batch.is_empty() {
            outcome.batches += 1;
            outcome.drained += batch.len() as u64;
            outcome.largest_batch = outcome.largest_batch.max(batch.len());
        } else if finished {
            break;
        }
    }

    log::debug!("Consumer finished: {:?}", outcome);
    Ok(outcome)
}

fn burst_event(factory: &dyn EventFactory, producer: usize, seq: usize) -> Event {
    let mut body = Map::new();
    body.insert("producer".to_string(), json!(producer));
    body.insert("seq".to_string(), json!(seq));
    body.insert("payload".to_string(), Value::String(format!("burst-{}-{}", producer, seq)));
    factory.create("burst.tick", body)
}

async fn pause_for(pause: Duration) {
    if pause.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(pause).await;
    }
}
