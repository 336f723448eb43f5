//! EventQueueCore - buffered events with a cached backpressure signal
//!
//! All state lives behind one mutex and every operation holds it for a
//! bounded, non-blocking critical section. Reports for the observability sink
//! are collected while the lock is held and delivered after it is released,
//! so a slow sink delays only the caller that produced the report.
//!
//! The backpressure flag is evaluated at three points: after every enqueue
//! attempt, after every drain, and on an explicit
//! `should_activate_backpressure()` call. Only enqueue and drain advance the
//! auto-scaler, so the explicit call is a pure re-read of the predicate.
//! `stats()` and `is_backpressure_active()` return the cached value and never
//! evaluate.
//!
//! A poisoned lock fails every operation that returns a `QueueResult`. The
//! plain accessors cannot fail: `len()`, `is_empty()` and
//! `current_max_depth()` read the last state written before the panic, and
//! `is_backpressure_active()` reports `true` so producers back off.

use crate::core::sync::handle_mutex_poison;
use crate::observability::api::{Attributes, ObservabilityPort, ReportKind};
use crate::queue::config::{CapacityPolicy, QueueConfiguration, QueueSettings};
use crate::queue::error::{QueueError, QueueResult};
use crate::queue::event::Event;
use crate::queue::scaling::{AutoScaler, ScalingDecision};
use crate::queue::stats::{BackpressureState, StatsSnapshot};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

struct QueueState {
    buffer: VecDeque<Event>,
    backpressure_active: bool,
    current_max_depth: usize,
    scaler: AutoScaler,
    buffered_bytes: usize,
    peak_size: usize,
    total_enqueued: u64,
    total_rejected: u64,
    total_drained: u64,
    scale_ups: u64,
    scale_downs: u64,
}

impl QueueState {
    fn new(max_depth: usize) -> Self {
        Self {
            buffer: VecDeque::new(),
            backpressure_active: false,
            current_max_depth: max_depth,
            scaler: AutoScaler::default(),
            buffered_bytes: 0,
            peak_size: 0,
            total_enqueued: 0,
            total_rejected: 0,
            total_drained: 0,
            scale_ups: 0,
            scale_downs: 0,
        }
    }

    // A hard-reject buffer can never exceed its depth, so full counts as
    // overloaded there.
    fn is_overloaded(&self, policy: CapacityPolicy) -> bool {
        match policy {
            CapacityPolicy::SoftThreshold => self.buffer.len() > self.current_max_depth,
            CapacityPolicy::HardReject => self.buffer.len() >= self.current_max_depth,
        }
    }

    fn size_attributes(&self) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("size".to_string(), json!(self.buffer.len()));
        attributes.insert("max_queue_depth".to_string(), json!(self.current_max_depth));
        attributes
    }
}

/// Where an evaluation comes from; only mutations advance the auto-scaler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EvaluationPoint {
    Mutation,
    Explicit,
}

/// Reports gathered under the lock; building attributes is skipped
/// entirely when observability is off
struct PendingReports {
    enabled: bool,
    reports: Vec<(ReportKind, Attributes)>,
}

impl PendingReports {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            reports: Vec::new(),
        }
    }

    fn record(&mut self, kind: ReportKind, attributes: impl FnOnce() -> Attributes) {
        if self.enabled {
            self.reports.push((kind, attributes()));
        }
    }
}

/// In-process event queue with adaptive backpressure
///
/// # Example
///
/// ```rust
/// use eventqueue::observability::api::NoopObservability;
/// use eventqueue::queue::api::{Event, EventQueueCore, QueueConfiguration};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let queue = EventQueueCore::new(
///     Arc::new(NoopObservability),
///     QueueConfiguration::new(5, 2)?,
/// );
///
/// for i in 0..6 {
///     queue.enqueue(Event::from_json("tick", json!({"i": i}))).await?;
/// }
/// assert!(queue.is_backpressure_active());
///
/// let batch = queue.drain_batch().await?;
/// assert_eq!(batch.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct EventQueueCore {
    config: QueueConfiguration,
    /// `None` when observability is disabled; the sink is then never called
    observability: Option<Arc<dyn ObservabilityPort>>,
    state: Mutex<QueueState>,
    report_failures: AtomicU64,
}

impl EventQueueCore {
    pub fn new(observability: Arc<dyn ObservabilityPort>, config: QueueConfiguration) -> Self {
        let observability = if config.enable_observability() {
            Some(observability)
        } else {
            None
        };

        log::debug!(
            "Creating event queue: max_depth={}, batch_size={}, policy={}, auto_scaling={}",
            config.max_queue_depth(),
            config.batch_size(),
            config.capacity_policy(),
            config.enable_auto_scaling()
        );

        Self {
            state: Mutex::new(QueueState::new(config.max_queue_depth())),
            config,
            observability,
            report_failures: AtomicU64::new(0),
        }
    }

    /// Validate settings and build the queue in one step
    pub fn from_settings(
        observability: Arc<dyn ObservabilityPort>,
        settings: &QueueSettings,
    ) -> QueueResult<Self> {
        Ok(Self::new(observability, settings.validate()?))
    }

    pub fn configuration(&self) -> &QueueConfiguration {
        &self.config
    }

    fn lock_state(&self) -> QueueResult<MutexGuard<'_, QueueState>> {
        handle_mutex_poison(self.state.lock(), |message| QueueError::Internal { message })
    }

    /// Append an event to the tail of the queue
    ///
    /// Under `SoftThreshold` the event is always accepted. Under `HardReject`
    /// an event arriving at a full queue is refused with `QueueFull`; the
    /// refusal is still an evaluation point.
    pub async fn enqueue(&self, event: Event) -> QueueResult<()> {
        let mut pending = PendingReports::new(self.observability.is_some());

        let outcome = {
            let mut state = self.lock_state()?;
            let policy = self.config.capacity_policy();

            if policy == CapacityPolicy::HardReject
                && state.buffer.len() >= state.current_max_depth
            {
                state.total_rejected += 1;
                let max_size = state.current_max_depth;
                log::trace!(
                    "Rejected {} at capacity {}",
                    event.event_type(),
                    max_size
                );
                pending.record(ReportKind::Rejected, || {
                    let mut attributes = state.size_attributes();
                    attributes.insert("event_type".to_string(), json!(event.event_type()));
                    attributes
                });
                self.evaluate(&mut state, &mut pending, EvaluationPoint::Mutation);
                Err(QueueError::QueueFull { max_size })
            } else {
                state.buffered_bytes += event.size_hint();
                state.total_enqueued += 1;
                state.buffer.push_back(event);
                state.peak_size = state.peak_size.max(state.buffer.len());
                pending.record(ReportKind::Enqueued, || {
                    let mut attributes = state.size_attributes();
                    if let Some(event) = state.buffer.back() {
                        attributes.insert("event_type".to_string(), json!(event.event_type()));
                    }
                    attributes
                });
                self.evaluate(&mut state, &mut pending, EvaluationPoint::Mutation);
                Ok(())
            }
        };

        self.deliver(pending).await;
        outcome
    }

    /// Enqueue and report acceptance as a bool
    ///
    /// Returns `false` only when a hard-reject queue refused the event.
    /// Internal errors are logged and reported as not accepted.
    pub async fn offer(&self, event: Event) -> bool {
        match self.enqueue(event).await {
            Ok(()) => true,
            Err(QueueError::QueueFull { .. }) => false,
            Err(e) => {
                log::error!("Event queue offer failed: {}", e);
                false
            }
        }
    }

    /// Re-evaluate backpressure now and cache the result
    ///
    /// Calling it again without an intervening enqueue or drain returns the
    /// same value and never changes the buffer or the depth. Explicit calls
    /// do not count towards auto-scaling windows.
    pub async fn should_activate_backpressure(&self) -> QueueResult<bool> {
        let mut pending = PendingReports::new(self.observability.is_some());
        let active = {
            let mut state = self.lock_state()?;
            self.evaluate(&mut state, &mut pending, EvaluationPoint::Explicit)
        };
        self.deliver(pending).await;
        Ok(active)
    }

    /// Remove up to `limit` events from the head, oldest first
    ///
    /// Never waits for events; an empty queue yields an empty batch.
    pub async fn drain(&self, limit: usize) -> QueueResult<Vec<Event>> {
        let mut pending = PendingReports::new(self.observability.is_some());

        let batch = {
            let mut state = self.lock_state()?;
            let count = limit.min(state.buffer.len());
            let batch: Vec<Event> = state.buffer.drain(..count).collect();

            let drained_bytes: usize = batch.iter().map(Event::size_hint).sum();
            state.buffered_bytes = state.buffered_bytes.saturating_sub(drained_bytes);
            state.total_drained += batch.len() as u64;

            if !batch.is_empty() {
                log::trace!("Drained {} event(s), {} remain", batch.len(), state.buffer.len());
                pending.record(ReportKind::Drained, || {
                    let mut attributes = state.size_attributes();
                    attributes.insert("requested".to_string(), json!(limit));
                    attributes.insert("returned".to_string(), json!(batch.len()));
                    attributes
                });
            }

            self.evaluate(&mut state, &mut pending, EvaluationPoint::Mutation);
            batch
        };

        self.deliver(pending).await;
        Ok(batch)
    }

    /// Drain up to the configured batch size
    pub async fn drain_batch(&self) -> QueueResult<Vec<Event>> {
        self.drain(self.config.batch_size()).await
    }

    /// Drain everything currently buffered
    pub async fn drain_all(&self) -> QueueResult<Vec<Event>> {
        self.drain(usize::MAX).await
    }

    /// Snapshot of the queue; the backpressure flag is the cached value
    pub fn stats(&self) -> QueueResult<StatsSnapshot> {
        let state = self.lock_state()?;
        Ok(StatsSnapshot {
            size: state.buffer.len(),
            backpressure_active: state.backpressure_active,
            max_queue_depth: state.current_max_depth,
            batch_size: self.config.batch_size(),
            configured_max_depth: self.config.max_queue_depth(),
            capacity_policy: self.config.capacity_policy(),
            total_enqueued: state.total_enqueued,
            total_rejected: state.total_rejected,
            total_drained: state.total_drained,
            peak_size: state.peak_size,
            buffered_bytes: state.buffered_bytes,
            scale_ups: state.scale_ups,
            scale_downs: state.scale_downs,
            report_failures: self.report_failures.load(Ordering::Relaxed),
        })
    }

    /// Cached backpressure flag, for producers throttling themselves
    ///
    /// A poisoned queue reports backpressure so producers back off.
    pub fn is_backpressure_active(&self) -> bool {
        self.state
            .lock()
            .map(|state| state.backpressure_active)
            .unwrap_or(true)
    }

    pub fn state(&self) -> BackpressureState {
        BackpressureState::from(self.is_backpressure_active())
    }

    /// Number of buffered events
    ///
    /// Still counts the buffer after poisoning, so a `while !is_empty()`
    /// flush loop reaches the failing `drain` instead of stopping early.
    pub fn len(&self) -> usize {
        self.read_state(|state| state.buffer.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Effective depth after any auto-scaling
    pub fn current_max_depth(&self) -> usize {
        self.read_state(|state| state.current_max_depth)
    }

    // Read-only view that survives poisoning; mutations go through lock_state
    fn read_state<R>(&self, read: impl FnOnce(&QueueState) -> R) -> R {
        let guard = self.state.lock().unwrap_or_else(|poisoned| {
            log::warn!("Reading event queue state after a panic poisoned its lock");
            poisoned.into_inner()
        });
        read(&guard)
    }

    /// Recompute the flag, apply auto-scaling and cache the result
    fn evaluate(
        &self,
        state: &mut QueueState,
        pending: &mut PendingReports,
        point: EvaluationPoint,
    ) -> bool {
        let policy = self.config.capacity_policy();
        let mut active = state.is_overloaded(policy);

        if self.config.enable_auto_scaling() && point == EvaluationPoint::Mutation {
            let decision = state.scaler.observe(
                self.config.auto_scaling(),
                self.config.max_queue_depth(),
                state.current_max_depth,
                state.buffer.len(),
                active,
            );

            if let ScalingDecision::Resize {
                from,
                to,
                direction,
            } = decision
            {
                state.current_max_depth = to;
                if to > from {
                    state.scale_ups += 1;
                } else {
                    state.scale_downs += 1;
                }
                log::info!(
                    "Event queue depth {}: {} -> {} (size {})",
                    direction,
                    from,
                    to,
                    state.buffer.len()
                );
                pending.record(ReportKind::Resized, || {
                    let mut attributes = state.size_attributes();
                    attributes.insert("from".to_string(), json!(from));
                    attributes.insert("to".to_string(), json!(to));
                    attributes.insert("direction".to_string(), json!(direction.to_string()));
                    attributes
                });
                active = state.is_overloaded(policy);
            }
        }

        let previous = std::mem::replace(&mut state.backpressure_active, active);
        if previous != active {
            let new_state = BackpressureState::from(active);
            log::debug!(
                "Backpressure {} -> {} (size {}, depth {})",
                BackpressureState::from(previous),
                new_state,
                state.buffer.len(),
                state.current_max_depth
            );
            pending.record(ReportKind::BackpressureChanged, || {
                let mut attributes = state.size_attributes();
                attributes.insert("active".to_string(), json!(active));
                attributes.insert("state".to_string(), json!(new_state.to_string()));
                attributes
            });
        }

        active
    }

    /// Poison the state lock the way a panicking holder would
    #[cfg(test)]
    pub(crate) fn poison_state_lock(&self) {
        std::thread::scope(|scope| {
            let holder = scope.spawn(|| {
                let _guard = self.state.lock();
                panic!("panic while holding the event queue lock");
            });
            assert!(holder.join().is_err());
        });
    }

    async fn deliver(&self, pending: PendingReports) {
        let Some(sink) = &self.observability else {
            return;
        };

        for (kind, attributes) in pending.reports {
            if let Err(e) = sink.report(kind.as_ref(), attributes).await {
                self.report_failures.fetch_add(1, Ordering::Relaxed);
                log::warn!(
                    "Observability sink '{}' failed to record {}: {}",
                    sink.sink_name(),
                    kind,
                    e
                );
            }
        }
    }
}
