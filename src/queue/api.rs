//! Public API for the event queue
//!
//! External modules should import from here rather than directly from
//! internal modules. See the module documentation for the evaluation model.

// Core queue
pub use crate::queue::event_queue::EventQueueCore;

// Events and their construction
pub use crate::queue::event::{DefaultEventFactory, Event, EventFactory, SourceTaggingFactory};

// Configuration
pub use crate::queue::config::{
    AutoScalingPolicy, AutoScalingSettings, CapacityPolicy, QueueConfiguration, QueueSettings,
};

// Statistics
pub use crate::queue::scaling::ScalingDirection;
pub use crate::queue::stats::{BackpressureState, StatsSnapshot};

// Error handling
pub use crate::queue::error::{QueueError, QueueResult};
