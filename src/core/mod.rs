//! Core infrastructure shared by the queue, the sinks and the binary

pub mod error_handling;
pub mod logging;
pub mod styles;
pub mod sync;
pub mod validation;
