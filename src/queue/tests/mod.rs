//! Test modules for the event queue
//!
//! Tests are organized by functional area; shared sinks and builders live in
//! `support`.

mod concurrent;
mod config;
mod support;
