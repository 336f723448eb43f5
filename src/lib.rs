pub mod app;
pub mod core;
pub mod observability;
pub mod queue;

include!(concat!(env!("OUT_DIR"), "/version.rs"));
