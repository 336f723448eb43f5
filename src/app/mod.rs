//! Application module

pub mod cli;
pub mod simulation;
pub mod startup;
