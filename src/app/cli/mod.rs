//! Command line surface of the simulator: arguments, configuration file
//! loading and summary display

pub mod args;
pub mod config;
pub mod display;

#[cfg(test)]
mod tests;
