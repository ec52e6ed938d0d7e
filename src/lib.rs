//! weatherdash library
//!
//! Weather data access, forecast aggregation and the dashboard state machine.
//! The binary wires these to a terminal; integration tests use them directly.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod fetch;
pub mod forecast;
pub mod history;
pub mod logging;
pub mod ui;

#[cfg(test)]
mod test_support;
