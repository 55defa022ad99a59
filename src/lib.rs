//! PV + battery + grid dispatch simulator with seasonal coverage reports.

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
/// CSV import and CSV/JSON export.
pub mod io;
pub mod logging;
pub mod runner;
pub mod series;
/// Dispatch policy, simulation loop, and seasonal aggregation.
pub mod sim;
