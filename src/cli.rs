//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Hourly PV + battery + grid dispatch with seasonal coverage reports.
#[derive(Debug, Parser)]
#[command(name = "pv-sim", version, about)]
#[command(
    long_about = "Simulates a building's PV arrays, battery and grid connection step by step,\n\
    then reports how PV yield was used and how demand was met per season.\n\
    \nExamples:\n  \
    pv-sim                                   # baseline preset\n  \
    pv-sim --preset small_battery --seed 7\n  \
    pv-sim --scenario scenarios/csv_inputs.toml --timesteps-out steps.csv"
)]
pub struct Args {
    /// Load the scenario from a TOML file.
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Use a built-in preset (baseline, small_battery, reserve_floor).
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Override the scenario's random seed.
    #[arg(long, env = "PV_SIM_SEED")]
    pub seed: Option<u64>,

    /// Write the per-timestep result table as CSV.
    #[arg(long, value_name = "PATH")]
    pub timesteps_out: Option<PathBuf>,

    /// Write the seasonal table as CSV.
    #[arg(long, value_name = "PATH")]
    pub seasons_out: Option<PathBuf>,

    /// Write the run summary as JSON.
    #[arg(long, value_name = "PATH")]
    pub summary_out: Option<PathBuf>,

    /// Print every timestep before the reports.
    #[arg(long)]
    pub print_steps: bool,

    /// Serve the results over HTTP after the run.
    #[cfg(feature = "api")]
    #[arg(long)]
    pub serve: bool,

    /// API server port.
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 3000, requires = "serve")]
    pub port: u16,
}

impl Args {
    /// Preset to use when no scenario file is given.
    pub fn preset_name(&self) -> &str {
        self.preset.as_deref().unwrap_or("baseline")
    }
}
