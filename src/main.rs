//! pv-sim entry point: CLI wiring, run, reports, and exports.

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;

use pv_sim::cli::Args;
use pv_sim::config::ScenarioConfig;
use pv_sim::io::export::{export_seasonal_csv, export_summary_json, export_timesteps_csv};
use pv_sim::logging;
use pv_sim::runner::{RunError, run_scenario};

fn load_scenario(args: &Args) -> Result<ScenarioConfig> {
    let mut scenario = match &args.scenario {
        Some(path) => ScenarioConfig::from_toml_file(path)?,
        None => ScenarioConfig::from_preset(args.preset_name())?,
    };
    if let Some(seed) = args.seed {
        scenario.simulation.seed = seed;
    }
    Ok(scenario)
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();
    let scenario = load_scenario(&args)?;

    let output = match run_scenario(&scenario) {
        Ok(output) => output,
        Err(RunError::InvalidConfig(errors)) => {
            for e in &errors {
                eprintln!("{e}");
            }
            bail!("scenario has {} invalid field(s)", errors.len());
        }
        Err(e) => return Err(e.into()),
    };

    if args.print_steps {
        for r in &output.results {
            println!("{r}");
        }
        println!();
    }
    println!("{}", output.seasons);
    println!();
    println!("{}", output.annual);

    if let Some(path) = &args.timesteps_out {
        export_timesteps_csv(&output.results, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "timesteps written");
    }
    if let Some(path) = &args.seasons_out {
        export_seasonal_csv(&output.seasons, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "seasonal table written");
    }
    if let Some(path) = &args.summary_out {
        export_summary_json(&output.summary(), path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "summary written");
    }

    #[cfg(feature = "api")]
    if args.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(pv_sim::api::AppState::from(output));
        let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
        let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
        rt.block_on(pv_sim::api::serve(state, addr))
            .with_context(|| format!("API server on {addr} failed"))?;
    }

    Ok(())
}
