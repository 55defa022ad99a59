//! End-to-end run: scenario config to series, simulation, and reports.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ArraySettings, ConfigError, LoadSettings, ScenarioConfig, SeriesSource};
use crate::io::import::{self, ImportError};
use crate::series::synthetic::{LoadProfile, SolarProfile};
use crate::series::{Series, align_series, combine_arrays};
use crate::sim::{
    AnnualReport, BatteryConfig, SeasonalReport, SimError, Simulator, TimestepInput,
    TimestepResult, ValidationError,
};

const LOAD_SERIES: &str = "household load";
const PV_SERIES: &str = "PV generation";

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Reasons a scenario run stops before producing results.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid scenario: {}", join_errors(.0))]
    InvalidConfig(Vec<ConfigError>),

    #[error("failed to import {series}: {source}")]
    Import {
        series: String,
        #[source]
        source: ImportError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Simulation(#[from] SimError),
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub battery: BatteryConfig,
    /// One row per input timestep, in input order.
    pub results: Vec<TimestepResult>,
    pub seasons: SeasonalReport,
    pub annual: AnnualReport,
}

/// Serializable run summary: battery, both seasonal views, and annual KPIs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub battery: BatteryConfig,
    pub seasons: SeasonalReport,
    pub annual: AnnualReport,
}

impl RunOutput {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            battery: self.battery,
            seasons: self.seasons.clone(),
            annual: self.annual.clone(),
        }
    }
}

fn missing_path(field: String) -> RunError {
    RunError::InvalidConfig(vec![ConfigError {
        field,
        message: "required when source is \"csv\"".to_string(),
    }])
}

fn import_csv(
    config: &ScenarioConfig,
    name: &str,
    path: &std::path::Path,
    layout: &import::CsvLayout,
) -> Result<Series, RunError> {
    let resolved = config.resolve_path(path);
    import::read_series(&resolved, name, layout).map_err(|source| RunError::Import {
        series: name.to_string(),
        source,
    })
}

fn build_load(config: &ScenarioConfig, load: &LoadSettings) -> Result<Series, RunError> {
    let series = match load.source {
        SeriesSource::Csv => {
            let path = load
                .path
                .as_deref()
                .ok_or_else(|| missing_path("load.path".to_string()))?;
            import_csv(config, LOAD_SERIES, path, &load.csv_layout())?
        }
        SeriesSource::Synthetic => {
            let s = &config.simulation;
            LoadProfile::new(load.base_kw, load.amp_kw, load.phase_rad, load.noise_std, s.seed)
                .generate(LOAD_SERIES, s.start, config.synthetic_steps(), config.interval())
        }
    };
    Ok(if load.shift_to_hour {
        series.shift_to_full_hour()
    } else {
        series
    })
}

fn build_array(
    config: &ScenarioConfig,
    index: usize,
    array: &ArraySettings,
) -> Result<Series, RunError> {
    let series = match array.source {
        SeriesSource::Csv => {
            let path = array
                .path
                .as_deref()
                .ok_or_else(|| missing_path(format!("arrays[{index}].path")))?;
            import_csv(config, &array.name, path, &array.csv_layout())?
        }
        SeriesSource::Synthetic => {
            let s = &config.simulation;
            let seed = s.seed.wrapping_add(index as u64 + 1);
            SolarProfile::new(
                array.peak_kw,
                array.sunrise_hour,
                array.sunset_hour,
                array.noise_std,
                seed,
            )
            .with_seasonality(array.seasonal_swing_hours, array.winter_derate)
            .generate(&array.name, s.start, config.synthetic_steps(), config.interval())
        }
    };
    Ok(if array.shift_to_hour {
        series.shift_to_full_hour()
    } else {
        series
    })
}

/// Builds the load series and the combined PV series, then aligns them.
///
/// # Errors
///
/// Import failures, array mismatches, and alignment rejections.
pub fn load_inputs(config: &ScenarioConfig) -> Result<Vec<TimestepInput>, RunError> {
    let load = build_load(config, &config.load)?;
    let arrays = config
        .arrays
        .iter()
        .enumerate()
        .map(|(i, a)| build_array(config, i, a))
        .collect::<Result<Vec<_>, _>>()?;
    let pv = combine_arrays(PV_SERIES, &arrays)?;
    debug!(
        arrays = arrays.len(),
        pv_total_kwh = pv.total_kw(),
        load_total_kwh = load.total_kw(),
        "built input series"
    );
    Ok(align_series(&pv, &load, config.interval())?)
}

/// Validates the scenario, simulates it, and aggregates the results.
///
/// # Errors
///
/// [`RunError::InvalidConfig`] listing every violated constraint, or the
/// first import, validation, or simulation failure.
pub fn run_scenario(config: &ScenarioConfig) -> Result<RunOutput, RunError> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(RunError::InvalidConfig(errors));
    }

    let battery = config.battery_config()?;
    let inputs = load_inputs(config)?;
    let results = Simulator::new(&battery).run(&inputs)?;
    let seasons = SeasonalReport::from_results(&results);
    let annual = AnnualReport::from_results(&results, battery.capacity_kwh());

    info!(
        steps = results.len(),
        capacity_kwh = battery.capacity_kwh(),
        self_sufficiency_pct = annual.self_sufficiency_pct,
        "run complete"
    );
    Ok(RunOutput {
        battery,
        results,
        seasons,
        annual,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn short_baseline(days: u32) -> ScenarioConfig {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.days = days;
        cfg
    }

    #[test]
    fn synthetic_run_has_one_row_per_step() {
        crate::logging::init_test();
        let cfg = short_baseline(3);
        let output = run_scenario(&cfg).expect("baseline runs");
        assert_eq!(output.results.len(), 72);
        assert_eq!(output.annual.steps, 72);
        assert_eq!(output.seasons.totals.iter().map(|t| t.rows).sum::<usize>(), 72);
    }

    #[test]
    fn same_seed_same_results() {
        let cfg = short_baseline(2);
        let a = run_scenario(&cfg).expect("runs");
        let b = run_scenario(&cfg).expect("runs");
        assert_eq!(a.results, b.results);

        let mut other = cfg.clone();
        other.simulation.seed = 7;
        let c = run_scenario(&other).expect("runs");
        assert_ne!(a.results, c.results);
    }

    #[test]
    fn invalid_config_lists_every_error() {
        let mut cfg = short_baseline(1);
        cfg.simulation.days = 0;
        cfg.battery.capacity_kwh = -1.0;
        let Err(RunError::InvalidConfig(errors)) = run_scenario(&cfg) else {
            panic!("expected config errors");
        };
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn reserve_floor_starts_with_charge() {
        let mut cfg = ScenarioConfig::reserve_floor();
        cfg.simulation.days = 1;
        let output = run_scenario(&cfg).expect("runs");
        assert_eq!(output.battery.initial_charge_kwh(), 10.0);
        // Midnight in winter: no PV, so the first step discharges from the floor.
        assert!(output.results[0].battery_discharge_kw > 0.0);
    }

    #[test]
    fn csv_sources_resolve_relative_to_scenario() {
        crate::logging::init_test();
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("load.csv"),
            "DateTime,demand\n2019-07-01 00:00:00,1.0\n2019-07-01 01:00:00,2.0\n2019-07-01 02:00:00,1.0\n",
        )
        .expect("write load");
        fs::write(
            dir.path().join("pv.csv"),
            "time,P\n20190701:0010,0\n20190701:0110,3000\n20190701:0210,500\n",
        )
        .expect("write pv");
        let scenario = dir.path().join("scenario.toml");
        fs::write(
            &scenario,
            r#"
[battery]
capacity_kwh = 1.0

[load]
source = "csv"
path = "load.csv"

[[arrays]]
name = "roof"
source = "csv"
path = "pv.csv"
"#,
        )
        .expect("write scenario");

        let cfg = ScenarioConfig::from_toml_file(&scenario).expect("loads");
        let output = run_scenario(&cfg).expect("runs");
        let r = &output.results;
        assert_eq!(r.len(), 3);
        assert_eq!(r[0].timestamp.to_string(), "2019-07-01 00:00:00");
        assert_eq!(r[1].battery_charge_kw, 1.0);
        assert_eq!(r[1].self_usage_kw, 2.0);
        assert_eq!(r[1].grid_export_kw, 0.0);
    }

    #[test]
    fn misaligned_csv_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("load.csv"),
            "DateTime,demand\n2019-07-01 00:00:00,1.0\n2019-07-01 01:00:00,2.0\n",
        )
        .expect("write load");
        let mut cfg = ScenarioConfig::baseline();
        cfg.base_dir = Some(dir.path().to_path_buf());
        cfg.load.source = SeriesSource::Csv;
        cfg.load.path = Some("load.csv".into());
        cfg.simulation.days = 1;

        let err = run_scenario(&cfg).expect_err("lengths differ");
        assert!(matches!(
            err,
            RunError::Validation(ValidationError::LengthMismatch { load_len: 2, .. })
        ));
    }

    #[test]
    fn quarter_hour_scenario_is_rejected_before_simulating() {
        let mut cfg = short_baseline(7);
        cfg.simulation.interval_minutes = 15;
        let Err(RunError::InvalidConfig(errors)) = run_scenario(&cfg) else {
            panic!("expected config errors");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "simulation.interval_minutes");
    }

    #[test]
    fn missing_csv_is_import_error() {
        let mut cfg = short_baseline(1);
        cfg.load.source = SeriesSource::Csv;
        cfg.load.path = Some("/no/such/load.csv".into());
        let err = run_scenario(&cfg).expect_err("missing file");
        assert!(matches!(err, RunError::Import { ref series, .. } if series == LOAD_SERIES));
    }
}
