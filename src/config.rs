//! TOML-based scenario configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::Deserialize;
use thiserror::Error;

use crate::io::import::{CsvLayout, PowerUnit};
use crate::sim::error::ValidationError;
use crate::sim::types::BatteryConfig;

const MINUTES_PER_HOUR: u32 = 60;
const MINUTES_PER_DAY: u32 = 24 * MINUTES_PER_HOUR;

/// Top-level scenario configuration parsed from TOML.
///
/// All sections have defaults matching the baseline building. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Timing, synthetic horizon and seed.
    #[serde(default)]
    pub simulation: SimulationSettings,
    /// Battery parameters.
    #[serde(default)]
    pub battery: BatterySettings,
    /// Household load source.
    #[serde(default)]
    pub load: LoadSettings,
    /// PV arrays, summed into one generation series.
    #[serde(default = "baseline_arrays")]
    pub arrays: Vec<ArraySettings>,
    /// Directory relative CSV paths are resolved against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

/// Simulation timing and global parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    /// Step length in minutes. Only hourly steps (60) are accepted.
    pub interval_minutes: u32,
    /// First timestamp of synthetic series.
    pub start: NaiveDateTime,
    /// Length of synthetic series in days (must be > 0).
    pub days: u32,
    /// Master random seed.
    pub seed: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            interval_minutes: MINUTES_PER_HOUR,
            start: NaiveDate::from_ymd_opt(2019, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
            days: 365,
            seed: 42,
        }
    }
}

/// Battery parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatterySettings {
    /// Usable capacity (kWh).
    pub capacity_kwh: f64,
    /// Starting charge level (kWh).
    pub min_soc_kwh: f64,
    /// Share of discharged energy that reaches the load (0.0-1.0].
    pub round_trip_efficiency: f64,
}

impl Default for BatterySettings {
    fn default() -> Self {
        Self {
            capacity_kwh: 30.0,
            min_soc_kwh: 0.0,
            round_trip_efficiency: 0.9,
        }
    }
}

/// Where a series comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSource {
    #[default]
    Synthetic,
    Csv,
}

/// Household load source and synthetic profile parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadSettings {
    pub source: SeriesSource,
    /// CSV file, required when `source = "csv"`.
    pub path: Option<PathBuf>,
    pub timestamp_column: String,
    pub value_column: String,
    pub unit: PowerUnit,
    /// Shift the series so its first sample is on the full hour.
    pub shift_to_hour: bool,
    /// Mean demand (kW).
    pub base_kw: f64,
    /// Daily sinusoidal swing (kW).
    pub amp_kw: f64,
    /// Phase offset (radians).
    pub phase_rad: f64,
    /// Gaussian noise standard deviation (kW).
    pub noise_std: f64,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            source: SeriesSource::Synthetic,
            path: None,
            timestamp_column: "DateTime".to_string(),
            value_column: "demand".to_string(),
            unit: PowerUnit::Kw,
            shift_to_hour: false,
            base_kw: 6.0,
            amp_kw: 3.0,
            phase_rad: -std::f64::consts::FRAC_PI_2,
            noise_std: 0.5,
        }
    }
}

impl LoadSettings {
    pub fn csv_layout(&self) -> CsvLayout {
        CsvLayout {
            timestamp_column: self.timestamp_column.clone(),
            value_column: self.value_column.clone(),
            unit: self.unit,
        }
    }
}

/// One PV array: its source and synthetic profile parameters.
///
/// CSV defaults follow the PVGIS hourly export (`time`, `P` in W, stamped
/// past the hour).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArraySettings {
    pub name: String,
    pub source: SeriesSource,
    /// CSV file, required when `source = "csv"`.
    pub path: Option<PathBuf>,
    pub timestamp_column: String,
    pub value_column: String,
    pub unit: PowerUnit,
    /// Shift the series so its first sample is on the full hour.
    pub shift_to_hour: bool,
    /// Clear-sky noon output at the equinox (kW).
    pub peak_kw: f64,
    /// Equinox sunrise (hour of day).
    pub sunrise_hour: f64,
    /// Equinox sunset (hour of day).
    pub sunset_hour: f64,
    /// Noise standard deviation as a fraction of output.
    pub noise_std: f64,
    /// Extra daylight hours at each end of the day at midsummer.
    pub seasonal_swing_hours: f64,
    /// Fractional noon output loss at midwinter (0.0-1.0).
    pub winter_derate: f64,
}

impl Default for ArraySettings {
    fn default() -> Self {
        Self {
            name: "array".to_string(),
            source: SeriesSource::Synthetic,
            path: None,
            timestamp_column: "time".to_string(),
            value_column: "P".to_string(),
            unit: PowerUnit::W,
            shift_to_hour: true,
            peak_kw: 53.2,
            sunrise_hour: 6.0,
            sunset_hour: 18.0,
            noise_std: 0.15,
            seasonal_swing_hours: 2.5,
            winter_derate: 0.6,
        }
    }
}

impl ArraySettings {
    pub fn csv_layout(&self) -> CsvLayout {
        CsvLayout {
            timestamp_column: self.timestamp_column.clone(),
            value_column: self.value_column.clone(),
            unit: self.unit,
        }
    }
}

/// South and south-west facing arrays: 140 and 90 panels at 380 Wp.
fn baseline_arrays() -> Vec<ArraySettings> {
    vec![
        ArraySettings {
            name: "South Facing Array".to_string(),
            peak_kw: 53.2,
            ..ArraySettings::default()
        },
        ArraySettings {
            name: "South-West Facing Array".to_string(),
            peak_kw: 34.2,
            sunrise_hour: 6.5,
            sunset_hour: 18.5,
            ..ArraySettings::default()
        },
    ]
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.capacity_kwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the baseline building: 30 kWh battery, two arrays, synthetic load.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationSettings::default(),
            battery: BatterySettings::default(),
            load: LoadSettings::default(),
            arrays: baseline_arrays(),
            base_dir: None,
        }
    }

    /// Returns the baseline building with a 10 kWh battery.
    pub fn small_battery() -> Self {
        Self {
            battery: BatterySettings {
                capacity_kwh: 10.0,
                ..BatterySettings::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the baseline building starting with 10 kWh in the battery.
    pub fn reserve_floor() -> Self {
        Self {
            battery: BatterySettings {
                min_soc_kwh: 10.0,
                ..BatterySettings::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "small_battery", "reserve_floor"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "small_battery" => Ok(Self::small_battery()),
            "reserve_floor" => Ok(Self::reserve_floor()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// Relative CSV paths in the file resolve against its directory.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        let mut cfg = Self::from_toml_str(&content)?;
        cfg.base_dir = path.parent().map(Path::to_path_buf);
        Ok(cfg)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Step length as a duration.
    pub fn interval(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.simulation.interval_minutes))
    }

    /// Number of steps in a synthetic series.
    pub fn synthetic_steps(&self) -> usize {
        let per_day = MINUTES_PER_DAY
            .checked_div(self.simulation.interval_minutes)
            .unwrap_or(0);
        per_day as usize * self.simulation.days as usize
    }

    /// Builds the validated battery parameters.
    ///
    /// # Errors
    ///
    /// Returns the battery's [`ValidationError`] for out-of-range values.
    pub fn battery_config(&self) -> Result<BatteryConfig, ValidationError> {
        BatteryConfig::new(
            self.battery.capacity_kwh,
            self.battery.min_soc_kwh,
            self.battery.round_trip_efficiency,
        )
    }

    /// Resolves a CSV path against the scenario file's directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        // Series values are summed as kWh per step, so steps must be one hour long.
        if s.interval_minutes != MINUTES_PER_HOUR {
            errors.push(ConfigError::new(
                "simulation.interval_minutes",
                format!("must be {MINUTES_PER_HOUR} (hourly steps only)"),
            ));
        }
        if s.days == 0 {
            errors.push(ConfigError::new("simulation.days", "must be > 0"));
        }

        if let Err(ValidationError::InvalidBattery { field, message }) = self.battery_config() {
            let field = match field {
                "min_state_of_charge_kwh" => "min_soc_kwh",
                other => other,
            };
            errors.push(ConfigError::new(format!("battery.{field}"), message));
        }

        let load = &self.load;
        if load.source == SeriesSource::Csv && load.path.is_none() {
            errors.push(ConfigError::new("load.path", "required when source is \"csv\""));
        }
        if load.source == SeriesSource::Synthetic && !(load.base_kw >= 0.0) {
            errors.push(ConfigError::new("load.base_kw", "must be >= 0"));
        }
        if load.noise_std < 0.0 {
            errors.push(ConfigError::new("load.noise_std", "must be >= 0"));
        }

        if self.arrays.is_empty() {
            errors.push(ConfigError::new("arrays", "at least one array is required"));
        }
        let mut names = HashSet::new();
        for (i, array) in self.arrays.iter().enumerate() {
            let field = |name: &str| format!("arrays[{i}].{name}");
            if !names.insert(array.name.as_str()) {
                errors.push(ConfigError::new(
                    field("name"),
                    format!("duplicate array name \"{}\"", array.name),
                ));
            }
            match array.source {
                SeriesSource::Csv => {
                    if array.path.is_none() {
                        errors.push(ConfigError::new(
                            field("path"),
                            "required when source is \"csv\"",
                        ));
                    }
                }
                SeriesSource::Synthetic => {
                    if !(array.peak_kw >= 0.0) {
                        errors.push(ConfigError::new(field("peak_kw"), "must be >= 0"));
                    }
                    if !(0.0..array.sunset_hour).contains(&array.sunrise_hour) {
                        errors.push(ConfigError::new(
                            field("sunrise_hour"),
                            "must be >= 0 and < sunset_hour",
                        ));
                    }
                    if array.sunset_hour > 24.0 {
                        errors.push(ConfigError::new(field("sunset_hour"), "must be <= 24"));
                    }
                    if array.noise_std < 0.0 {
                        errors.push(ConfigError::new(field("noise_std"), "must be >= 0"));
                    }
                    if !(0.0..=1.0).contains(&array.winter_derate) {
                        errors.push(ConfigError::new(
                            field("winter_derate"),
                            "must be in [0.0, 1.0]",
                        ));
                    }
                }
            }
        }

        errors
    }
}
