//! Core simulation types: battery configuration, step inputs, and step results.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::dispatch::StepOutcome;
use super::error::ValidationError;

/// Immutable battery parameters for one simulation run.
///
/// Constructed through [`BatteryConfig::new`], which enforces
/// `capacity > 0`, `0 <= min_soc < capacity` and `0 < efficiency <= 1`.
/// The simulator borrows it for the whole run.
///
/// # Examples
///
/// ```
/// use pv_sim::sim::types::BatteryConfig;
///
/// let battery = BatteryConfig::new(10.0, 2.0, 0.9).unwrap();
/// assert_eq!(battery.initial_charge_kwh(), 2.0);
/// assert!(BatteryConfig::new(10.0, 10.0, 0.9).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatteryConfig {
    capacity_kwh: f64,
    min_state_of_charge_kwh: f64,
    round_trip_efficiency: f64,
}

impl BatteryConfig {
    /// Creates a validated battery configuration.
    ///
    /// # Arguments
    ///
    /// * `capacity_kwh` - Usable capacity (kWh, > 0)
    /// * `min_state_of_charge_kwh` - Starting charge level (kWh, in `[0, capacity)`)
    /// * `round_trip_efficiency` - Fraction of discharged energy delivered to load (`(0, 1]`)
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidBattery`] naming the first offending field.
    pub fn new(
        capacity_kwh: f64,
        min_state_of_charge_kwh: f64,
        round_trip_efficiency: f64,
    ) -> Result<Self, ValidationError> {
        if !(capacity_kwh.is_finite() && capacity_kwh > 0.0) {
            return Err(ValidationError::InvalidBattery {
                field: "capacity_kwh",
                message: "must be a finite value > 0",
            });
        }
        if !(min_state_of_charge_kwh >= 0.0 && min_state_of_charge_kwh < capacity_kwh) {
            return Err(ValidationError::InvalidBattery {
                field: "min_state_of_charge_kwh",
                message: "must be in [0, capacity_kwh)",
            });
        }
        if !(round_trip_efficiency > 0.0 && round_trip_efficiency <= 1.0) {
            return Err(ValidationError::InvalidBattery {
                field: "round_trip_efficiency",
                message: "must be in (0, 1]",
            });
        }

        Ok(Self {
            capacity_kwh,
            min_state_of_charge_kwh,
            round_trip_efficiency,
        })
    }

    /// Creates a battery that starts empty.
    ///
    /// # Errors
    ///
    /// Same as [`BatteryConfig::new`].
    pub fn without_floor(
        capacity_kwh: f64,
        round_trip_efficiency: f64,
    ) -> Result<Self, ValidationError> {
        Self::new(capacity_kwh, 0.0, round_trip_efficiency)
    }

    pub fn capacity_kwh(&self) -> f64 {
        self.capacity_kwh
    }

    pub fn min_state_of_charge_kwh(&self) -> f64 {
        self.min_state_of_charge_kwh
    }

    pub fn round_trip_efficiency(&self) -> f64 {
        self.round_trip_efficiency
    }

    /// Charge level carried into the first timestep.
    pub fn initial_charge_kwh(&self) -> f64 {
        self.min_state_of_charge_kwh
    }
}

/// PV generation and household load for one timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimestepInput {
    pub timestamp: NaiveDateTime,
    /// PV generation (kW, >= 0).
    pub pv_generation_kw: f64,
    /// Household load (kW, >= 0).
    pub household_load_kw: f64,
}

impl TimestepInput {
    pub fn new(timestamp: NaiveDateTime, pv_generation_kw: f64, household_load_kw: f64) -> Self {
        Self {
            timestamp,
            pv_generation_kw,
            household_load_kw,
        }
    }
}

/// Complete record of one simulated timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimestepResult {
    pub timestamp: NaiveDateTime,
    /// PV generation (kW).
    pub pv_generation_kw: f64,
    /// Household load (kW).
    pub household_load_kw: f64,
    /// PV consumed directly by the load (kW).
    pub self_usage_kw: f64,
    /// PV stored in the battery this step (kW).
    pub battery_charge_kw: f64,
    /// Battery energy delivered to the load after efficiency loss (kW).
    pub battery_discharge_kw: f64,
    /// Surplus PV sent to the grid (kW).
    pub grid_export_kw: f64,
    /// Load covered by the grid (kW).
    pub grid_import_kw: f64,
    /// Battery charge level after this step (kWh).
    pub battery_charge_level_kwh: f64,
}

impl TimestepResult {
    /// Combines a step's input with the dispatch outcome computed for it.
    pub fn from_step(input: &TimestepInput, outcome: &StepOutcome) -> Self {
        Self {
            timestamp: input.timestamp,
            pv_generation_kw: input.pv_generation_kw,
            household_load_kw: input.household_load_kw,
            self_usage_kw: outcome.self_usage_kw,
            battery_charge_kw: outcome.battery_charge_kw,
            battery_discharge_kw: outcome.battery_discharge_kw,
            grid_export_kw: outcome.grid_export_kw,
            grid_import_kw: outcome.grid_import_kw,
            battery_charge_level_kwh: outcome.charge_level_kwh,
        }
    }
}

impl fmt::Display for TimestepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | pv={:>7.2} kW  load={:>7.2} kW | self={:>6.2}  charge={:>6.2}  \
             discharge={:>6.2} | import={:>6.2}  export={:>6.2} | level={:>7.2} kWh",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.pv_generation_kw,
            self.household_load_kw,
            self.self_usage_kw,
            self.battery_charge_kw,
            self.battery_discharge_kw,
            self.grid_import_kw,
            self.grid_export_kw,
            self.battery_charge_level_kwh,
        )
    }
}
