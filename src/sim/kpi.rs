//! Post-hoc whole-series KPIs from simulation results.

use std::fmt;

use serde::Serialize;

use super::aggregate::percentage;
use super::types::TimestepResult;

/// Aggregate indicators over a complete simulation run.
///
/// Computed post-hoc from the result table so the reported numbers always
/// match the rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnualReport {
    /// Number of simulated timesteps.
    pub steps: usize,
    pub pv_generation_kwh: f64,
    pub household_load_kwh: f64,
    pub self_usage_kwh: f64,
    pub battery_charge_kwh: f64,
    pub battery_discharge_kwh: f64,
    pub grid_import_kwh: f64,
    pub grid_export_kwh: f64,
    /// Largest single-step grid import (kW).
    pub peak_import_kw: f64,
    /// Largest single-step grid export (kW).
    pub peak_export_kw: f64,
    /// Energy moved through the battery, in plus out (kWh).
    pub battery_throughput_kwh: f64,
    /// Throughput / (2 * capacity).
    pub battery_equivalent_full_cycles: f64,
    /// Share of load met by PV and battery (%).
    pub self_sufficiency_pct: f64,
    /// Share of PV not exported (%).
    pub self_consumption_pct: f64,
}

impl AnnualReport {
    /// Computes all KPIs from the complete result table.
    ///
    /// # Arguments
    ///
    /// * `results` - Complete simulation result rows
    /// * `battery_capacity_kwh` - Capacity used for the cycle count
    pub fn from_results(results: &[TimestepResult], battery_capacity_kwh: f64) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let mut report = Self {
            steps: results.len(),
            ..Self::default()
        };
        for r in results {
            report.pv_generation_kwh += r.pv_generation_kw;
            report.household_load_kwh += r.household_load_kw;
            report.self_usage_kwh += r.self_usage_kw;
            report.battery_charge_kwh += r.battery_charge_kw;
            report.battery_discharge_kwh += r.battery_discharge_kw;
            report.grid_import_kwh += r.grid_import_kw;
            report.grid_export_kwh += r.grid_export_kw;
            report.peak_import_kw = report.peak_import_kw.max(r.grid_import_kw);
            report.peak_export_kw = report.peak_export_kw.max(r.grid_export_kw);
        }

        report.battery_throughput_kwh = report.battery_charge_kwh + report.battery_discharge_kwh;
        report.battery_equivalent_full_cycles = if battery_capacity_kwh > 0.0 {
            report.battery_throughput_kwh / (2.0 * battery_capacity_kwh)
        } else {
            0.0
        };
        report.self_sufficiency_pct = percentage(
            report.self_usage_kwh + report.battery_discharge_kwh,
            report.household_load_kwh,
        );
        report.self_consumption_pct = percentage(
            report.pv_generation_kwh - report.grid_export_kwh,
            report.pv_generation_kwh,
        );
        report
    }
}

impl fmt::Display for AnnualReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Annual Report ---")?;
        writeln!(f, "Timesteps:             {}", self.steps)?;
        writeln!(f, "PV generation:         {:.2} kWh", self.pv_generation_kwh)?;
        writeln!(f, "Household load:        {:.2} kWh", self.household_load_kwh)?;
        writeln!(f, "Direct self-usage:     {:.2} kWh", self.self_usage_kwh)?;
        writeln!(f, "Battery discharge:     {:.2} kWh", self.battery_discharge_kwh)?;
        writeln!(f, "Grid import:           {:.2} kWh", self.grid_import_kwh)?;
        writeln!(f, "Grid export:           {:.2} kWh", self.grid_export_kwh)?;
        writeln!(f, "Peak import:           {:.2} kW", self.peak_import_kw)?;
        writeln!(f, "Peak export:           {:.2} kW", self.peak_export_kw)?;
        writeln!(
            f,
            "Battery throughput:    {:.2} kWh ({:.2} equiv. cycles)",
            self.battery_throughput_kwh, self.battery_equivalent_full_cycles
        )?;
        writeln!(f, "Self-sufficiency:      {:.2}%", self.self_sufficiency_pct)?;
        write!(f, "Self-consumption:      {:.2}%", self.self_consumption_pct)
    }
}
