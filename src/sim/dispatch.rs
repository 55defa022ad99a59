//! Fixed dispatch policy for a single timestep.
//!
//! With PV available the battery is charged first and whatever PV is left
//! serves the load, the rest going to the grid. Without PV the battery covers
//! the load, losing `1 - round_trip_efficiency` of what it releases.

use super::types::{BatteryConfig, TimestepInput};

/// Energy flows of one timestep and the charge level it leaves behind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// PV consumed directly by the load (kW).
    pub self_usage_kw: f64,
    /// PV stored in the battery (kW).
    pub battery_charge_kw: f64,
    /// Energy delivered to the load from the battery, after efficiency (kW).
    pub battery_discharge_kw: f64,
    /// Surplus PV sent to the grid (kW).
    pub grid_export_kw: f64,
    /// Load covered by the grid (kW).
    pub grid_import_kw: f64,
    /// Battery charge level after the step (kWh).
    pub charge_level_kwh: f64,
}

/// Computes one timestep from the previous charge level.
///
/// Pure function of its arguments: the caller threads `charge_level_kwh` of
/// the returned outcome into the next call.
///
/// # Arguments
///
/// * `previous_charge_kwh` - Charge level left by the previous step (kWh)
/// * `input` - PV generation and household load for this step
/// * `battery` - Battery parameters
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use pv_sim::sim::dispatch::dispatch_step;
/// use pv_sim::sim::types::{BatteryConfig, TimestepInput};
///
/// let battery = BatteryConfig::without_floor(10.0, 0.9).unwrap();
/// let at = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
///
/// let night = dispatch_step(5.0, &TimestepInput::new(at, 0.0, 3.0), &battery);
/// assert_eq!(night.charge_level_kwh, 2.0);
/// assert!((night.battery_discharge_kw - 2.7).abs() < 1e-12);
/// ```
pub fn dispatch_step(
    previous_charge_kwh: f64,
    input: &TimestepInput,
    battery: &BatteryConfig,
) -> StepOutcome {
    let pv = input.pv_generation_kw;
    let load = input.household_load_kw;

    if pv > 0.0 {
        let (charge_level_kwh, battery_charge_kw, remaining_pv) =
            charge_from_pv(previous_charge_kwh, pv, battery.capacity_kwh());

        let (self_usage_kw, grid_export_kw, grid_import_kw) = if remaining_pv >= load {
            (load, remaining_pv - load, 0.0)
        } else {
            (remaining_pv, 0.0, load - remaining_pv)
        };

        StepOutcome {
            self_usage_kw,
            battery_charge_kw,
            battery_discharge_kw: 0.0,
            grid_export_kw,
            grid_import_kw,
            charge_level_kwh,
        }
    } else {
        let raw_discharge_kwh = load.min(previous_charge_kwh);
        let delivered_kw = raw_discharge_kwh * battery.round_trip_efficiency();

        StepOutcome {
            self_usage_kw: 0.0,
            battery_charge_kw: 0.0,
            battery_discharge_kw: delivered_kw,
            grid_export_kw: 0.0,
            grid_import_kw: load - delivered_kw,
            charge_level_kwh: previous_charge_kwh - raw_discharge_kwh,
        }
    }
}

/// Returns `(charge_level, charge_added, remaining_pv)`.
///
/// Filling the headroom exactly lands on `capacity` rather than on
/// `charge + (capacity - charge)`, which may round past it.
fn charge_from_pv(charge_kwh: f64, pv_kw: f64, capacity_kwh: f64) -> (f64, f64, f64) {
    let headroom_kwh = capacity_kwh - charge_kwh;
    if pv_kw >= headroom_kwh {
        (capacity_kwh, headroom_kwh, pv_kw - headroom_kwh)
    } else {
        (charge_kwh + pv_kw, pv_kw, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 1, 1)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }

    fn battery() -> BatteryConfig {
        BatteryConfig::without_floor(10.0, 0.9).expect("valid battery")
    }

    #[test]
    fn pv_charges_empty_battery_before_serving_load() {
        let out = dispatch_step(0.0, &TimestepInput::new(at(10), 5.0, 2.0), &battery());
        assert_eq!(out.charge_level_kwh, 5.0);
        assert_eq!(out.battery_charge_kw, 5.0);
        assert_eq!(out.self_usage_kw, 0.0);
        assert_eq!(out.grid_import_kw, 2.0);
        assert_eq!(out.grid_export_kw, 0.0);
        assert_eq!(out.battery_discharge_kw, 0.0);
    }

    #[test]
    fn night_discharge_applies_efficiency_to_delivered_energy_only() {
        let out = dispatch_step(5.0, &TimestepInput::new(at(22), 0.0, 3.0), &battery());
        assert_eq!(out.self_usage_kw, 0.0);
        assert!((out.battery_discharge_kw - 2.7).abs() < 1e-12);
        assert!((out.grid_import_kw - 0.3).abs() < 1e-12);
        // Stored energy drops by the pre-efficiency amount
        assert_eq!(out.charge_level_kwh, 2.0);
    }

    #[test]
    fn pv_filling_headroom_leaves_nothing_for_load() {
        let out = dispatch_step(2.0, &TimestepInput::new(at(12), 8.0, 1.0), &battery());
        assert_eq!(out.charge_level_kwh, 10.0);
        assert_eq!(out.battery_charge_kw, 8.0);
        assert_eq!(out.self_usage_kw, 0.0);
        assert_eq!(out.grid_import_kw, 1.0);
        assert_eq!(out.grid_export_kw, 0.0);
    }

    #[test]
    fn full_battery_passes_pv_to_load_and_grid() {
        let out = dispatch_step(10.0, &TimestepInput::new(at(12), 6.0, 2.5), &battery());
        assert_eq!(out.charge_level_kwh, 10.0);
        assert_eq!(out.battery_charge_kw, 0.0);
        assert_eq!(out.self_usage_kw, 2.5);
        assert_eq!(out.grid_export_kw, 3.5);
        assert_eq!(out.grid_import_kw, 0.0);
    }

    #[test]
    fn surplus_after_charging_is_split_between_load_and_export() {
        let out = dispatch_step(7.0, &TimestepInput::new(at(13), 9.0, 4.0), &battery());
        assert_eq!(out.charge_level_kwh, 10.0);
        assert_eq!(out.battery_charge_kw, 3.0);
        assert_eq!(out.self_usage_kw, 4.0);
        assert_eq!(out.grid_export_kw, 2.0);
    }

    #[test]
    fn night_load_larger_than_charge_drains_battery() {
        let out = dispatch_step(1.5, &TimestepInput::new(at(2), 0.0, 4.0), &battery());
        assert_eq!(out.charge_level_kwh, 0.0);
        assert!((out.battery_discharge_kw - 1.35).abs() < 1e-12);
        assert!((out.grid_import_kw - 2.65).abs() < 1e-12);
    }

    #[test]
    fn empty_battery_at_night_imports_everything() {
        let out = dispatch_step(0.0, &TimestepInput::new(at(3), 0.0, 1.2), &battery());
        assert_eq!(out.charge_level_kwh, 0.0);
        assert_eq!(out.battery_discharge_kw, 0.0);
        assert_eq!(out.grid_import_kw, 1.2);
    }

    #[test]
    fn zero_load_with_zero_pv_is_idle() {
        let out = dispatch_step(4.0, &TimestepInput::new(at(4), 0.0, 0.0), &battery());
        assert_eq!(out.charge_level_kwh, 4.0);
        assert_eq!(out.grid_import_kw, 0.0);
        assert_eq!(out.battery_discharge_kw, 0.0);
    }

    #[test]
    fn charge_from_pv_lands_exactly_on_capacity() {
        let (level, added, remaining) = charge_from_pv(0.1, 5.0, 0.3);
        assert_eq!(level, 0.3);
        assert!(added > 0.0);
        assert!((remaining - (5.0 - (0.3 - 0.1))).abs() < 1e-12);
    }
}
