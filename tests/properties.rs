//! Property tests for the dispatch recurrence and seasonal partition.

mod common;

use chrono::TimeDelta;
use proptest::prelude::*;
use pv_sim::sim::types::{BatteryConfig, TimestepInput};
use pv_sim::sim::{AnnualReport, SeasonalReport, simulate};

const EPS: f64 = 1e-9;

fn row_pairs() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec(
        (prop_oneof![Just(0.0), 0.0..60.0f64], 0.0..20.0f64),
        1..200,
    )
}

fn battery_config() -> impl Strategy<Value = BatteryConfig> {
    (0.5..50.0f64, 0.0..1.0f64, 0.05..=1.0f64).prop_map(|(capacity, floor_frac, eta)| {
        BatteryConfig::new(capacity, capacity * floor_frac * 0.99, eta).expect("generated in range")
    })
}

fn inputs_from(rows: &[(f64, f64)], start_day: u32) -> Vec<TimestepInput> {
    let start = common::midnight(1, 1) + TimeDelta::days(i64::from(start_day));
    common::hourly_inputs(start, rows)
}

proptest! {
    #[test]
    fn charge_level_stays_within_capacity(rows in row_pairs(), battery in battery_config()) {
        let results = simulate(&inputs_from(&rows, 0), &battery).expect("valid inputs");
        for r in &results {
            prop_assert!(r.battery_charge_level_kwh >= 0.0);
            prop_assert!(r.battery_charge_level_kwh <= battery.capacity_kwh());
        }
    }

    #[test]
    fn each_step_conserves_energy(rows in row_pairs(), battery in battery_config()) {
        let results = simulate(&inputs_from(&rows, 0), &battery).expect("valid inputs");
        let mut previous = battery.initial_charge_kwh();
        for r in &results {
            let level = r.battery_charge_level_kwh;
            if r.pv_generation_kw > 0.0 {
                let accounted = (level - previous) + r.self_usage_kw + r.grid_export_kw;
                prop_assert!((r.pv_generation_kw - accounted).abs() < EPS);
                prop_assert_eq!(r.battery_discharge_kw, 0.0);
            } else {
                prop_assert_eq!(r.self_usage_kw, 0.0);
                let shortfall = r.household_load_kw - r.battery_discharge_kw;
                prop_assert!((r.grid_import_kw - shortfall).abs() < EPS);
                prop_assert!(((previous - level) - r.household_load_kw.min(previous)).abs() < EPS);
            }
            previous = level;
        }
    }

    #[test]
    fn seasonal_sums_equal_series_sums(
        rows in row_pairs(),
        start_day in 0u32..365,
        battery in battery_config(),
    ) {
        let results = simulate(&inputs_from(&rows, start_day), &battery).expect("valid inputs");
        let seasons = SeasonalReport::from_results(&results);
        let annual = AnnualReport::from_results(&results, battery.capacity_kwh());

        let rows_total: usize = seasons.totals.iter().map(|t| t.rows).sum();
        prop_assert_eq!(rows_total, results.len());

        let import: f64 = seasons.totals.iter().map(|t| t.grid_import_kwh).sum();
        let export: f64 = seasons.totals.iter().map(|t| t.grid_export_kwh).sum();
        let discharge: f64 = seasons.totals.iter().map(|t| t.battery_discharge_kwh).sum();
        let self_usage: f64 = seasons.totals.iter().map(|t| t.self_usage_kwh).sum();
        prop_assert!((import - annual.grid_import_kwh).abs() < 1e-6);
        prop_assert!((export - annual.grid_export_kwh).abs() < 1e-6);
        prop_assert!((discharge - annual.battery_discharge_kwh).abs() < 1e-6);
        prop_assert!((self_usage - annual.self_usage_kwh).abs() < 1e-6);
    }

    #[test]
    fn percentages_are_finite_and_non_negative(
        rows in row_pairs(),
        start_day in 0u32..365,
        battery in battery_config(),
    ) {
        let results = simulate(&inputs_from(&rows, start_day), &battery).expect("valid inputs");
        let seasons = SeasonalReport::from_results(&results);
        for c in &seasons.coverage {
            prop_assert!(c.self_usage_pct.is_finite() && c.self_usage_pct >= 0.0);
            prop_assert!(c.export_pct.is_finite() && c.export_pct >= 0.0);
        }
        for d in &seasons.demand_coverage {
            prop_assert!(d.self_usage_pct.is_finite() && d.self_usage_pct >= 0.0);
            prop_assert!(d.battery_pct.is_finite() && d.battery_pct >= 0.0);
            prop_assert!(d.grid_pct.is_finite() && d.grid_pct >= 0.0);
        }
    }
}
