//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use pv_sim::sim::types::{BatteryConfig, TimestepInput};

/// Midnight on the given 2019 date.
pub fn midnight(month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

/// Hourly inputs from `(pv_kw, load_kw)` pairs starting at `start`.
pub fn hourly_inputs(start: NaiveDateTime, rows: &[(f64, f64)]) -> Vec<TimestepInput> {
    rows.iter()
        .enumerate()
        .map(|(h, &(pv, load))| TimestepInput::new(start + TimeDelta::hours(h as i64), pv, load))
        .collect()
}

/// 10 kWh, 90% efficient, starts empty.
pub fn small_battery() -> BatteryConfig {
    BatteryConfig::without_floor(10.0, 0.9).expect("valid battery")
}

/// A full non-leap year of hourly rows with a simple day/night pattern.
pub fn year_of_inputs() -> Vec<TimestepInput> {
    let start = midnight(1, 1);
    (0..8760)
        .map(|h| {
            let hour = h % 24;
            let pv = if (7..17).contains(&hour) { 4.0 } else { 0.0 };
            let load = if (17..23).contains(&hour) { 3.0 } else { 1.0 };
            TimestepInput::new(start + TimeDelta::hours(h as i64), pv, load)
        })
        .collect()
}
