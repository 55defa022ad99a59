//! CSV and JSON export of simulation output.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::sim::aggregate::SeasonalReport;
use crate::sim::season::Season;
use crate::sim::types::TimestepResult;

/// Column header of the per-timestep result table.
const TIMESTEP_HEADER: &str = "timestamp,pv_generation_kw,household_load_kw,self_usage_kw,\
                               battery_charge_kw,battery_discharge_kw,grid_export_kw,\
                               grid_import_kw,battery_charge_level_kwh";

/// Column header of the seasonal table.
const SEASON_HEADER: &str = "season,bucket,rows,pv_generation_kwh,household_load_kwh,\
                             self_usage_kwh,battery_discharge_kwh,grid_import_kwh,\
                             grid_export_kwh,coverage_self_usage_pct,coverage_export_pct,\
                             demand_self_usage_pct,demand_battery_pct,demand_grid_pct";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn create(path: &Path) -> io::Result<io::BufWriter<File>> {
    File::create(path).map(io::BufWriter::new)
}

/// Exports the result table to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_timesteps_csv(results: &[TimestepResult], path: &Path) -> io::Result<()> {
    write_timesteps_csv(results, create(path)?)
}

/// Writes the result table as CSV, one row per timestep in input order.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_timesteps_csv(results: &[TimestepResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(TIMESTEP_HEADER.split(',').map(str::trim))?;

    for r in results {
        wtr.write_record(&[
            r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.4}", r.pv_generation_kw),
            format!("{:.4}", r.household_load_kw),
            format!("{:.4}", r.self_usage_kw),
            format!("{:.4}", r.battery_charge_kw),
            format!("{:.4}", r.battery_discharge_kw),
            format!("{:.4}", r.grid_export_kw),
            format!("{:.4}", r.grid_import_kw),
            format!("{:.4}", r.battery_charge_level_kwh),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports the seasonal table to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_seasonal_csv(report: &SeasonalReport, path: &Path) -> io::Result<()> {
    write_seasonal_csv(report, create(path)?)
}

/// Writes one row per season with its sums and both percentage views.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_seasonal_csv(report: &SeasonalReport, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(SEASON_HEADER.split(',').map(str::trim))?;

    for season in Season::ALL {
        let t = report.totals_for(season);
        let c = &report.coverage[season.index()];
        let d = &report.demand_coverage[season.index()];
        wtr.write_record(&[
            season.label().to_string(),
            season.bucket().to_string(),
            t.rows.to_string(),
            format!("{:.4}", t.pv_generation_kwh),
            format!("{:.4}", t.household_load_kwh),
            format!("{:.4}", t.self_usage_kwh),
            format!("{:.4}", t.battery_discharge_kwh),
            format!("{:.4}", t.grid_import_kwh),
            format!("{:.4}", t.grid_export_kwh),
            format!("{:.2}", c.self_usage_pct),
            format!("{:.2}", c.export_pct),
            format!("{:.2}", d.self_usage_pct),
            format!("{:.2}", d.battery_pct),
            format!("{:.2}", d.grid_pct),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports any serializable summary as pretty-printed JSON.
///
/// # Errors
///
/// Returns an `io::Error` if file creation, serialization, or writing fails.
pub fn export_summary_json<T: Serialize>(summary: &T, path: &Path) -> io::Result<()> {
    let mut writer = create(path)?;
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writeln!(writer)?;
    writer.flush()
}
