//! Seasonal aggregation of a completed simulation.
//!
//! Two percentage views are computed per season:
//! - coverage: how the season's PV yield was used (self-usage vs export)
//! - demand coverage: how the season's load was met (PV, battery, grid)

use std::fmt;

use serde::Serialize;

use super::season::Season;
use super::types::TimestepResult;

/// Weight applied to battery discharge when crediting it against PV yield
/// in the coverage view.
pub const BATTERY_DISCHARGE_CREDIT: f64 = 1.1;

/// Energy sums for the rows of one season.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SeasonTotals {
    /// Number of timesteps in the season.
    pub rows: usize,
    pub pv_generation_kwh: f64,
    pub household_load_kwh: f64,
    pub self_usage_kwh: f64,
    pub battery_charge_kwh: f64,
    pub battery_discharge_kwh: f64,
    pub grid_import_kwh: f64,
    pub grid_export_kwh: f64,
}

impl SeasonTotals {
    fn add(&mut self, row: &TimestepResult) {
        self.rows += 1;
        self.pv_generation_kwh += row.pv_generation_kw;
        self.household_load_kwh += row.household_load_kw;
        self.self_usage_kwh += row.self_usage_kw;
        self.battery_charge_kwh += row.battery_charge_kw;
        self.battery_discharge_kwh += row.battery_discharge_kw;
        self.grid_import_kwh += row.grid_import_kw;
        self.grid_export_kwh += row.grid_export_kw;
    }
}

/// Sums every row into its season's bucket, in [`Season::ALL`] order.
pub fn seasonal_totals(results: &[TimestepResult]) -> [SeasonTotals; 4] {
    let mut totals = [SeasonTotals::default(); 4];
    for row in results {
        totals[Season::of(&row.timestamp).index()].add(row);
    }
    totals
}

/// `numerator / denominator * 100`, or `0` when the denominator is zero.
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

/// Share of a season's PV yield used on site or exported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub season: Season,
    /// `(self-usage + 1.1 * battery discharge) / PV * 100`.
    pub self_usage_pct: f64,
    /// `export / PV * 100`.
    pub export_pct: f64,
}

impl CoverageSummary {
    pub fn from_totals(season: Season, totals: &SeasonTotals) -> Self {
        let credited =
            totals.self_usage_kwh + BATTERY_DISCHARGE_CREDIT * totals.battery_discharge_kwh;
        Self {
            season,
            self_usage_pct: percentage(credited, totals.pv_generation_kwh),
            export_pct: percentage(totals.grid_export_kwh, totals.pv_generation_kwh),
        }
    }
}

/// Share of a season's household load met by each source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DemandCoverageSummary {
    pub season: Season,
    /// Direct PV self-usage / load * 100.
    pub self_usage_pct: f64,
    /// Battery discharge / load * 100.
    pub battery_pct: f64,
    /// Grid import / load * 100.
    pub grid_pct: f64,
}

impl DemandCoverageSummary {
    pub fn from_totals(season: Season, totals: &SeasonTotals) -> Self {
        let load = totals.household_load_kwh;
        Self {
            season,
            self_usage_pct: percentage(totals.self_usage_kwh, load),
            battery_pct: percentage(totals.battery_discharge_kwh, load),
            grid_pct: percentage(totals.grid_import_kwh, load),
        }
    }
}

/// Both seasonal views plus the sums they were computed from.
///
/// Built once from a fully materialized result table and read-only after.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalReport {
    pub totals: [SeasonTotals; 4],
    pub coverage: [CoverageSummary; 4],
    pub demand_coverage: [DemandCoverageSummary; 4],
}

impl SeasonalReport {
    /// Aggregates a complete simulation result table.
    pub fn from_results(results: &[TimestepResult]) -> Self {
        let totals = seasonal_totals(results);
        Self {
            totals,
            coverage: Season::ALL.map(|s| CoverageSummary::from_totals(s, &totals[s.index()])),
            demand_coverage: Season::ALL
                .map(|s| DemandCoverageSummary::from_totals(s, &totals[s.index()])),
        }
    }

    pub fn totals_for(&self, season: Season) -> &SeasonTotals {
        &self.totals[season.index()]
    }
}

impl fmt::Display for SeasonalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- PV Yield Coverage by Season ---")?;
        writeln!(f, "{:<8} {:>12} {:>12}", "Season", "Self Usage", "Export")?;
        for c in &self.coverage {
            writeln!(
                f,
                "{:<8} {:>11.2}% {:>11.2}%",
                c.season, c.self_usage_pct, c.export_pct
            )?;
        }
        writeln!(f)?;
        writeln!(f, "--- Demand Coverage by Season ---")?;
        writeln!(
            f,
            "{:<8} {:>12} {:>12} {:>12}",
            "Season", "Self Usage", "Battery", "Grid"
        )?;
        for (i, d) in self.demand_coverage.iter().enumerate() {
            write!(
                f,
                "{:<8} {:>11.2}% {:>11.2}% {:>11.2}%",
                d.season, d.self_usage_pct, d.battery_pct, d.grid_pct
            )?;
            if i + 1 < self.demand_coverage.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
