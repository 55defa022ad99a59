//! CSV import of timestamped power series.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::series::{Sample, Series};

/// Timestamp layouts accepted besides RFC 3339, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    // PVGIS hourly output, e.g. `20190101:0010`.
    "%Y%m%d:%H%M",
];

/// Failure reading a CSV file into a [`Series`].
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("missing column `{column}`")]
    MissingColumn { column: String },

    #[error("unparsable timestamp `{value}` on line {line}")]
    Timestamp { line: usize, value: String },

    #[error("unparsable value `{value}` on line {line}")]
    Value { line: usize, value: String },

    #[error("series `{name}` has no rows")]
    Empty { name: String },
}

/// Unit of the value column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUnit {
    #[default]
    Kw,
    W,
}

impl PowerUnit {
    pub fn to_kw(self, value: f64) -> f64 {
        match self {
            Self::Kw => value,
            Self::W => value / 1000.0,
        }
    }
}

/// Which columns hold the data and in what unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvLayout {
    pub timestamp_column: String,
    pub value_column: String,
    pub unit: PowerUnit,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self {
            timestamp_column: "timestamp".to_string(),
            value_column: "value".to_string(),
            unit: PowerUnit::Kw,
        }
    }
}

/// Parses a timestamp as RFC 3339 (offset dropped) or one of the naive layouts.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Reads a series from a CSV file.
///
/// # Errors
///
/// Returns [`ImportError::Io`] when the file cannot be opened, otherwise see
/// [`read_series_from_reader`].
pub fn read_series(path: &Path, name: &str, layout: &CsvLayout) -> Result<Series, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = read_series_from_reader(io::BufReader::new(file), name, layout)?;
    debug!(path = %path.display(), name, rows = series.len(), "imported series");
    Ok(series)
}

/// Reads a series from any CSV source with a header row.
///
/// Line numbers in errors are 1-based and count the header.
///
/// # Errors
///
/// Missing columns, unparsable cells, malformed CSV, or no data rows.
pub fn read_series_from_reader(
    reader: impl Read,
    name: &str,
    layout: &CsvLayout,
) -> Result<Series, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |wanted: &str| {
        headers
            .iter()
            .position(|h| h == wanted)
            .ok_or_else(|| ImportError::MissingColumn {
                column: wanted.to_string(),
            })
    };
    let ts_idx = column(&layout.timestamp_column)?;
    let value_idx = column(&layout.value_column)?;

    let mut samples = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let line = row + 2;
        let raw_ts = record.get(ts_idx).unwrap_or_default();
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| ImportError::Timestamp {
            line,
            value: raw_ts.to_string(),
        })?;
        let raw_value = record.get(value_idx).unwrap_or_default();
        let value: f64 = raw_value.parse().map_err(|_| ImportError::Value {
            line,
            value: raw_value.to_string(),
        })?;
        samples.push(Sample::new(timestamp, layout.unit.to_kw(value)));
    }

    if samples.is_empty() {
        return Err(ImportError::Empty {
            name: name.to_string(),
        });
    }
    Ok(Series::new(name, samples))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 1, 1)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .expect("valid timestamp")
    }

    fn layout(ts: &str, value: &str, unit: PowerUnit) -> CsvLayout {
        CsvLayout {
            timestamp_column: ts.to_string(),
            value_column: value.to_string(),
            unit,
        }
    }

    #[test]
    fn parses_supported_timestamp_layouts() {
        assert_eq!(parse_timestamp("2019-01-01 01:00:00"), Some(at(1, 0)));
        assert_eq!(parse_timestamp("2019-01-01T01:00:00"), Some(at(1, 0)));
        assert_eq!(parse_timestamp("2019-01-01 01:00"), Some(at(1, 0)));
        assert_eq!(parse_timestamp("20190101:0110"), Some(at(1, 10)));
        assert_eq!(parse_timestamp("2019-01-01T02:00:00+01:00"), Some(at(1, 0)));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn reads_load_csv_in_kw() {
        let data = "DateTime,demand,extra\n\
                    2019-01-01 00:00:00,1.5,x\n\
                    2019-01-01 01:00:00, 2.25 ,y\n";
        let load_layout = layout("DateTime", "demand", PowerUnit::Kw);
        let series =
            read_series_from_reader(data.as_bytes(), "load", &load_layout).expect("valid csv");
        assert_eq!(series.name, "load");
        assert_eq!(
            series.samples,
            vec![Sample::new(at(0, 0), 1.5), Sample::new(at(1, 0), 2.25)]
        );
    }

    #[test]
    fn converts_watts_to_kw() {
        let data = "time,P\n20190101:0010,0.0\n20190101:0110,1250.0\n";
        let pv_layout = layout("time", "P", PowerUnit::W);
        let series = read_series_from_reader(data.as_bytes(), "pv", &pv_layout).expect("valid csv");
        assert_eq!(series.samples[1], Sample::new(at(1, 10), 1.25));
    }

    #[test]
    fn missing_column_is_named() {
        let data = "time,P\n20190101:0010,0.0\n";
        let err = read_series_from_reader(data.as_bytes(), "pv", &CsvLayout::default())
            .expect_err("column absent");
        assert!(matches!(err, ImportError::MissingColumn { ref column } if column == "timestamp"));
    }

    #[test]
    fn bad_cells_report_line() {
        let data = "timestamp,value\n2019-01-01 00:00,1\n2019-01-01 01:00,abc\n";
        let err = read_series_from_reader(data.as_bytes(), "x", &CsvLayout::default())
            .expect_err("bad value");
        assert!(matches!(err, ImportError::Value { line: 3, .. }));

        let data = "timestamp,value\nnoon,1\n";
        let err = read_series_from_reader(data.as_bytes(), "x", &CsvLayout::default())
            .expect_err("bad timestamp");
        assert!(matches!(err, ImportError::Timestamp { line: 2, .. }));
    }

    #[test]
    fn header_only_is_empty() {
        let data = "timestamp,value\n";
        let err = read_series_from_reader(data.as_bytes(), "x", &CsvLayout::default())
            .expect_err("no rows");
        assert!(matches!(err, ImportError::Empty { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_series(Path::new("/definitely/not/here.csv"), "x", &CsvLayout::default())
            .expect_err("no file");
        assert!(matches!(err, ImportError::Io { .. }));
    }
}
