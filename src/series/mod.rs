//! Input series handed to the simulator: samples, array combination, and alignment.

/// Seeded PV and household-load profile generators.
pub mod synthetic;

use chrono::{NaiveDateTime, TimeDelta, Timelike};
use tracing::debug;

use crate::sim::error::ValidationError;
use crate::sim::types::TimestepInput;
use crate::sim::validate::{check_power, check_spacing};

/// One timestamped power reading (kW).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub value_kw: f64,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, value_kw: f64) -> Self {
        Self {
            timestamp,
            value_kw,
        }
    }
}

/// A named, ordered sequence of power samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sum of all sample values.
    pub fn total_kw(&self) -> f64 {
        self.samples.iter().map(|s| s.value_kw).sum()
    }

    /// Shifts every timestamp back so the first sample sits on the full hour.
    ///
    /// Solar-resource services stamp hourly values a few minutes past the
    /// hour (e.g. `00:10`); the whole series moves by the same offset, so
    /// spacing is preserved.
    #[must_use]
    pub fn shift_to_full_hour(mut self) -> Self {
        let Some(first) = self.samples.first() else {
            return self;
        };
        let offset = TimeDelta::minutes(i64::from(first.timestamp.minute()))
            + TimeDelta::seconds(i64::from(first.timestamp.second()))
            + TimeDelta::nanoseconds(i64::from(first.timestamp.nanosecond()));
        if offset.is_zero() {
            return self;
        }
        debug!(
            series = %self.name,
            offset_secs = offset.num_seconds(),
            "shifting series to full hour"
        );
        for sample in &mut self.samples {
            sample.timestamp -= offset;
        }
        self
    }
}

/// Sums several PV array series into one building-level series.
///
/// All arrays must share the first array's timestamps exactly.
///
/// # Errors
///
/// [`ValidationError::NoArrays`] for an empty slice, or an array length or
/// timestamp mismatch.
pub fn combine_arrays(name: &str, arrays: &[Series]) -> Result<Series, ValidationError> {
    let (first, rest) = arrays.split_first().ok_or(ValidationError::NoArrays)?;
    let mut samples = first.samples.clone();

    for array in rest {
        if array.len() != samples.len() {
            return Err(ValidationError::ArrayLengthMismatch {
                name: array.name.clone(),
                expected_len: samples.len(),
                actual_len: array.len(),
            });
        }
        for (index, (total, sample)) in samples.iter_mut().zip(&array.samples).enumerate() {
            if total.timestamp != sample.timestamp {
                return Err(ValidationError::ArrayTimestampMismatch {
                    name: array.name.clone(),
                    index,
                    expected: total.timestamp,
                    actual: sample.timestamp,
                });
            }
            total.value_kw += sample.value_kw;
        }
    }

    Ok(Series::new(name, samples))
}

/// Pairs PV and load samples into simulator input rows.
///
/// Rejects series of different lengths, rows whose timestamps differ,
/// spacing that is not strictly increasing at `interval`, and negative or
/// non-finite values. Nothing is inferred or padded.
///
/// # Errors
///
/// The first [`ValidationError`] found.
pub fn align_series(
    pv: &Series,
    load: &Series,
    interval: TimeDelta,
) -> Result<Vec<TimestepInput>, ValidationError> {
    if pv.len() != load.len() {
        return Err(ValidationError::LengthMismatch {
            pv_len: pv.len(),
            load_len: load.len(),
        });
    }

    let inputs = pv
        .samples
        .iter()
        .zip(&load.samples)
        .enumerate()
        .map(|(index, (p, l))| {
            if p.timestamp != l.timestamp {
                return Err(ValidationError::TimestampMismatch {
                    index,
                    pv: p.timestamp,
                    load: l.timestamp,
                });
            }
            check_power(index, "PV generation", p.value_kw)?;
            check_power(index, "household load", l.value_kw)?;
            Ok(TimestepInput::new(p.timestamp, p.value_kw, l.value_kw))
        })
        .collect::<Result<Vec<_>, _>>()?;

    check_spacing(inputs.iter().map(|i| i.timestamp), Some(interval))?;
    debug!(rows = inputs.len(), pv = %pv.name, load = %load.name, "aligned input series");
    Ok(inputs)
}
