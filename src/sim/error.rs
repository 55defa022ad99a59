//! Error taxonomy for the simulation core.
//!
//! Input problems are [`ValidationError`]s and are reported before any step
//! runs. A charge level leaving `[0, capacity]` is an [`InvariantViolation`]:
//! it means the transition logic is wrong, so the run stops instead of clamping.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Rejected input: battery parameters, series shape, timestamps, or values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid battery {field}: {message}")]
    InvalidBattery {
        field: &'static str,
        message: &'static str,
    },

    #[error("series length mismatch: {pv_len} PV samples vs {load_len} load samples")]
    LengthMismatch { pv_len: usize, load_len: usize },

    #[error("timestamp mismatch at row {index}: PV at {pv}, load at {load}")]
    TimestampMismatch {
        index: usize,
        pv: NaiveDateTime,
        load: NaiveDateTime,
    },

    #[error("array `{name}` has {actual_len} samples, expected {expected_len}")]
    ArrayLengthMismatch {
        name: String,
        expected_len: usize,
        actual_len: usize,
    },

    #[error("array `{name}` is stamped {actual} at row {index}, expected {expected}")]
    ArrayTimestampMismatch {
        name: String,
        index: usize,
        expected: NaiveDateTime,
        actual: NaiveDateTime,
    },

    #[error("timestamp at row {index} ({timestamp}) does not follow {previous}")]
    NonMonotonic {
        index: usize,
        previous: NaiveDateTime,
        timestamp: NaiveDateTime,
    },

    #[error("irregular interval at row {index}: expected {expected_secs} s, got {actual_secs} s")]
    IrregularInterval {
        index: usize,
        expected_secs: i64,
        actual_secs: i64,
    },

    #[error("negative {quantity} at row {index}: {value}")]
    NegativeValue {
        index: usize,
        quantity: &'static str,
        value: f64,
    },

    #[error("non-finite {quantity} at row {index}")]
    NonFiniteValue { index: usize, quantity: &'static str },

    #[error("no PV arrays to combine")]
    NoArrays,
}

/// Battery charge level computed outside `[0, capacity]`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "battery charge level {charge_kwh} kWh outside [0, {capacity_kwh}] kWh at row {index} ({timestamp})"
)]
pub struct InvariantViolation {
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub charge_kwh: f64,
    pub capacity_kwh: f64,
}

/// Any failure of a simulation run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}
