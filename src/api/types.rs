//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::sim::types::TimestepResult;

/// One result row tagged with its position in the run.
#[derive(Debug, Serialize)]
pub struct TimestepRecord {
    /// Zero-based row index.
    pub index: usize,
    #[serde(flatten)]
    pub row: TimestepResult,
}

/// Optional range query for the timesteps endpoint.
#[derive(Debug, Deserialize)]
pub struct TimestepsQuery {
    /// First row index (inclusive).
    pub from: Option<usize>,
    /// Last row index (inclusive).
    pub to: Option<usize>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
