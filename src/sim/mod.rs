/// Seasonal coverage and demand-coverage views.
pub mod aggregate;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod kpi;
/// Month-triplet seasonal buckets.
pub mod season;
pub mod types;
pub mod validate;

pub use aggregate::SeasonalReport;
pub use engine::{Simulator, simulate};
pub use error::{InvariantViolation, SimError, ValidationError};
pub use kpi::AnnualReport;
pub use season::Season;
pub use types::{BatteryConfig, TimestepInput, TimestepResult};
