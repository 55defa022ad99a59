//! Sequential simulation over an aligned input series.

use tracing::debug;

use super::dispatch::dispatch_step;
use super::error::{InvariantViolation, SimError};
use super::types::{BatteryConfig, TimestepInput, TimestepResult};
use super::validate::{check_power, check_spacing};

/// Runs the dispatch policy across a whole input series.
///
/// Borrows the battery configuration for the lifetime of the run. The charge
/// level is threaded through a fold, so each row depends only on the row
/// before it and the result has exactly one row per input, in input order.
#[derive(Debug, Clone, Copy)]
pub struct Simulator<'a> {
    battery: &'a BatteryConfig,
}

impl<'a> Simulator<'a> {
    /// Creates a simulator for the given battery.
    pub fn new(battery: &'a BatteryConfig) -> Self {
        Self { battery }
    }

    /// Returns the battery this simulator dispatches.
    pub fn battery(&self) -> &BatteryConfig {
        self.battery
    }

    /// Simulates every timestep and returns the complete result table.
    ///
    /// # Errors
    ///
    /// - [`SimError::Validation`] if a value is negative or non-finite, or the
    ///   timestamps are not strictly increasing at a constant interval. No step
    ///   runs in that case.
    /// - [`SimError::Invariant`] if a step leaves the charge level outside
    ///   `[0, capacity]`.
    pub fn run(&self, inputs: &[TimestepInput]) -> Result<Vec<TimestepResult>, SimError> {
        validate_inputs(inputs)?;

        let mut results = Vec::with_capacity(inputs.len());
        let final_charge_kwh = inputs.iter().enumerate().try_fold(
            self.battery.initial_charge_kwh(),
            |charge_kwh, (index, input)| {
                let outcome = dispatch_step(charge_kwh, input, self.battery);
                self.check_charge_level(index, input, outcome.charge_level_kwh)?;
                results.push(TimestepResult::from_step(input, &outcome));
                Ok::<_, SimError>(outcome.charge_level_kwh)
            },
        )?;

        debug!(
            steps = results.len(),
            initial_charge_kwh = self.battery.initial_charge_kwh(),
            final_charge_kwh,
            "simulation finished"
        );
        Ok(results)
    }

    fn check_charge_level(
        &self,
        index: usize,
        input: &TimestepInput,
        charge_kwh: f64,
    ) -> Result<(), InvariantViolation> {
        let capacity_kwh = self.battery.capacity_kwh();
        if (0.0..=capacity_kwh).contains(&charge_kwh) {
            Ok(())
        } else {
            Err(InvariantViolation {
                index,
                timestamp: input.timestamp,
                charge_kwh,
                capacity_kwh,
            })
        }
    }
}

/// Convenience wrapper for [`Simulator::run`].
///
/// # Errors
///
/// See [`Simulator::run`].
pub fn simulate(
    inputs: &[TimestepInput],
    battery: &BatteryConfig,
) -> Result<Vec<TimestepResult>, SimError> {
    Simulator::new(battery).run(inputs)
}

fn validate_inputs(inputs: &[TimestepInput]) -> Result<(), SimError> {
    for (index, input) in inputs.iter().enumerate() {
        check_power(index, "PV generation", input.pv_generation_kw)?;
        check_power(index, "household load", input.household_load_kw)?;
    }
    check_spacing(inputs.iter().map(|i| i.timestamp), None)?;
    Ok(())
}
