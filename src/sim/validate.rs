//! Shape checks shared by series alignment and the simulator.

use chrono::{NaiveDateTime, TimeDelta};

use super::error::ValidationError;

/// Checks that timestamps strictly increase at a constant interval.
///
/// When `expected` is `None` the interval is taken from the first pair.
/// Returns the interval found, or `None` for fewer than two timestamps.
///
/// # Errors
///
/// [`ValidationError::NonMonotonic`] for a timestamp that does not move
/// forward, [`ValidationError::IrregularInterval`] for a gap that differs from
/// the interval.
pub fn check_spacing<I>(
    timestamps: I,
    expected: Option<TimeDelta>,
) -> Result<Option<TimeDelta>, ValidationError>
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    let mut interval = expected;
    let mut previous: Option<NaiveDateTime> = None;

    for (index, timestamp) in timestamps.into_iter().enumerate() {
        if let Some(previous) = previous {
            let gap = timestamp - previous;
            if gap <= TimeDelta::zero() {
                return Err(ValidationError::NonMonotonic {
                    index,
                    previous,
                    timestamp,
                });
            }
            match interval {
                Some(step) if step != gap => {
                    return Err(ValidationError::IrregularInterval {
                        index,
                        expected_secs: step.num_seconds(),
                        actual_secs: gap.num_seconds(),
                    });
                }
                Some(_) => {}
                None => interval = Some(gap),
            }
        }
        previous = Some(timestamp);
    }

    Ok(if previous.is_some() { interval } else { None })
}

/// Rejects non-finite and negative power values.
///
/// # Errors
///
/// [`ValidationError::NonFiniteValue`] or [`ValidationError::NegativeValue`].
pub fn check_power(
    index: usize,
    quantity: &'static str,
    value: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { index, quantity });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue {
            index,
            quantity,
            value,
        });
    }
    Ok(())
}
