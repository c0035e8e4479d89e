//! Proportional allocation of integer amounts
//!
//! Splits a total (minor currency units, may be negative) across weighted
//! buckets using the largest-remainder method:
//!
//! 1. every bucket gets the floor of its ideal share
//!    `amount * weight / total_weight` (or `amount / n` when all weights are zero)
//! 2. the shortfall is handed out one unit at a time to the bucket with the
//!    largest remaining fractional error, first index winning exact ties
//!
//! The result always sums to `amount`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

/// Rejected allocation input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("cannot allocate across an empty weight list")]
    EmptyWeights,

    #[error("weight {weight} at index {index} must be finite and non-negative")]
    InvalidWeight { index: usize, weight: f64 },

    #[error("line {line} has no units but was allocated {share}")]
    ZeroQuantity { line: usize, share: i64 },
}

/// Distribute `amount` across `weights` so that the parts sum exactly to `amount`.
///
/// Weights are expected to be finite and non-negative; use [`try_prorate`] when
/// the input has not been validated. An empty weight list yields an empty
/// allocation.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
#[must_use]
pub fn prorate(weights: &[f64], amount: i64) -> Vec<i64> {
    if weights.is_empty() {
        return Vec::new();
    }

    let total_weight: f64 = weights.iter().sum();
    let bucket_count = weights.len() as f64;
    let amount_f = amount as f64;

    let mut rounded = Vec::with_capacity(weights.len());
    let mut error = Vec::with_capacity(weights.len());
    for &weight in weights {
        let ideal = if total_weight == 0.0 {
            amount_f / bucket_count
        } else {
            amount_f * (weight / total_weight)
        };
        let floor = ideal.floor();
        rounded.push(floor as i64);
        error.push(ideal - floor);
    }

    // Floors of shares near the i64 limits can sum past them.
    let amount_wide = i128::from(amount);
    let mut added: i128 = rounded.iter().copied().map(i128::from).sum();
    let shortfall = amount_wide - added;

    while added < amount_wide {
        let index = largest_error(&error);
        rounded[index] += 1;
        error[index] -= 1.0;
        added += 1;
    }

    // Only reachable through float drift on extreme inputs; keeps the sum exact.
    while added > amount_wide {
        let index = smallest_error(&error);
        rounded[index] -= 1;
        error[index] += 1.0;
        added -= 1;
    }

    if shortfall != 0 {
        debug!(buckets = weights.len(), amount, shortfall, "distributed rounding remainder");
    }

    rounded
}

/// Validating wrapper around [`prorate`].
///
/// # Errors
///
/// [`AllocationError::EmptyWeights`] for an empty list and
/// [`AllocationError::InvalidWeight`] for a negative or non-finite weight.
pub fn try_prorate(weights: &[f64], amount: i64) -> Result<Vec<i64>, AllocationError> {
    if weights.is_empty() {
        return Err(AllocationError::EmptyWeights);
    }
    if let Some((index, &weight)) =
        weights.iter().enumerate().find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(AllocationError::InvalidWeight { index, weight });
    }
    Ok(prorate(weights, amount))
}

// Strict comparison: an equal error later in the list never displaces an earlier one.
fn largest_error(error: &[f64]) -> usize {
    let mut max_index = 0;
    for (index, e) in error.iter().enumerate().skip(1) {
        if *e > error[max_index] {
            max_index = index;
        }
    }
    max_index
}

fn smallest_error(error: &[f64]) -> usize {
    let mut min_index = 0;
    for (index, e) in error.iter().enumerate().skip(1) {
        if *e < error[min_index] {
            min_index = index;
        }
    }
    min_index
}

// Equal-weight prorate without building a weight list: the remainder goes one
// unit each to the first units.
fn split_evenly(total: i64, quantity: u32) -> Vec<i64> {
    let units = i64::from(quantity);
    let base = total.div_euclid(units);
    let remainder = total.rem_euclid(units);
    (0..units).map(|unit| if unit < remainder { base + 1 } else { base }).collect()
}

/// Weight and unit count of one order line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineWeight {
    /// Relative weight, usually the line price
    pub weight: f64,
    /// Number of units on the line
    pub quantity: u32,
}

/// One line's share of an order-level adjustment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAllocation {
    /// The line's share of the order amount
    pub total: i64,
    /// The line share split evenly across its units
    pub per_unit: Vec<i64>,
}

/// Split an order-level adjustment across lines by weight, then across each
/// line's units evenly. Both levels sum exactly.
///
/// # Errors
///
/// Any [`try_prorate`] error for the line weights, and
/// [`AllocationError::ZeroQuantity`] when a line without units receives a
/// non-zero share.
#[instrument(skip(lines), fields(lines = lines.len()))]
pub fn allocate_adjustment(
    lines: &[LineWeight],
    amount: i64,
) -> Result<Vec<LineAllocation>, AllocationError> {
    let weights: Vec<f64> = lines.iter().map(|line| line.weight).collect();
    let totals = try_prorate(&weights, amount)?;

    lines
        .iter()
        .zip(totals)
        .enumerate()
        .map(|(index, (line, total))| {
            if line.quantity == 0 {
                if total != 0 {
                    return Err(AllocationError::ZeroQuantity { line: index, share: total });
                }
                return Ok(LineAllocation { total, per_unit: Vec::new() });
            }
            Ok(LineAllocation { total, per_unit: split_evenly(total, line.quantity) })
        })
        .collect()
}
