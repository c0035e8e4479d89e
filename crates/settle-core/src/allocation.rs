//! Checked allocation entry points reporting through [`SettleError`]

use settle_calculator::{LineAllocation, LineWeight, allocate_adjustment, try_prorate};
use tracing::{debug, instrument};

use crate::error::{SettleError, SettleResult};

/// Validate `weights` and split `amount` across them.
///
/// # Errors
///
/// [`SettleError::Allocation`] for an empty list or a negative or non-finite weight.
#[instrument(skip(weights), fields(buckets = weights.len()))]
pub fn prorate_checked(weights: &[f64], amount: i64) -> SettleResult<Vec<i64>> {
    try_prorate(weights, amount).map_err(|err| {
        debug!(%err, "rejected allocation input");
        SettleError::from(err)
    })
}

/// Split an order adjustment across lines, then across each line's units.
///
/// # Errors
///
/// [`SettleError::Allocation`] for invalid line weights or a share assigned to
/// a line without units.
pub fn split_adjustment(lines: &[LineWeight], amount: i64) -> SettleResult<Vec<LineAllocation>> {
    Ok(allocate_adjustment(lines, amount)?)
}
