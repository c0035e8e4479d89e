//! Prorate Calculator
//!
//! Splits an integer `amount` across `weights` so that the parts sum exactly to
//! the amount. Returns an array of integers aligned with the weights.
//!
//! Supported aliases for inputs:
//!   * Weights: `weights`, `values`
//!   * Amount: `amount`, `total_amount`
//!
use settle_types::EntityValue;
use std::collections::HashMap;

use super::{extract_amount, extract_weights};
use crate::allocation::try_prorate;
use crate::plugin::{CalculationResult, CalculatorPlugin};

#[derive(Debug, Default)]
pub struct ProrateCalculator;

impl CalculatorPlugin for ProrateCalculator {
    fn name(&self) -> &str {
        "prorate"
    }

    fn calculate(&self, args: &HashMap<String, &EntityValue>) -> CalculationResult {
        let weights = extract_weights(args, &["weights", "values"])?;
        let amount = extract_amount(args, &["amount", "total_amount"])?;

        let allocation = try_prorate(&weights, amount)?;
        Ok(EntityValue::Array(allocation.into_iter().map(EntityValue::Integer).collect()))
    }
}
