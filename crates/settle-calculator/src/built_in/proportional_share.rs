//! Proportional Share Calculator
//!
//! Computes a single bucket's floor share of `amount` relative to a total:
//!
//! result = floor(amount * (weight / total_weight))
//!
//! Returns 0 when `total_weight` is 0. Summing independent shares does not
//! reproduce the amount; use `prorate` when every bucket is known.

use settle_types::EntityValue;
use std::collections::HashMap;

use super::{extract_amount, extract_number};
use crate::plugin::{CalculationResult, CalculatorPlugin};
use crate::types::CalculatorError;

#[derive(Debug, Default)]
pub struct ProportionalShareCalculator;

impl CalculatorPlugin for ProportionalShareCalculator {
    fn name(&self) -> &str {
        "proportional_share"
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn calculate(&self, args: &HashMap<String, &EntityValue>) -> CalculationResult {
        let amount = extract_amount(args, &["amount", "total_amount"])?;
        let weight = extract_number(args, &["weight", "individual_value", "value"])?;
        let total_weight = extract_number(args, &["total_weight", "total_value", "aggregate"])?;

        if weight < 0.0 || total_weight < 0.0 {
            return Err(CalculatorError::invalid_value("weight", "weights must be non-negative"));
        }
        if total_weight == 0.0 {
            return Ok(EntityValue::Integer(0));
        }

        let share = (amount as f64 * (weight / total_weight)).floor();
        Ok(EntityValue::Integer(share as i64))
    }
}
