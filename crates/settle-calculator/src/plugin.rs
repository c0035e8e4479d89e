use settle_types::EntityValue;
use std::collections::HashMap;

use crate::types::CalculatorError;

pub type CalculationResult = Result<EntityValue, CalculatorError>;

/// A trait for calculator plugins.
pub trait CalculatorPlugin: Send + Sync {
    /// The name of the calculator.
    fn name(&self) -> &str;

    /// Performs the calculation.
    fn calculate(&self, args: &HashMap<String, &EntityValue>) -> CalculationResult;
}
