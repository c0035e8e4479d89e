//! Built-in calculators provided by the settle engine.

use settle_types::EntityValue;
use std::collections::HashMap;

use crate::types::CalculatorError;

// Allocation calculators
pub mod proportional_share;
pub mod prorate;

fn find_arg<'a>(
    args: &HashMap<String, &'a EntityValue>,
    names: &[&str],
) -> Result<&'a EntityValue, CalculatorError> {
    names
        .iter()
        .find_map(|&n| args.get(n).copied())
        .ok_or_else(|| CalculatorError::missing(names[0]))
}

fn extract_number(
    args: &HashMap<String, &EntityValue>,
    names: &[&str],
) -> Result<f64, CalculatorError> {
    let value = find_arg(args, names)?;
    value
        .as_f64()
        .ok_or_else(|| CalculatorError::invalid_type(names[0], "a number", value.type_name()))
}

/// Integral amounts may arrive as whole floats from JSON producers.
#[allow(clippy::cast_possible_truncation)]
fn extract_amount(
    args: &HashMap<String, &EntityValue>,
    names: &[&str],
) -> Result<i64, CalculatorError> {
    match find_arg(args, names)? {
        EntityValue::Integer(i) => Ok(*i),
        EntityValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(*f as i64),
        EntityValue::Float(f) => {
            Err(CalculatorError::invalid_value(names[0], format!("{f} is not a whole amount")))
        }
        other => Err(CalculatorError::invalid_type(names[0], "an integer", other.type_name())),
    }
}

fn extract_weights(
    args: &HashMap<String, &EntityValue>,
    names: &[&str],
) -> Result<Vec<f64>, CalculatorError> {
    let value = find_arg(args, names)?;
    let items = value
        .as_array()
        .ok_or_else(|| CalculatorError::invalid_type(names[0], "an array", value.type_name()))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_f64().ok_or_else(|| {
                CalculatorError::invalid_type(
                    &format!("{}[{index}]", names[0]),
                    "a number",
                    item.type_name(),
                )
            })
        })
        .collect()
}
