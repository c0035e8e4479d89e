use std::collections::HashMap;

use settle_calculator::built_in::proportional_share::ProportionalShareCalculator;
use settle_calculator::built_in::prorate::ProrateCalculator;
use settle_calculator::plugin::CalculatorPlugin;
use settle_calculator::{Calculator, EntityValue, ErrorCode};

fn calculate_with<C: CalculatorPlugin>(
    calculator: C,
    inputs: &[(&str, EntityValue)],
) -> Result<EntityValue, settle_calculator::CalculatorError> {
    let var_refs: HashMap<String, &EntityValue> =
        inputs.iter().map(|(k, v)| (k.to_string(), v)).collect();
    calculator.calculate(&var_refs)
}

fn weights(values: &[i64]) -> EntityValue {
    EntityValue::Array(values.iter().copied().map(EntityValue::Integer).collect())
}

fn integers(value: EntityValue) -> Vec<i64> {
    value.as_array().unwrap().iter().map(|v| v.as_integer().unwrap()).collect()
}

#[test]
fn test_prorate_calculator_works() {
    let result = calculate_with(
        ProrateCalculator,
        &[("weights", weights(&[4300, 1400, 2300])), ("amount", EntityValue::Integer(299))],
    )
    .unwrap();
    assert_eq!(integers(result), vec![161, 52, 86]);
}

#[test]
fn test_prorate_calculator_accepts_aliases_and_whole_floats() {
    let result = calculate_with(
        ProrateCalculator,
        &[
            ("values", EntityValue::Array(vec![EntityValue::Float(0.5), EntityValue::Float(0.5)])),
            ("total_amount", EntityValue::Float(-300.0)),
        ],
    )
    .unwrap();
    assert_eq!(integers(result), vec![-150, -150]);
}

#[test]
fn test_prorate_calculator_rejects_bad_arguments() {
    let missing = calculate_with(ProrateCalculator, &[("weights", weights(&[1, 2]))]).unwrap_err();
    assert_eq!(missing.code, ErrorCode::MissingRequiredField);

    let fractional = calculate_with(
        ProrateCalculator,
        &[("weights", weights(&[1, 2])), ("amount", EntityValue::Float(10.5))],
    )
    .unwrap_err();
    assert_eq!(fractional.code, ErrorCode::InvalidFieldValue);

    let not_numbers = calculate_with(
        ProrateCalculator,
        &[
            ("weights", EntityValue::Array(vec![EntityValue::from("heavy")])),
            ("amount", EntityValue::Integer(10)),
        ],
    )
    .unwrap_err();
    assert_eq!(not_numbers.code, ErrorCode::InvalidFieldType);
    assert!(not_numbers.message.contains("weights[0]"));

    let negative = calculate_with(
        ProrateCalculator,
        &[("weights", weights(&[1, -2])), ("amount", EntityValue::Integer(10))],
    )
    .unwrap_err();
    assert_eq!(negative.code, ErrorCode::InvalidFieldValue);
}

#[test]
fn test_proportional_share_calculator_works() {
    let result = calculate_with(
        ProportionalShareCalculator,
        &[
            ("amount", EntityValue::Integer(299)),
            ("weight", EntityValue::Integer(4300)),
            ("total_weight", EntityValue::Integer(8000)),
        ],
    )
    .unwrap();
    assert_eq!(result, EntityValue::Integer(160));

    let zero_total = calculate_with(
        ProportionalShareCalculator,
        &[
            ("amount", EntityValue::Integer(299)),
            ("weight", EntityValue::Integer(0)),
            ("total_weight", EntityValue::Integer(0)),
        ],
    )
    .unwrap();
    assert_eq!(zero_total, EntityValue::Integer(0));
}

#[test]
fn test_registry_dispatches_by_name() {
    let calculator = Calculator::new();
    assert_eq!(calculator.available(), vec!["proportional_share", "prorate"]);

    let weights = weights(&[10, 0]);
    let amount = EntityValue::Integer(40);
    let args: HashMap<String, &EntityValue> =
        [("weights".to_string(), &weights), ("amount".to_string(), &amount)].into_iter().collect();

    let result = calculator.calculate("prorate", &args).unwrap();
    assert_eq!(integers(result), vec![40, 0]);

    let err = calculator.calculate("tax", &args).unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}
