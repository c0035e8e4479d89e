use crate::built_in::{
    proportional_share::ProportionalShareCalculator, prorate::ProrateCalculator,
};
use crate::plugin::{CalculationResult, CalculatorPlugin};
use crate::plugin_manager::PluginManager;
use crate::types::{CalculatorError, ErrorCode};
use settle_types::EntityValue;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Named-calculator façade used by rule actions and the discount subsystem.
pub struct Calculator {
    plugin_manager: PluginManager,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        let mut plugin_manager = PluginManager::new();
        plugin_manager.register(Box::new(ProrateCalculator));
        plugin_manager.register(Box::new(ProportionalShareCalculator));
        Self { plugin_manager }
    }

    /// Add or replace a calculator.
    pub fn register(&mut self, plugin: Box<dyn CalculatorPlugin>) {
        self.plugin_manager.register(plugin);
    }

    pub fn available(&self) -> Vec<&str> {
        self.plugin_manager.names()
    }

    #[instrument(skip(self, args))]
    pub fn calculate(
        &self,
        calculator_name: &str,
        args: &HashMap<String, &EntityValue>,
    ) -> CalculationResult {
        if let Some(plugin) = self.plugin_manager.get(calculator_name) {
            let result = plugin.calculate(args);
            if let Err(err) = &result {
                debug!(code = ?err.code, "calculator rejected its arguments: {}", err.message);
            }
            result
        } else {
            Err(CalculatorError::new(
                ErrorCode::NotFound,
                format!("calculator '{calculator_name}' not found"),
            ))
        }
    }
}
