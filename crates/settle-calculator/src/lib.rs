#![deny(warnings)]
//! The allocation and calculator ecosystem for settle.
//!
//! [`prorate`] is the exact-sum allocator used to spread order-level amounts
//! (discounts, refunds, surcharges) across lines. The [`Calculator`] registry
//! exposes it, and related helpers, to rule actions by name.

pub mod allocation;
pub mod built_in;
pub mod calculator;
pub mod plugin;
pub mod plugin_manager;
pub mod types;

pub use allocation::{
    AllocationError, LineAllocation, LineWeight, allocate_adjustment, prorate, try_prorate,
};
pub use calculator::Calculator;
pub use plugin::{CalculationResult, CalculatorPlugin};
pub use settle_types::EntityValue;
pub use types::{CalculatorError, ErrorCode};
