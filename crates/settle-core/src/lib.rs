#![deny(warnings)]
#![allow(missing_docs)]
//! Core functionality for keeping an order's monetary and entity-graph state
//! internally consistent.
//!
//! Two independent, pure helpers live here:
//!
//! - [`prorate`] splits a total across weighted buckets with an exact sum
//! - [`merge_deep`] reconciles a previously loaded entity tree with a freshly
//!   hydrated partial one

/// Checked allocation reporting through `SettleError`
pub mod allocation;
/// Configuration loading with environment overrides
pub mod config;
/// Error types for core operations
pub mod error;
/// Deep merge of entity trees
pub mod merge;
/// Identity alignment of keyed arrays
pub mod reconcile;

pub use allocation::{prorate_checked, split_adjustment};
pub use config::{LoggingConfig, SettleConfig};
pub use error::{SettleError, SettleResult};
pub use merge::{
    MergeOptions, UnmatchedArrayPolicy, merge_all, merge_deep, merge_deep_with, merge_json,
};
pub use settle_calculator::{
    AllocationError, Calculator, LineAllocation, LineWeight, allocate_adjustment, prorate,
    try_prorate,
};
pub use settle_types::{Entity, EntityValue};
