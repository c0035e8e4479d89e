//! Settle Types
//!
//! This crate defines the entity value model used throughout the settle
//! ecosystem (currently `settle-calculator` and `settle-core`). An order, its
//! lines and every nested relation a hydration query returns are represented as
//! an [`EntityValue`] tree whose keyed structures are [`Entity`] records.

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(missing_docs)]

mod entity;
mod types;

pub use entity::Entity;
pub use types::EntityValue;

/// Field name used to correlate array elements when no other key is configured.
pub const DEFAULT_IDENTITY_KEY: &str = "id";
