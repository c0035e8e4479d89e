//! # Merge
//!
//! Reconciles a previously loaded entity tree with a freshly hydrated, possibly
//! partial, tree of the same shape.
//!
//! - incoming scalars always overwrite existing ones
//! - arrays and keyed structures are merged recursively, so a relation the
//!   incoming query did not select survives from the existing tree
//! - read-only fields of an incoming entity are never applied
//! - arrays of keyed entities are aligned by identity before the positional
//!   merge (see [`crate::reconcile`])
//!
//! Both inputs are consumed and a new tree is returned.

use serde::{Deserialize, Serialize};
use settle_types::{DEFAULT_IDENTITY_KEY, Entity, EntityValue};
use std::str::FromStr;
use tracing::{debug, instrument, trace};

use crate::error::{SettleError, SettleResult};
use crate::reconcile::{Alignment, IdentityIndex, align, reorder};

/// What to do with keyed arrays whose lengths or identity sets differ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedArrayPolicy {
    /// Merge position by position without reordering
    #[default]
    Positional,
    /// Keep the incoming membership and order. Incoming elements merge with the
    /// existing element of the same identity; existing-only elements are dropped.
    MatchById,
}

impl FromStr for UnmatchedArrayPolicy {
    type Err = SettleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positional" => Ok(Self::Positional),
            "match_by_id" | "match-by-id" => Ok(Self::MatchById),
            other => Err(SettleError::configuration(
                "merge.unmatched_arrays",
                format!("unknown policy '{other}', expected 'positional' or 'match_by_id'"),
            )),
        }
    }
}

/// Tunables for [`merge_deep_with`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Field correlating array elements across the two trees
    pub identity_key: String,
    pub unmatched_arrays: UnmatchedArrayPolicy,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            identity_key: DEFAULT_IDENTITY_KEY.to_string(),
            unmatched_arrays: UnmatchedArrayPolicy::default(),
        }
    }
}

/// Merge `incoming` into `existing` with the default options.
///
/// An absent `existing` returns `incoming` unchanged.
pub fn merge_deep(existing: Option<EntityValue>, incoming: EntityValue) -> EntityValue {
    merge_deep_with(existing, incoming, &MergeOptions::default())
}

/// Merge `incoming` into `existing`.
#[instrument(skip_all, fields(identity_key = %options.identity_key))]
pub fn merge_deep_with(
    existing: Option<EntityValue>,
    incoming: EntityValue,
    options: &MergeOptions,
) -> EntityValue {
    merge_node(existing, incoming, options)
}

/// Fold several partial hydration results, oldest first.
pub fn merge_all<I>(sources: I, options: &MergeOptions) -> Option<EntityValue>
where
    I: IntoIterator<Item = EntityValue>,
{
    sources.into_iter().fold(None, |merged, next| Some(merge_node(merged, next, options)))
}

/// JSON-in, JSON-out merge for collaborators that hold hydration results as
/// documents.
///
/// # Errors
///
/// [`SettleError::Serialization`] when either document holds a number that fits
/// neither `i64` nor `f64`.
pub fn merge_json(
    existing: Option<&serde_json::Value>,
    incoming: &serde_json::Value,
    options: &MergeOptions,
) -> SettleResult<serde_json::Value> {
    let existing = existing
        .map(EntityValue::from_json)
        .transpose()
        .map_err(|e| SettleError::serialization("existing", e.to_string()))?;
    let incoming = EntityValue::from_json(incoming)
        .map_err(|e| SettleError::serialization("incoming", e.to_string()))?;
    Ok(merge_deep_with(existing, incoming, options).into())
}

fn merge_node(
    existing: Option<EntityValue>,
    incoming: EntityValue,
    options: &MergeOptions,
) -> EntityValue {
    let Some(existing) = existing else {
        return incoming;
    };

    match (existing, incoming) {
        (EntityValue::Array(existing), EntityValue::Array(incoming)) => {
            EntityValue::Array(merge_arrays(existing, incoming, options))
        }
        (EntityValue::Object(existing), EntityValue::Object(incoming)) => {
            EntityValue::Object(merge_entities(existing, incoming, options))
        }
        (existing, incoming) => {
            if incoming.is_container() && !existing.is_null() {
                trace!(
                    existing = existing.type_name(),
                    incoming = incoming.type_name(),
                    "shape mismatch, taking incoming value"
                );
            }
            incoming
        }
    }
}

fn merge_field(
    existing: Option<EntityValue>,
    incoming: EntityValue,
    options: &MergeOptions,
) -> EntityValue {
    if incoming.is_container() { merge_node(existing, incoming, options) } else { incoming }
}

fn merge_entities(existing: Entity, incoming: Entity, options: &MergeOptions) -> Entity {
    let (mut fields, read_only) = existing.into_parts();
    let (incoming_fields, incoming_read_only) = incoming.into_parts();

    for (key, value) in incoming_fields {
        if incoming_read_only.contains(&key) {
            trace!(field = %key, "skipping read-only field");
            continue;
        }
        let merged = merge_field(fields.remove(&key), value, options);
        fields.insert(key, merged);
    }

    Entity::from_parts(fields, read_only)
}

fn merge_arrays(
    existing: Vec<EntityValue>,
    incoming: Vec<EntityValue>,
    options: &MergeOptions,
) -> Vec<EntityValue> {
    match align(&existing, &incoming, &options.identity_key) {
        Alignment::Positional => merge_positional(existing, incoming, options),
        Alignment::Reordered(targets) => {
            debug!(len = incoming.len(), "reordering incoming array to existing identity order");
            merge_positional(existing, reorder(incoming, &targets), options)
        }
        Alignment::Unmatched => match options.unmatched_arrays {
            UnmatchedArrayPolicy::Positional => {
                debug!(
                    existing = existing.len(),
                    incoming = incoming.len(),
                    "identity sets differ, merging positionally"
                );
                merge_positional(existing, incoming, options)
            }
            UnmatchedArrayPolicy::MatchById => {
                debug!(
                    existing = existing.len(),
                    incoming = incoming.len(),
                    "identity sets differ, matching by identity"
                );
                merge_by_identity(existing, incoming, options)
            }
        },
    }
}

// Elements past the end of `incoming` are absent from it, so they are kept.
fn merge_positional(
    existing: Vec<EntityValue>,
    incoming: Vec<EntityValue>,
    options: &MergeOptions,
) -> Vec<EntityValue> {
    let mut existing = existing.into_iter();
    let mut merged = Vec::with_capacity(incoming.len().max(existing.len()));
    for value in incoming {
        merged.push(merge_field(existing.next(), value, options));
    }
    merged.extend(existing);
    merged
}

fn merge_by_identity(
    existing: Vec<EntityValue>,
    incoming: Vec<EntityValue>,
    options: &MergeOptions,
) -> Vec<EntityValue> {
    let key = options.identity_key.as_str();
    let targets: Vec<Option<usize>> = {
        let mut index = IdentityIndex::new(&existing, key);
        incoming.iter().map(|node| node.identity(key).and_then(|id| index.take(id))).collect()
    };

    let mut slots: Vec<Option<EntityValue>> = existing.into_iter().map(Some).collect();
    incoming
        .into_iter()
        .zip(targets)
        .map(|(value, target)| {
            let prior = target.and_then(|position| slots[position].take());
            merge_field(prior, value, options)
        })
        .collect()
}
