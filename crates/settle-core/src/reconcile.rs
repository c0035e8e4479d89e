//! Identity reconciliation for arrays of keyed entities
//!
//! Two hydration queries for the same order can return its lines in different
//! database orders. Before arrays are merged position by position, the incoming
//! array is checked against the existing one by identity and, when both hold
//! the same entities, reordered to the existing order. Correlation goes through
//! an explicit identity → positions index, never through array position.

use settle_types::EntityValue;
use std::collections::{HashMap, VecDeque};

/// Positions of keyed nodes in an array, grouped by identity value.
///
/// Duplicate identities keep their positions in ascending order so that the
/// n-th occurrence on one side pairs with the n-th occurrence on the other.
#[derive(Debug)]
pub struct IdentityIndex<'a> {
    positions: HashMap<&'a EntityValue, VecDeque<usize>>,
    unkeyed: usize,
}

impl<'a> IdentityIndex<'a> {
    /// Index every node of `nodes` that carries `key`.
    pub fn new(nodes: &'a [EntityValue], key: &str) -> Self {
        let mut positions: HashMap<&'a EntityValue, VecDeque<usize>> = HashMap::new();
        let mut unkeyed = 0;
        for (position, node) in nodes.iter().enumerate() {
            match node.identity(key) {
                Some(id) => positions.entry(id).or_default().push_back(position),
                None => unkeyed += 1,
            }
        }
        Self { positions, unkeyed }
    }

    /// Whether every indexed node carried an identity
    pub fn is_complete(&self) -> bool {
        self.unkeyed == 0
    }

    /// Claim the next unclaimed position holding `id`.
    pub fn take(&mut self, id: &EntityValue) -> Option<usize> {
        self.positions.get_mut(id)?.pop_front()
    }
}

/// How an incoming array lines up with the existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alignment {
    /// Merge position by position as given
    Positional,
    /// Same entities in another order; `targets[i]` is the existing position of
    /// incoming element `i`
    Reordered(Vec<usize>),
    /// Keyed arrays whose lengths or identity sets differ
    Unmatched,
}

/// Decide how `incoming` lines up with `existing`.
///
/// Arrays are only considered keyed when `existing` is non-empty and its first
/// element carries the identity key; anything else merges positionally.
pub fn align(existing: &[EntityValue], incoming: &[EntityValue], key: &str) -> Alignment {
    let Some(first) = existing.first() else {
        return Alignment::Positional;
    };
    if first.identity(key).is_none() || incoming.is_empty() {
        return Alignment::Positional;
    }
    if existing.len() != incoming.len() {
        return Alignment::Unmatched;
    }

    let same_sequence = existing
        .iter()
        .zip(incoming)
        .all(|(e, i)| e.identity(key) == i.identity(key));
    if same_sequence {
        return Alignment::Positional;
    }

    let mut index = IdentityIndex::new(existing, key);
    if !index.is_complete() {
        return Alignment::Unmatched;
    }

    let mut targets = Vec::with_capacity(incoming.len());
    for node in incoming {
        match node.identity(key).and_then(|id| index.take(id)) {
            Some(position) => targets.push(position),
            None => return Alignment::Unmatched,
        }
    }
    Alignment::Reordered(targets)
}

/// Move every element to its target position. `targets` must be a permutation
/// of `0..nodes.len()`, as produced by [`align`].
pub fn reorder(nodes: Vec<EntityValue>, targets: &[usize]) -> Vec<EntityValue> {
    let mut slots: Vec<Option<EntityValue>> = (0..nodes.len()).map(|_| None).collect();
    for (node, &target) in nodes.into_iter().zip(targets) {
        slots[target] = Some(node);
    }
    slots.into_iter().flatten().collect()
}
