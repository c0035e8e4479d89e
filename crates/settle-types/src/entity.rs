use crate::EntityValue;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A keyed structure inside an entity tree (an order, a line, a variant, ...).
///
/// Besides its fields an entity remembers which of them are read-only. Those
/// are derived or computed values owned by the entity itself; a merge never
/// copies a read-only field from an incoming entity onto an existing one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "HashMap<String, EntityValue>",
    into = "HashMap<String, EntityValue>"
)]
pub struct Entity {
    fields: HashMap<String, EntityValue>,
    read_only: HashSet<String>,
}

impl Entity {
    /// Create an empty entity
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<EntityValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Builder-style insertion of a field that must not be overwritten by a merge
    #[must_use]
    pub fn with_read_only(mut self, key: impl Into<String>, value: impl Into<EntityValue>) -> Self {
        let key = key.into();
        self.read_only.insert(key.clone());
        self.fields.insert(key, value.into());
        self
    }

    /// Insert or replace a field, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: EntityValue) -> Option<EntityValue> {
        self.fields.insert(key.into(), value)
    }

    /// Look up a field
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&EntityValue> {
        self.fields.get(key)
    }

    /// Mutable lookup of a field
    pub fn get_mut(&mut self, key: &str) -> Option<&mut EntityValue> {
        self.fields.get_mut(key)
    }

    /// Remove a field and its read-only marker
    pub fn remove(&mut self, key: &str) -> Option<EntityValue> {
        self.read_only.remove(key);
        self.fields.remove(key)
    }

    /// Whether the field is present (a `Null` value counts as present)
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Mark a field as read-only
    pub fn mark_read_only(&mut self, key: impl Into<String>) {
        self.read_only.insert(key.into());
    }

    /// Whether a merge may take this field from the entity
    #[must_use]
    pub fn is_writable(&self, key: &str) -> bool {
        !self.read_only.contains(key)
    }

    /// Names of the read-only fields
    pub fn read_only_fields(&self) -> impl Iterator<Item = &str> {
        self.read_only.iter().map(String::as_str)
    }

    /// The identity value stored under `key`, ignoring `Null`
    #[must_use]
    pub fn identity(&self, key: &str) -> Option<&EntityValue> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// Iterate over the fields in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &EntityValue)> {
        self.fields.iter()
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the entity has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Split into the field map and the read-only marker set
    #[must_use]
    pub fn into_parts(self) -> (HashMap<String, EntityValue>, HashSet<String>) {
        (self.fields, self.read_only)
    }

    /// Reassemble an entity from its parts. Markers for absent fields are kept;
    /// they protect the field should it be inserted later.
    #[must_use]
    pub const fn from_parts(
        fields: HashMap<String, EntityValue>,
        read_only: HashSet<String>,
    ) -> Self {
        Self { fields, read_only }
    }
}

impl From<HashMap<String, EntityValue>> for Entity {
    fn from(fields: HashMap<String, EntityValue>) -> Self {
        Self { fields, read_only: HashSet::new() }
    }
}

impl From<Entity> for HashMap<String, EntityValue> {
    fn from(entity: Entity) -> Self {
        entity.fields
    }
}

impl<K: Into<String>> FromIterator<(K, EntityValue)> for Entity {
    fn from_iter<I: IntoIterator<Item = (K, EntityValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            read_only: HashSet::new(),
        }
    }
}

impl IntoIterator for Entity {
    type Item = (String, EntityValue);
    type IntoIter = std::collections::hash_map::IntoIter<String, EntityValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_fields_are_not_writable() {
        let entity = Entity::new().with("name", "Order").with_read_only("total", 1200_i64);

        assert!(entity.is_writable("name"));
        assert!(!entity.is_writable("total"));
        assert_eq!(entity.get("total"), Some(&EntityValue::Integer(1200)));
    }

    #[test]
    fn test_null_identity_is_ignored() {
        let entity = Entity::new().with("id", EntityValue::Null);
        assert!(entity.contains_key("id"));
        assert_eq!(entity.identity("id"), None);

        let entity = Entity::new().with("id", "line1");
        assert_eq!(entity.identity("id"), Some(&EntityValue::from("line1")));
    }

    #[test]
    fn test_remove_clears_read_only_marker() {
        let mut entity = Entity::new().with_read_only("total", 10_i64);
        assert_eq!(entity.remove("total"), Some(EntityValue::Integer(10)));
        assert!(entity.is_writable("total"));
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let entity = Entity::new().with("id", "line1").with_read_only("quantity", 2_i64);
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "line1", "quantity": 2 }));

        let back: Entity = serde_json::from_value(json).unwrap();
        assert_eq!(back.get("quantity"), Some(&EntityValue::Integer(2)));
        assert!(back.is_writable("quantity"));
    }
}
