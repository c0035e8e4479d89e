use proptest::prelude::*;
use serde_json::json;
use settle_core::{Entity, EntityValue, MergeOptions, merge_deep, merge_json};

fn value(json: serde_json::Value) -> EntityValue {
    EntityValue::from_json(&json).unwrap()
}

fn line<'a>(order: &'a EntityValue, id: &str) -> &'a EntityValue {
    order
        .pointer(&["lines"])
        .and_then(EntityValue::as_array)
        .unwrap()
        .iter()
        .find(|line| line.identity("id") == Some(&EntityValue::from(id)))
        .unwrap()
}

#[test]
fn test_lines_fetched_in_swapped_order_do_not_cross_contaminate() {
    let prefetched = value(json!({
        "id": "order1",
        "code": "ABC",
        "lines": [
            { "id": "line1", "sales": [{ "id": "sale-of-line-1" }] },
            { "id": "line2", "sales": [{ "id": "sale-of-line-2" }] }
        ]
    }));
    let hydrated = value(json!({
        "id": "order1",
        "lines": [
            { "id": "line2", "productVariant": { "id": "variant-of-line-2" } },
            { "id": "line1", "productVariant": { "id": "variant-of-line-1" } }
        ]
    }));

    let merged = merge_deep(Some(prefetched), hydrated);

    for (line_id, sale, variant) in [
        ("line1", "sale-of-line-1", "variant-of-line-1"),
        ("line2", "sale-of-line-2", "variant-of-line-2"),
    ] {
        let line = line(&merged, line_id);
        let sales = line.pointer(&["sales"]).and_then(EntityValue::as_array).unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].identity("id"), Some(&EntityValue::from(sale)));
        assert_eq!(line.pointer(&["productVariant", "id"]), Some(&EntityValue::from(variant)));
    }
    assert_eq!(merged.pointer(&["code"]), Some(&EntityValue::from("ABC")));
}

#[test]
fn test_omitted_relations_are_preserved() {
    let existing = value(json!({
        "id": "order1",
        "customer": { "id": "c1", "addresses": [{ "id": "a1", "city": "Leeds" }] },
        "lines": [{ "id": "line1", "quantity": 1 }]
    }));
    let incoming = value(json!({ "id": "order1", "lines": [{ "id": "line1", "quantity": 3 }] }));

    let merged = merge_deep(Some(existing.clone()), incoming);
    assert_eq!(merged.pointer(&["customer"]), existing.pointer(&["customer"]));
    assert_eq!(line(&merged, "line1").pointer(&["quantity"]), Some(&EntityValue::Integer(3)));
}

#[test]
fn test_merging_a_tree_with_itself_changes_nothing() {
    let order = value(json!({
        "id": "order1",
        "lines": [
            { "id": "line1", "items": [{ "id": "i1" }, { "id": "i2" }], "tags": ["a", "b"] },
            { "id": "line2", "items": [], "tags": [] }
        ],
        "total": 12.5,
        "active": true,
        "note": null
    }));
    assert_eq!(merge_deep(Some(order.clone()), order.clone()), order);
}

#[test]
fn test_json_documents_merge_end_to_end() {
    let existing = json!({ "id": "o1", "lines": [{ "id": "l1", "sku": "A" }, { "id": "l2", "sku": "B" }] });
    let incoming = json!({ "id": "o1", "lines": [{ "id": "l2", "qty": 2 }, { "id": "l1", "qty": 1 }] });

    let merged = merge_json(Some(&existing), &incoming, &MergeOptions::default()).unwrap();
    assert_eq!(
        merged,
        json!({ "id": "o1", "lines": [{ "id": "l1", "sku": "A", "qty": 1 }, { "id": "l2", "sku": "B", "qty": 2 }] })
    );

    let fresh = merge_json(None, &incoming, &MergeOptions::default()).unwrap();
    assert_eq!(fresh, incoming);
}

fn leaf() -> impl Strategy<Value = EntityValue> {
    prop_oneof![
        Just(EntityValue::Null),
        any::<bool>().prop_map(EntityValue::Boolean),
        any::<i64>().prop_map(EntityValue::Integer),
        (-1.0e6f64..1.0e6).prop_map(EntityValue::Float),
        "[a-z]{0,8}".prop_map(EntityValue::String),
    ]
}

fn tree() -> impl Strategy<Value = EntityValue> {
    leaf().prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(EntityValue::Array),
            prop::collection::hash_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|fields| EntityValue::Object(Entity::from(fields))),
        ]
    })
}

proptest! {
    #[test]
    fn test_merge_is_idempotent(order in tree()) {
        prop_assert_eq!(merge_deep(Some(order.clone()), order.clone()), order);
    }

    #[test]
    fn test_absent_existing_is_identity(order in tree()) {
        prop_assert_eq!(merge_deep(None, order.clone()), order);
    }

    #[test]
    fn test_empty_incoming_entity_preserves_everything(order in tree()) {
        let existing = EntityValue::Object(Entity::new().with("order", order));
        let merged = merge_deep(Some(existing.clone()), EntityValue::Object(Entity::new()));
        prop_assert_eq!(merged, existing);
    }

    #[test]
    fn test_keyed_arrays_reconcile_regardless_of_order(
        shuffled in Just((0..8).collect::<Vec<i64>>()).prop_shuffle(),
    ) {
        let existing: Vec<EntityValue> = (0..8i64)
            .map(|id| EntityValue::Object(Entity::new().with("id", id).with("sale", id * 10)))
            .collect();
        let incoming: Vec<EntityValue> = shuffled
            .iter()
            .map(|&id| EntityValue::Object(Entity::new().with("id", id).with("variant", id * 100)))
            .collect();

        let merged = merge_deep(Some(EntityValue::Array(existing)), EntityValue::Array(incoming));
        let lines = merged.as_array().unwrap();
        prop_assert_eq!(lines.len(), 8);
        for (position, line) in lines.iter().enumerate() {
            let id = position as i64;
            prop_assert_eq!(line.identity("id"), Some(&EntityValue::Integer(id)));
            prop_assert_eq!(line.pointer(&["sale"]), Some(&EntityValue::Integer(id * 10)));
            prop_assert_eq!(line.pointer(&["variant"]), Some(&EntityValue::Integer(id * 100)));
        }
    }
}
