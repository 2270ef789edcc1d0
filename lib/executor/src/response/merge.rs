use serde_json::{Map, Value};

/// Merges `source` into `target`. Values already present in `target` win, objects are merged
/// recursively and lists element-wise.
pub fn deep_merge_missing(target: &mut Value, source: Value) {
    match (target, source) {
        (_, Value::Null) => {}
        (Value::Object(target_map), Value::Object(source_map)) => {
            merge_missing_fields(target_map, source_map);
        }
        (Value::Array(target_items), Value::Array(source_items)) => {
            for (target_item, source_item) in target_items.iter_mut().zip(source_items) {
                deep_merge_missing(target_item, source_item);
            }
        }
        // Existing non-null values are kept.
        (target_value, source_value) => {
            if target_value.is_null() {
                *target_value = source_value;
            }
        }
    }
}

pub fn merge_missing_fields(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, source_value) in source {
        match target.get_mut(&key) {
            Some(target_value) => deep_merge_missing(target_value, source_value),
            None => {
                target.insert(key, source_value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::deep_merge_missing;

    #[test]
    fn existing_fields_win() {
        let mut stub = json!({
            "_id": "k1",
            "name": "from feeds",
            "_stitch_key__id": "k1",
            "owner": { "login": "ada" }
        });

        deep_merge_missing(
            &mut stub,
            json!({
                "name": "from model",
                "tenantCode": "hello tenant",
                "owner": { "login": "grace", "email": "ada@example.com" }
            }),
        );

        assert_eq!(
            stub,
            json!({
                "_id": "k1",
                "name": "from feeds",
                "_stitch_key__id": "k1",
                "owner": { "login": "ada", "email": "ada@example.com" },
                "tenantCode": "hello tenant"
            })
        );
    }

    #[test]
    fn null_never_overrides() {
        let mut stub = json!({ "items": [{ "a": 1 }, { "a": 2 }] });

        deep_merge_missing(&mut stub, json!({ "items": [{ "b": 1 }, null] }));
        deep_merge_missing(&mut stub, Value::Null);

        assert_eq!(stub, json!({ "items": [{ "a": 1, "b": 1 }, { "a": 2 }] }));
    }
}
