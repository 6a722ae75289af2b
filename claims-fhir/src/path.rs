//! Dot-path lookup over untrusted JSON trees.
//!
//! A path like `diagnosisCodeableConcept.coding.0.code` is walked one
//! segment at a time. Object nodes are indexed by key, array nodes by a
//! numeric segment. Any missing or `null` node ends the walk.

use serde_json::Value;

/// Resolve `path` inside `tree`, returning `None` as soon as a segment is absent.
pub fn get<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(tree, |node, segment| {
        let next = match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            _ => None,
        }?;
        (!next.is_null()).then_some(next)
    })
}

/// Like [`get`], falling back to `default`.
pub fn get_or<'a>(tree: &'a Value, path: &str, default: &'a Value) -> &'a Value {
    get(tree, path).unwrap_or(default)
}

pub fn get_str<'a>(tree: &'a Value, path: &str) -> Option<&'a str> {
    get(tree, path).and_then(Value::as_str)
}

pub fn get_string(tree: &Value, path: &str) -> Option<String> {
    get_str(tree, path).map(str::to_string)
}

/// String at `path`, or `default` when absent or not a string.
pub fn get_string_or(tree: &Value, path: &str, default: &str) -> String {
    get_str(tree, path).unwrap_or(default).to_string()
}

pub fn get_f64(tree: &Value, path: &str) -> Option<f64> {
    get(tree, path).and_then(Value::as_f64)
}

pub fn get_i64(tree: &Value, path: &str) -> Option<i64> {
    get(tree, path).and_then(Value::as_i64)
}

pub fn get_bool(tree: &Value, path: &str) -> Option<bool> {
    get(tree, path).and_then(Value::as_bool)
}

/// Array at `path`, or an empty slice.
pub fn get_array<'a>(tree: &'a Value, path: &str) -> &'a [Value] {
    get(tree, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn walks_objects_and_array_indices() {
        let tree = json!({
            "diagnosisCodeableConcept": {
                "coding": [{ "code": "E11.9", "display": "Diabetes" }]
            }
        });
        assert_eq!(
            get_str(&tree, "diagnosisCodeableConcept.coding.0.code"),
            Some("E11.9")
        );
        assert_eq!(get_str(&tree, "diagnosisCodeableConcept.coding.1.code"), None);
    }

    #[test]
    fn absent_paths_fall_back_to_default() {
        let default = json!("N/A");
        let samples = [
            json!(null),
            json!(42),
            json!("text"),
            json!([]),
            json!({ "a": null }),
            json!({ "a": { "b": 1 } }),
            json!({ "a": [1, 2] }),
        ];
        for tree in &samples {
            assert_eq!(get_or(tree, "a.b.c", &default), &default, "tree {tree}");
            assert_eq!(get_or(tree, "", &default), &default);
        }
    }

    #[test]
    fn null_leaf_counts_as_missing() {
        let tree = json!({ "payment": { "amount": null } });
        assert!(get(&tree, "payment.amount").is_none());
        assert_eq!(get_f64(&tree, "payment.amount.value"), None);
    }

    #[test]
    fn non_numeric_segment_on_array_is_missing() {
        let tree = json!({ "item": [{ "sequence": 1 }] });
        assert!(get(&tree, "item.first.sequence").is_none());
        assert_eq!(get_i64(&tree, "item.0.sequence"), Some(1));
    }

    #[test]
    fn typed_helpers_reject_wrong_types() {
        let tree = json!({ "responsible": "yes", "quantity": { "value": "3" } });
        assert_eq!(get_bool(&tree, "responsible"), None);
        assert_eq!(get_f64(&tree, "quantity.value"), None);
        assert!(get_array(&tree, "quantity").is_empty());
        assert_eq!(get_string_or(&tree, "missing", "Unknown"), "Unknown");
    }
}
