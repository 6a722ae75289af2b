//! Iteration over the resources of a Bundle or a single resource.

use serde_json::Value;

use crate::path;

pub const EXPLANATION_OF_BENEFIT: &str = "ExplanationOfBenefit";

pub fn resource_type(resource: &Value) -> Option<&str> {
    path::get_str(resource, "resourceType")
}

pub fn is_resource_type(resource: &Value, expected: &str) -> bool {
    resource_type(resource) == Some(expected)
}

/// Resources wrapped by `entry[].resource`. A value that is not a Bundle but
/// carries a `resourceType` is yielded as the only resource. Entries without
/// a `resource` are skipped.
pub fn resources(value: &Value) -> Vec<&Value> {
    match resource_type(value) {
        Some("Bundle") | None if value.get("entry").is_some() => path::get_array(value, "entry")
            .iter()
            .filter_map(|entry| path::get(entry, "resource"))
            .collect(),
        Some("Bundle") | None => Vec::new(),
        Some(_) => vec![value],
    }
}
