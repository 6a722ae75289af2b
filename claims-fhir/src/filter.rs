//! Claim-type selection over ExplanationOfBenefit bundles.

use claims_core::ClaimType;
use serde_json::{Map, Value};

use crate::{
    bundle::{self, EXPLANATION_OF_BENEFIT},
    path,
};

pub const EOB_TYPE_SYSTEM: &str = "https://bluebutton.cms.gov/resources/codesystem/eob-type";

fn has_type_code(resource: &Value, codes: &[&str]) -> bool {
    if !bundle::is_resource_type(resource, EXPLANATION_OF_BENEFIT) {
        return false;
    }
    path::get_array(resource, "type.coding").iter().any(|coding| {
        path::get_str(coding, "system") == Some(EOB_TYPE_SYSTEM)
            && path::get_str(coding, "code").is_some_and(|code| codes.contains(&code))
    })
}

/// A copy of `bundle` whose `entry` keeps only ExplanationOfBenefit
/// resources typed with any of `codes`, and whose `total` is the kept count.
pub fn filter_by_types(bundle: &Value, codes: &[&str]) -> Value {
    let entries: Vec<Value> = path::get_array(bundle, "entry")
        .iter()
        .filter(|entry| path::get(entry, "resource").is_some_and(|r| has_type_code(r, codes)))
        .cloned()
        .collect();

    tracing::debug!(
        codes = ?codes,
        kept = entries.len(),
        "filtered explanation of benefit bundle"
    );

    let mut filtered = bundle.as_object().cloned().unwrap_or_else(Map::new);
    filtered.insert("total".to_string(), Value::from(entries.len()));
    filtered.insert("entry".to_string(), Value::Array(entries));
    Value::Object(filtered)
}

/// [`filter_by_types`] for a single code such as `"CARRIER"`.
pub fn filter_by_type(bundle: &Value, type_code: &str) -> Value {
    filter_by_types(bundle, &[type_code])
}

/// [`filter_by_types`] for parsed claim types.
pub fn filter_by_claim_types(bundle: &Value, kinds: &[ClaimType]) -> Value {
    let codes: Vec<&str> = kinds.iter().map(|kind| kind.as_code()).collect();
    filter_by_types(bundle, &codes)
}
