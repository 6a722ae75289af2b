//! Blue Button 2.0 FHIR JSON to UI-ready claim, patient and coverage records.
//!
//! Every function here is pure: it borrows an already-fetched
//! `serde_json::Value` and returns owned output. Absent fields resolve to
//! sentinels; only a missing top-level claim is an error.

pub mod adjudication;
pub mod bundle;
pub mod coverage;
pub mod eob;
pub mod extension;
pub mod filter;
pub mod path;
pub mod patient;
pub mod sequence;
pub mod summary;

use claims_core::{ClaimsError, TransformConfig, TransformedClaim};
use serde_json::Value;

pub use coverage::{extract_coverages, summarize_monthly};
pub use eob::{transform_claim, transform_eob, transform_eob_bundle};
pub use filter::{filter_by_claim_types, filter_by_type, filter_by_types, EOB_TYPE_SYSTEM};
pub use patient::extract_patients;
pub use summary::summarize_claims;

/// Parse a JSON document.
pub fn parse_json(input: &str) -> Result<Value, ClaimsError> {
    serde_json::from_str(input).map_err(|err| ClaimsError::Parse(err.to_string()))
}

/// Transform the first claim of a bundle given as a JSON string.
pub fn transform_eob_str(
    bundle_json: &str,
    config: &TransformConfig,
) -> Result<TransformedClaim, ClaimsError> {
    let value = parse_json(bundle_json)?;
    transform_eob(&value, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_entry_point_reports_parse_errors() {
        let err = transform_eob_str("{ not json", &TransformConfig::default()).unwrap_err();
        assert!(matches!(err, ClaimsError::Parse(_)));
    }

    #[test]
    fn string_entry_point_transforms() {
        let json = r#"{"entry":[{"resource":{"resourceType":"ExplanationOfBenefit","id":"x"}}]}"#;
        let claim = transform_eob_str(json, &TransformConfig::default()).unwrap();
        assert_eq!(claim.claim_info.id.as_deref(), Some("x"));
    }
}
