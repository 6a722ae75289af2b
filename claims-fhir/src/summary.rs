//! Flat per-claim summaries for listing claims of any type.

use claims_core::{
    ClaimQuantity, ClaimSummary, SummaryAdjudication, SummaryInformation, SummaryPeriod,
    NOT_AVAILABLE,
};
use serde_json::Value;

use crate::{
    bundle::{self, EXPLANATION_OF_BENEFIT},
    extension::{self, urls},
    path,
};

/// Display of the first coding under `prefix`, falling back to its code.
fn coding_text(value: &Value, prefix: &str) -> String {
    path::get_string(value, &format!("{prefix}.coding.0.display"))
        .or_else(|| path::get_string(value, &format!("{prefix}.coding.0.code")))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn text(value: &Value, field: &str) -> String {
    path::get_string_or(value, field, NOT_AVAILABLE)
}

static NULL: Value = Value::Null;

/// One [`ClaimSummary`] per ExplanationOfBenefit entry. Input that is not a
/// Bundle with entries yields an empty list.
pub fn summarize_claims(bundle: &Value) -> Vec<ClaimSummary> {
    if !bundle::is_resource_type(bundle, "Bundle") {
        tracing::warn!("claim summary input is not a Bundle");
        return Vec::new();
    }

    path::get_array(bundle, "entry")
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let resource = path::get(entry, "resource")
                .filter(|resource| bundle::is_resource_type(resource, EXPLANATION_OF_BENEFIT));
            if resource.is_none() {
                tracing::warn!(index, "entry is not an ExplanationOfBenefit, skipping");
            }
            resource
        })
        .map(claim_summary)
        .collect()
}

pub fn claim_summary(eob: &Value) -> ClaimSummary {
    let first_item = path::get(eob, "item.0").unwrap_or(&NULL);
    let quantity_extensions = path::get(first_item, "quantity.extension");

    ClaimSummary {
        id: text(eob, "id"),
        patient_reference: text(eob, "patient.reference"),
        status: text(eob, "status"),
        claim_type: coding_text(eob, "type"),
        billable_period: SummaryPeriod {
            start: text(eob, "billablePeriod.start"),
            end: text(eob, "billablePeriod.end"),
        },
        organization_npi: text(eob, "organization.identifier.value"),
        facility_type: path::get(eob, "facility.extension.0")
            .and_then(|entry| path::get_string(entry, "valueCoding.display"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        facility_npi: text(eob, "facility.identifier.value"),
        serviced_date: text(first_item, "servicedDate"),
        medication: if path::get(first_item, "productOrService").is_some() {
            coding_text(first_item, "productOrService")
        } else {
            coding_text(first_item, "service")
        },
        quantity: ClaimQuantity {
            value: path::get_f64(first_item, "quantity.value"),
            fill_num: extension::extension_quantity(quantity_extensions, urls::FILL_NUMBER),
            days_supply: extension::extension_quantity(quantity_extensions, urls::DAYS_SUPPLY),
        },
        adjudications: path::get_array(first_item, "adjudication")
            .iter()
            .map(|adjudication| SummaryAdjudication {
                category: coding_text(adjudication, "category"),
                amount: path::get_f64(adjudication, "amount.value"),
                currency: text(adjudication, "amount.currency"),
            })
            .collect(),
        information: path::get_array(eob, "supportingInfo")
            .iter()
            .chain(path::get_array(eob, "information"))
            .map(|info| SummaryInformation {
                sequence: path::get_i64(info, "sequence"),
                category: coding_text(info, "category"),
                code: coding_text(info, "code"),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn summarizes_a_pharmacy_claim() {
        let bundle = json!({
            "resourceType": "Bundle",
            "entry": [{ "resource": {
                "resourceType": "ExplanationOfBenefit",
                "id": "pde--1",
                "status": "active",
                "patient": { "reference": "Patient/-1" },
                "type": { "coding": [{ "code": "PDE" }] },
                "item": [{
                    "servicedDate": "2024-04-04",
                    "productOrService": { "coding": [{ "code": "000000000", "display": "Metformin" }] },
                    "quantity": {
                        "value": 60,
                        "extension": [
                            { "url": urls::FILL_NUMBER, "valueQuantity": { "value": 2 } },
                            { "url": urls::DAYS_SUPPLY, "valueQuantity": { "value": 30 } }
                        ]
                    },
                    "adjudication": [{
                        "category": { "coding": [{ "code": "https://bluebutton.cms.gov/resources/variables/tot_rx_cst_amt" }] },
                        "amount": { "value": 12.4, "currency": "USD" }
                    }]
                }],
                "supportingInfo": [{
                    "sequence": 1,
                    "category": { "coding": [{ "code": "compoundcode", "display": "Compound Code" }] },
                    "code": { "coding": [{ "code": "1", "display": "Not a compound" }] }
                }]
            } }]
        });

        let summaries = summarize_claims(&bundle);
        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.claim_type, "PDE");
        assert_eq!(summary.medication, "Metformin");
        assert_eq!(summary.quantity.value, Some(60.0));
        assert_eq!(summary.quantity.fill_num, Some(2.0));
        assert_eq!(summary.quantity.days_supply, Some(30.0));
        assert_eq!(summary.adjudications[0].amount, Some(12.4));
        assert_eq!(summary.adjudications[0].currency, "USD");
        assert_eq!(summary.information[0].code, "Not a compound");
        assert_eq!(summary.facility_npi, "N/A");
        assert_eq!(summary.billable_period.start, "N/A");
    }

    #[test]
    fn skips_non_claims_and_non_bundles() {
        let bundle = json!({
            "resourceType": "Bundle",
            "entry": [
                { "resource": { "resourceType": "Patient" } },
                { "resource": { "resourceType": "ExplanationOfBenefit" } }
            ]
        });
        let summaries = summarize_claims(&bundle);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "N/A");
        assert_eq!(summaries[0].medication, "N/A");
        assert!(summaries[0].adjudications.is_empty());

        assert!(summarize_claims(&json!({ "entry": [] })).is_empty());
    }
}
