//! ExplanationOfBenefit to connected [`TransformedClaim`].
//!
//! Line items carry their diagnoses and care-team members as shared
//! records resolved through `diagnosisSequence` / `careTeamSequence`.
//! Claim totals are recomputed from the line items.

use std::sync::Arc;

use chrono::NaiveDate;
use claims_core::{
    BenefitBalance, BenefitFinancial, BillingProvider, CareTeamRecord, ClaimExtensions, ClaimInfo,
    ClaimMeta, ClaimsError, DiagnosisRecord, Financials, Insurance, LineExtensions, LineItem,
    Modifier, ObservationValue, PatientReference, Payer, Payment, PaymentMethod, Period,
    PlaceOfService, Providers, TestResult, Totals, TransformConfig, TransformedClaim,
};
use serde_json::Value;

use crate::{
    adjudication,
    bundle::{self, EXPLANATION_OF_BENEFIT},
    extension::{self, urls},
    path,
    sequence::SequenceIndex,
};

const ASSIGNED_CLAIM: &str = "Assigned claim";
const RECEIVED_DATE_CATEGORY: &str = "clmrecvddate";
const SPECIALTY_SYSTEM_MARKER: &str = "prvdr_spclty";
const REFERRING_ROLE: &str = "Referring";
const DEFAULT_CLAIM_TYPE: &str = "Professional Claim";

/// Transform the first entry of `bundle`, which must be an ExplanationOfBenefit.
#[tracing::instrument(skip_all)]
pub fn transform_eob(
    bundle: &Value,
    config: &TransformConfig,
) -> Result<TransformedClaim, ClaimsError> {
    let Some(first) = path::get_array(bundle, "entry").first() else {
        tracing::warn!("bundle carries no entries");
        return Err(ClaimsError::InvalidInput(
            "no claim resource found".to_string(),
        ));
    };

    let claim = path::get(first, "resource")
        .filter(|resource| bundle::is_resource_type(resource, EXPLANATION_OF_BENEFIT))
        .ok_or_else(|| {
            tracing::warn!("first entry is not an ExplanationOfBenefit");
            ClaimsError::InvalidInput(
                "ExplanationOfBenefit resource missing or invalid".to_string(),
            )
        })?;

    Ok(transform_claim(claim, config))
}

/// Transform every ExplanationOfBenefit entry of `bundle`, skipping other resources.
#[tracing::instrument(skip_all)]
pub fn transform_eob_bundle(
    bundle: &Value,
    config: &TransformConfig,
) -> Result<Vec<TransformedClaim>, ClaimsError> {
    let entries = path::get_array(bundle, "entry");
    if entries.is_empty() {
        tracing::warn!("bundle carries no entries");
        return Err(ClaimsError::InvalidInput(
            "no claim resource found".to_string(),
        ));
    }

    let claims: Vec<_> = entries
        .iter()
        .filter_map(|entry| path::get(entry, "resource"))
        .filter(|resource| bundle::is_resource_type(resource, EXPLANATION_OF_BENEFIT))
        .map(|claim| transform_claim(claim, config))
        .collect();

    tracing::debug!(
        entries = entries.len(),
        claims = claims.len(),
        "transformed claim bundle"
    );
    Ok(claims)
}

/// Transform one ExplanationOfBenefit resource. Absent fields degrade to defaults.
pub fn transform_claim(claim: &Value, config: &TransformConfig) -> TransformedClaim {
    let diagnoses: Vec<Arc<DiagnosisRecord>> = path::get_array(claim, "diagnosis")
        .iter()
        .map(|diagnosis| Arc::new(diagnosis_record(diagnosis)))
        .collect();
    let care_team: Vec<Arc<CareTeamRecord>> = path::get_array(claim, "careTeam")
        .iter()
        .map(|member| Arc::new(care_team_record(member)))
        .collect();

    let diagnosis_index = SequenceIndex::build(&diagnoses);
    let care_team_index = SequenceIndex::build(&care_team);

    let mut line_items: Vec<LineItem> = path::get_array(claim, "item")
        .iter()
        .map(|item| line_item(item, &diagnosis_index, &care_team_index))
        .collect();
    line_items.sort_by_key(|item| service_sort_key(item, config.undated_sort_sentinel));

    let totals = Totals::from_line_items(&line_items);
    let payment = Payment {
        amount: path::get_f64(claim, "payment.amount.value").unwrap_or(0.0),
        date: path::get_string(claim, "created"),
        method: PaymentMethod::infer(&totals),
    };

    let claim_extensions = claim.get("extension");
    let extensions = ClaimExtensions {
        carrier_number: extension::extension_identifier(claim_extensions, urls::CARRIER_NUMBER),
        claim_control_number: extension::extension_identifier(
            claim_extensions,
            urls::CLAIM_CONTROL_NUMBER,
        ),
        assignment_code: extension::extension_display(claim_extensions, urls::ASSIGNMENT_CODE),
        claim_entry_code: extension::extension_display(claim_extensions, urls::CLAIM_ENTRY_CODE),
    };
    let is_assigned = extensions.assignment_code.as_deref() == Some(ASSIGNED_CLAIM);

    let claim_info = ClaimInfo {
        id: path::get_string(claim, "id"),
        claim_type: path::get_string_or(claim, "type.coding.0.display", DEFAULT_CLAIM_TYPE),
        status: path::get_string(claim, "status"),
        outcome: path::get_string(claim, "outcome"),
        received_date: received_date(claim),
        service_period: Period {
            start: path::get_string(claim, "billablePeriod.start"),
            end: path::get_string(claim, "billablePeriod.end"),
        },
        extensions,
    };

    let providers = Providers {
        performing: care_team.iter().find(|member| member.is_responsible).cloned(),
        billing: BillingProvider {
            npi: path::get_string(claim, "provider.identifier.value"),
            name: path::get_string(claim, "provider.display"),
        },
        referral: care_team
            .iter()
            .find(|member| member.role == REFERRING_ROLE)
            .cloned(),
        all_members: care_team,
    };

    tracing::debug!(
        claim_id = claim_info.id.as_deref().unwrap_or_default(),
        line_items = line_items.len(),
        diagnoses = diagnoses.len(),
        "transformed explanation of benefit"
    );

    TransformedClaim {
        claim_info,
        patient: PatientReference {
            id: path::get_string(claim, "patient.reference"),
            medicare_id: path::get_string(claim, "patient.identifier.value"),
        },
        providers,
        insurance: Insurance {
            insurance_type: config.insurance_type.clone(),
            payer: Payer {
                id: path::get_string(claim, "insurer.identifier.value"),
                name: config.payer_name.clone(),
            },
            is_assigned,
        },
        line_items,
        diagnoses,
        test_results: test_results(claim),
        financials: Financials {
            totals,
            payment,
            benefit_balance: benefit_balance(claim),
        },
        meta: ClaimMeta {
            last_updated: path::get_string(claim, "meta.lastUpdated"),
            profile: path::get_string(claim, "meta.profile.0"),
        },
    }
}

fn diagnosis_record(diagnosis: &Value) -> DiagnosisRecord {
    DiagnosisRecord {
        sequence: path::get_i64(diagnosis, "sequence"),
        code: path::get_string_or(diagnosis, "diagnosisCodeableConcept.coding.0.code", "Unknown"),
        description: path::get_string_or(
            diagnosis,
            "diagnosisCodeableConcept.coding.0.display",
            "Not provided",
        )
        .replace('"', ""),
        kind: path::get_string_or(diagnosis, "type.0.coding.0.display", "Unknown"),
    }
}

fn care_team_record(member: &Value) -> CareTeamRecord {
    let provider_id = path::get_string(member, "provider.identifier.value");
    CareTeamRecord {
        sequence: path::get_i64(member, "sequence"),
        npi: provider_id.clone(),
        provider_id,
        name: path::get_string_or(member, "provider.display", "Not provided"),
        role: path::get_string_or(member, "role.coding.0.display", "Unknown"),
        is_responsible: path::get_bool(member, "responsible").unwrap_or(false),
        specialty: path::get_array(member, "qualification.coding")
            .iter()
            .find(|coding| {
                path::get_str(coding, "system")
                    .is_some_and(|system| system.contains(SPECIALTY_SYSTEM_MARKER))
            })
            .and_then(|coding| path::get_string(coding, "display")),
        participation: extension::extension_display(member.get("extension"), urls::PARTICIPATION),
    }
}

fn line_item(
    item: &Value,
    diagnoses: &SequenceIndex<DiagnosisRecord>,
    care_team: &SequenceIndex<CareTeamRecord>,
) -> LineItem {
    let adjudications = path::get_array(item, "adjudication");
    let item_extensions = item.get("extension");
    let location_extensions = path::get(item, "locationCodeableConcept.extension");
    let diagnosis_pointers = sequence_list(item, "diagnosisSequence");
    let care_team_pointers = sequence_list(item, "careTeamSequence");

    LineItem {
        line_number: path::get_i64(item, "sequence"),
        service_date: path::get_string(item, "servicedPeriod.start")
            .or_else(|| path::get_string(item, "servicedDate")),
        procedure_code: path::get_string(item, "productOrService.coding.0.code"),
        procedure_description: path::get_string(item, "productOrService.coding.0.display"),
        modifiers: path::get_array(item, "modifier")
            .iter()
            .map(|modifier| Modifier {
                code: path::get_string(modifier, "coding.0.code"),
                description: path::get_string(modifier, "coding.0.display"),
            })
            .collect(),
        diagnoses: diagnoses.resolve(&diagnosis_pointers),
        care_team: care_team.resolve(&care_team_pointers),
        diagnosis_pointers,
        place_of_service: PlaceOfService {
            code: path::get_string(item, "locationCodeableConcept.coding.0.code"),
            description: path::get_string(item, "locationCodeableConcept.coding.0.display"),
            state: extension::extension_code(location_extensions, urls::PROVIDER_STATE),
            zip: extension::extension_code(location_extensions, urls::PROVIDER_ZIP),
        },
        quantity: path::get_f64(item, "quantity.value"),
        ndc_code: extension::extension_code(path::get(item, "productOrService.extension"), urls::NDC),
        extensions: LineExtensions {
            betos_code: extension::extension_display(item_extensions, urls::BETOS_CODE),
            processing_indicator: extension::extension_display(
                item_extensions,
                urls::PROCESSING_INDICATOR,
            ),
            clia_lab_number: extension::extension_identifier(item_extensions, urls::CLIA_LAB_NUMBER),
        },
        pricing: adjudication::pricing(adjudications),
        adjudication_details: adjudication::details(adjudications),
    }
}

fn sequence_list(item: &Value, key: &str) -> Vec<i64> {
    path::get_array(item, key)
        .iter()
        .filter_map(Value::as_i64)
        .collect()
}

fn service_sort_key(item: &LineItem, sentinel: NaiveDate) -> NaiveDate {
    item.service_date
        .as_deref()
        .and_then(parse_date)
        .unwrap_or(sentinel)
}

/// Calendar day of a FHIR `date` or `dateTime` value.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn received_date(claim: &Value) -> Option<String> {
    path::get_array(claim, "supportingInfo")
        .iter()
        .find(|info| path::get_str(info, "category.coding.0.code") == Some(RECEIVED_DATE_CATEGORY))
        .and_then(|info| path::get_string(info, "timingDate"))
}

fn test_results(claim: &Value) -> Vec<TestResult> {
    path::get_array(claim, "contained")
        .iter()
        .filter(|resource| bundle::is_resource_type(resource, "Observation"))
        .map(|observation| TestResult {
            test_id: path::get_string(observation, "id"),
            test_name: path::get_string_or(observation, "code.coding.0.display", "Unknown Test"),
            code: path::get_string(observation, "code.coding.0.code"),
            result: path::get_f64(observation, "valueQuantity.value")
                .map(ObservationValue::Number)
                .or_else(|| path::get_string(observation, "valueString").map(ObservationValue::Text)),
            unit: path::get_string(observation, "valueQuantity.unit"),
        })
        .collect()
}

fn benefit_balance(claim: &Value) -> Vec<BenefitBalance> {
    path::get_array(claim, "benefitBalance")
        .iter()
        .map(|balance| BenefitBalance {
            category: path::get_string(balance, "category.coding.0.display"),
            financials: path::get_array(balance, "financial")
                .iter()
                .map(|financial| BenefitFinancial {
                    kind: path::get_string(financial, "type.coding.0.display"),
                    amount: path::get_f64(financial, "usedMoney.value"),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn wrap(resource: Value) -> Value {
        json!({ "resourceType": "Bundle", "type": "searchset", "entry": [{ "resource": resource }] })
    }

    fn amount(code: &str, value: f64) -> Value {
        json!({ "category": { "coding": [{ "code": code }] }, "amount": { "value": value } })
    }

    fn scenario() -> Value {
        wrap(json!({
            "resourceType": "ExplanationOfBenefit",
            "careTeam": [{ "sequence": 1, "provider": { "display": "Dr. A" }, "responsible": true }],
            "diagnosis": [{
                "sequence": 1,
                "diagnosisCodeableConcept": { "coding": [{ "code": "E11.9", "display": "Diabetes" }] }
            }],
            "item": [{
                "careTeamSequence": [1],
                "diagnosisSequence": [1],
                "adjudication": [amount("submitted", 200.0)]
            }]
        }))
    }

    #[test]
    fn connects_line_items_to_care_team_and_diagnoses() {
        let claim = transform_eob(&scenario(), &TransformConfig::default()).unwrap();
        let line = &claim.line_items[0];
        assert_eq!(line.care_team[0].name, "Dr. A");
        assert_eq!(line.diagnoses[0].code, "E11.9");
        assert_eq!(line.pricing.submitted, 200.0);
        assert_eq!(claim.financials.totals.submitted, 200.0);
        assert!(Arc::ptr_eq(&line.diagnoses[0], &claim.diagnoses[0]));
        assert_eq!(
            claim.providers.performing.as_ref().map(|p| p.name.as_str()),
            Some("Dr. A")
        );
    }

    #[test]
    fn rejects_bundles_without_a_claim() {
        let config = TransformConfig::default();
        assert!(matches!(
            transform_eob(&json!({ "entry": [] }), &config),
            Err(ClaimsError::InvalidInput(message)) if message == "no claim resource found"
        ));
        assert!(matches!(
            transform_eob(&json!({}), &config),
            Err(ClaimsError::InvalidInput(_))
        ));
        assert!(matches!(
            transform_eob(&wrap(json!({ "resourceType": "Patient" })), &config),
            Err(ClaimsError::InvalidInput(message)) if message.contains("missing or invalid")
        ));
        assert!(matches!(
            transform_eob(&json!({ "entry": [{ "fullUrl": "x" }] }), &config),
            Err(ClaimsError::InvalidInput(_))
        ));
    }

    #[test]
    fn minimal_claim_uses_sentinels() {
        let claim = transform_eob(
            &wrap(json!({ "resourceType": "ExplanationOfBenefit" })),
            &TransformConfig::default(),
        )
        .unwrap();
        assert_eq!(claim.claim_info.claim_type, "Professional Claim");
        assert_eq!(claim.claim_info.id, None);
        assert!(claim.line_items.is_empty());
        assert_eq!(claim.financials.totals, Totals::default());
        assert_eq!(claim.financials.payment.amount, 0.0);
        assert_eq!(claim.financials.payment.method, PaymentMethod::Unknown);
        assert_eq!(claim.insurance.insurance_type, "Medicare Part B");
        assert!(!claim.insurance.is_assigned);
        assert!(claim.providers.performing.is_none());
    }

    #[test]
    fn undated_lines_sort_last() {
        let bundle = wrap(json!({
            "resourceType": "ExplanationOfBenefit",
            "item": [
                { "sequence": 1 },
                { "sequence": 2, "servicedDate": "2024-05-02" },
                { "sequence": 3, "servicedPeriod": { "start": "2024-01-15" } },
                { "sequence": 4, "servicedDate": "not a date" },
                { "sequence": 5, "servicedDate": "2024-05-02" }
            ]
        }));
        let claim = transform_eob(&bundle, &TransformConfig::default()).unwrap();
        let order: Vec<_> = claim.line_items.iter().filter_map(|l| l.line_number).collect();
        assert_eq!(order, [3, 2, 5, 1, 4]);
    }

    #[test]
    fn totals_match_line_pricing() {
        let bundle = wrap(json!({
            "resourceType": "ExplanationOfBenefit",
            "item": [
                { "adjudication": [amount("submitted", 100.0), amount("paidtoprovider", 60.5), amount("coinsurance", 20.0)] },
                { "adjudication": [amount("submitted", 50.0), amount("paidtoprovider", 30.25)] },
                { "adjudication": [] }
            ]
        }));
        let claim = transform_eob(&bundle, &TransformConfig::default()).unwrap();
        let paid: f64 = claim.line_items.iter().map(|l| l.pricing.payment).sum();
        assert_eq!(claim.financials.totals.paid, paid);
        assert_eq!(claim.financials.totals.submitted, 150.0);
        assert_eq!(claim.financials.totals.patient_responsibility.coinsurance, 20.0);
        assert_eq!(claim.financials.payment.method, PaymentMethod::DirectToProvider);
    }

    #[test]
    fn coinsurance_only_claims_are_patient_responsibility() {
        let bundle = wrap(json!({
            "resourceType": "ExplanationOfBenefit",
            "item": [{ "adjudication": [amount("coinsurance", 12.0)] }]
        }));
        let claim = transform_eob(&bundle, &TransformConfig::default()).unwrap();
        assert_eq!(
            claim.financials.payment.method,
            PaymentMethod::PatientResponsibility
        );
    }

    #[test]
    fn reads_carrier_extensions_and_assignment() {
        let bundle = wrap(json!({
            "resourceType": "ExplanationOfBenefit",
            "id": "carrier--123",
            "extension": [
                { "url": urls::CARRIER_NUMBER, "valueIdentifier": { "value": "61026" } },
                { "url": urls::ASSIGNMENT_CODE, "valueCoding": { "code": "A", "display": "Assigned claim" } }
            ],
            "supportingInfo": [
                { "category": { "coding": [{ "code": "info" }] }, "timingDate": "1999-01-01" },
                { "category": { "coding": [{ "code": "clmrecvddate" }] }, "timingDate": "2024-02-10" }
            ]
        }));
        let claim = transform_eob(&bundle, &TransformConfig::default()).unwrap();
        assert_eq!(claim.claim_info.extensions.carrier_number.as_deref(), Some("61026"));
        assert_eq!(claim.claim_info.received_date.as_deref(), Some("2024-02-10"));
        assert!(claim.insurance.is_assigned);
    }

    #[test]
    fn contained_observations_become_test_results() {
        let bundle = wrap(json!({
            "resourceType": "ExplanationOfBenefit",
            "contained": [
                { "resourceType": "Organization", "id": "org" },
                { "resourceType": "Observation", "id": "o1", "code": { "coding": [{ "code": "2345-7", "display": "Glucose" }] }, "valueQuantity": { "value": 98, "unit": "mg/dL" } },
                { "resourceType": "Observation", "id": "o2", "valueString": "negative" }
            ]
        }));
        let claim = transform_eob(&bundle, &TransformConfig::default()).unwrap();
        assert_eq!(claim.test_results.len(), 2);
        assert_eq!(claim.test_results[0].result, Some(ObservationValue::Number(98.0)));
        assert_eq!(claim.test_results[0].unit.as_deref(), Some("mg/dL"));
        assert_eq!(claim.test_results[1].test_name, "Unknown Test");
        assert_eq!(
            claim.test_results[1].result,
            Some(ObservationValue::Text("negative".to_string()))
        );
    }

    #[test]
    fn bundle_transform_covers_every_claim() {
        let bundle = json!({
            "entry": [
                { "resource": { "resourceType": "ExplanationOfBenefit", "id": "a" } },
                { "resource": { "resourceType": "Patient", "id": "p" } },
                { "resource": { "resourceType": "ExplanationOfBenefit", "id": "b" } }
            ]
        });
        let claims = transform_eob_bundle(&bundle, &TransformConfig::default()).unwrap();
        let ids: Vec<_> = claims.iter().filter_map(|c| c.claim_info.id.as_deref()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert!(transform_eob_bundle(&json!({ "entry": [] }), &TransformConfig::default()).is_err());
    }

    #[test]
    fn parse_date_accepts_date_times() {
        assert_eq!(
            parse_date("2024-03-01T10:00:00Z"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(parse_date("2024-03"), None);
    }
}
