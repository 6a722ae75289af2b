//! Patient demographics flattening.

use claims_core::PatientSummary;
use serde_json::Value;

use crate::{
    bundle,
    extension::{self, urls},
    path,
};

/// One [`PatientSummary`] per Patient in `value` (a Bundle or a single Patient).
/// Bundle entries without a `resourceType` are read as patients too.
pub fn extract_patients(value: &Value) -> Vec<PatientSummary> {
    bundle::resources(value)
        .into_iter()
        .filter(|resource| bundle::resource_type(resource).map_or(true, |kind| kind == "Patient"))
        .map(patient_summary)
        .collect()
}

fn set(slot: &mut String, value: Option<&str>) {
    if let Some(value) = value {
        *slot = value.to_string();
    }
}

pub fn patient_summary(patient: &Value) -> PatientSummary {
    let name = path::get(patient, "name.0");
    let given: Vec<&str> = name
        .map(|name| path::get_array(name, "given"))
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    let family = name.and_then(|name| path::get_str(name, "family"));

    let full_name = given
        .iter()
        .copied()
        .chain(family)
        .collect::<Vec<_>>()
        .join(" ");

    let deceased_date = path::get_str(patient, "deceasedDateTime");
    let deceased = path::get_bool(patient, "deceasedBoolean").unwrap_or(false)
        || deceased_date.is_some();

    let mut summary = PatientSummary::default();
    set(&mut summary.id, path::get_str(patient, "id"));
    set(
        &mut summary.full_name,
        Some(full_name.trim()).filter(|name| !name.is_empty()),
    );
    set(&mut summary.firstname, given.first().copied());
    set(&mut summary.middlename, given.get(1).copied());
    set(&mut summary.lastname, family);
    set(&mut summary.birth_date, path::get_str(patient, "birthDate"));
    set(&mut summary.gender, path::get_str(patient, "gender"));
    set(&mut summary.postal_code, path::get_str(patient, "address.0.postalCode"));
    set(&mut summary.state, path::get_str(patient, "address.0.state"));
    set(
        &mut summary.race,
        extension::extension_display(patient.get("extension"), urls::RACE).as_deref(),
    );
    if deceased {
        summary.deceased = "Yes".to_string();
    }
    set(&mut summary.deceased_date, deceased_date);
    summary
}
