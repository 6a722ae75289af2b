//! Coverage flattening.
//!
//! Extensions are dispatched on the last segment of their URL through a
//! fixed table, so unknown upstream variables never become output keys.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use claims_core::{CoverageSummary, NOT_AVAILABLE};
use serde_json::Value;

use crate::{
    bundle,
    extension::{self, ExtensionValue},
    path,
};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const BUY_IN_PREFIX: &str = "buyin";
const DUAL_PREFIX: &str = "dual_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CoverageField {
    MedicareStatus,
    PartATermination,
    PartBTermination,
    EsrdStatus,
    ReferenceYear,
    OriginalEntitlement,
    CurrentEntitlement,
    DualStatus,
    StateCode,
}

const KNOWN_EXTENSIONS: [(&str, CoverageField); 9] = [
    ("ms_cd", CoverageField::MedicareStatus),
    ("a_trm_cd", CoverageField::PartATermination),
    ("b_trm_cd", CoverageField::PartBTermination),
    ("esrd_ind", CoverageField::EsrdStatus),
    ("rfrnc_yr", CoverageField::ReferenceYear),
    ("orec", CoverageField::OriginalEntitlement),
    ("crec", CoverageField::CurrentEntitlement),
    ("dual_stus_cd", CoverageField::DualStatus),
    ("state_cd", CoverageField::StateCode),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtensionSlot {
    Field(CoverageField),
    BuyIn(usize),
    Dual(usize),
}

fn classify(suffix: &str) -> Option<ExtensionSlot> {
    if let Some((_, field)) = KNOWN_EXTENSIONS.iter().find(|(known, _)| *known == suffix) {
        return Some(ExtensionSlot::Field(*field));
    }
    month_index(suffix, BUY_IN_PREFIX)
        .map(ExtensionSlot::BuyIn)
        .or_else(|| month_index(suffix, DUAL_PREFIX).map(ExtensionSlot::Dual))
}

/// Zero-based month for suffixes like `buyin03` or `dual_12`.
fn month_index(suffix: &str, prefix: &str) -> Option<usize> {
    let digits = suffix.strip_prefix(prefix)?;
    if digits.len() != 2 {
        return None;
    }
    let month: usize = digits.parse().ok()?;
    (1..=12).contains(&month).then(|| month - 1)
}

fn year_of(date: &str) -> String {
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return parsed.year().to_string();
    }
    match date.get(..4) {
        Some(year) if year.chars().all(|c| c.is_ascii_digit()) => year.to_string(),
        _ => date.to_string(),
    }
}

fn extension_text(entry: &Value) -> Option<String> {
    match ExtensionValue::from_entry(entry)? {
        ExtensionValue::Date(date) => Some(year_of(&date)),
        other => other.text(),
    }
}

/// Collapse twelve monthly values into `"X for all months"` or
/// `"X for Jan-Mar, Y for Apr-Dec"`. Missing months read as `N/A`.
pub fn summarize_monthly(values: &[Option<String>; 12]) -> String {
    let labels: Vec<&str> = values
        .iter()
        .map(|value| value.as_deref().unwrap_or(NOT_AVAILABLE))
        .collect();

    let first = labels[0];
    if labels.iter().all(|label| *label == first) {
        return if first == NOT_AVAILABLE {
            NOT_AVAILABLE.to_string()
        } else {
            format!("{first} for all months")
        };
    }

    let mut runs = Vec::new();
    let mut start = 0;
    for end in 1..=labels.len() {
        if end == labels.len() || labels[end] != labels[start] {
            let range = if start == end - 1 {
                MONTHS[start].to_string()
            } else {
                format!("{}-{}", MONTHS[start], MONTHS[end - 1])
            };
            runs.push(format!("{} for {range}", labels[start]));
            start = end;
        }
    }
    runs.join(", ")
}

/// One [`CoverageSummary`] per Coverage in `value` (a Bundle or a single Coverage).
pub fn extract_coverages(value: &Value) -> Vec<CoverageSummary> {
    bundle::resources(value)
        .into_iter()
        .filter(|resource| bundle::is_resource_type(resource, "Coverage"))
        .map(coverage_summary)
        .collect()
}

fn field_slot(summary: &mut CoverageSummary, field: CoverageField) -> &mut String {
    match field {
        CoverageField::MedicareStatus => &mut summary.medicare_status,
        CoverageField::PartATermination => &mut summary.part_a_termination,
        CoverageField::PartBTermination => &mut summary.part_b_termination,
        CoverageField::EsrdStatus => &mut summary.esrd_status,
        CoverageField::ReferenceYear => &mut summary.reference_year,
        CoverageField::OriginalEntitlement => &mut summary.original_entitlement,
        CoverageField::CurrentEntitlement => &mut summary.current_entitlement,
        CoverageField::DualStatus => &mut summary.dual_status,
        CoverageField::StateCode => &mut summary.state_code,
    }
}

fn set(slot: &mut String, value: Option<&str>) {
    if let Some(value) = value {
        *slot = value.to_string();
    }
}

pub fn coverage_summary(coverage: &Value) -> CoverageSummary {
    let mut fields: HashMap<CoverageField, String> = HashMap::new();
    let mut buy_in: [Option<String>; 12] = Default::default();
    let mut dual: [Option<String>; 12] = Default::default();

    for entry in path::get_array(coverage, "extension") {
        let Some(url) = path::get_str(entry, "url") else {
            continue;
        };
        let Some(slot) = classify(extension::url_suffix(url)) else {
            tracing::trace!(url, "ignoring unmapped coverage extension");
            continue;
        };
        let Some(text) = extension_text(entry) else {
            continue;
        };
        match slot {
            ExtensionSlot::Field(field) => {
                fields.entry(field).or_insert(text);
            }
            ExtensionSlot::BuyIn(month) => {
                buy_in[month].get_or_insert(text);
            }
            ExtensionSlot::Dual(month) => {
                dual[month].get_or_insert(text);
            }
        }
    }

    let class_value = |kind: &str| {
        path::get_array(coverage, "class")
            .iter()
            .find(|class| path::get_str(class, "type.coding.0.code") == Some(kind))
            .and_then(|class| path::get_str(class, "value"))
    };

    let mut summary = CoverageSummary {
        state_buy_in: summarize_monthly(&buy_in),
        dual_eligibility: summarize_monthly(&dual),
        ..CoverageSummary::default()
    };
    set(&mut summary.id, path::get_str(coverage, "id"));
    set(&mut summary.status, path::get_str(coverage, "status"));
    set(&mut summary.coverage_type, path::get_str(coverage, "type.coding.0.code"));
    set(&mut summary.subscriber_id, path::get_str(coverage, "subscriberId"));
    set(&mut summary.beneficiary, path::get_str(coverage, "beneficiary.reference"));
    set(
        &mut summary.relationship,
        path::get_str(coverage, "relationship.coding.0.display"),
    );
    set(&mut summary.payor, path::get_str(coverage, "payor.0.identifier.value"));
    set(&mut summary.group, class_value("group"));
    set(&mut summary.plan, class_value("plan"));
    set(&mut summary.last_updated, path::get_str(coverage, "meta.lastUpdated"));
    for (field, text) in fields {
        *field_slot(&mut summary, field) = text;
    }
    summary
}
