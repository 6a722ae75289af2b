//! Amount extraction from `item.adjudication[]`.
//!
//! Carrier and institutional claims spell adjudication categories
//! differently, so categories are matched by case-insensitive substring.

use claims_core::{AdjudicationDetail, PatientResponsibility, Pricing};
use serde_json::Value;

use crate::path;

pub const SUBMITTED: &str = "submitted";
pub const ALLOWED: &str = "eligible";
pub const PAID_TO_PROVIDER: &str = "paidtoprovider";
pub const BENEFIT: &str = "benefit";
pub const COINSURANCE: &str = "coinsurance";
pub const DEDUCTIBLE: &str = "deductible";
pub const NON_COVERED: &str = "noncovered";

fn category_matches(adjudication: &Value, keyword: &str) -> bool {
    let needle = keyword.to_lowercase();
    path::get_array(adjudication, "category.coding")
        .iter()
        .filter_map(|coding| path::get_str(coding, "code"))
        .any(|code| code.to_lowercase().contains(&needle))
}

/// `amount.value` of the first adjudication whose category matches `keyword`.
pub fn find_amount_opt(adjudications: &[Value], keyword: &str) -> Option<f64> {
    adjudications
        .iter()
        .find(|adjudication| category_matches(adjudication, keyword))
        .and_then(|adjudication| path::get_f64(adjudication, "amount.value"))
}

/// As [`find_amount_opt`], with `0` when nothing matches.
pub fn find_amount(adjudications: &[Value], keyword: &str) -> f64 {
    find_amount_opt(adjudications, keyword).unwrap_or(0.0)
}

/// Line pricing from the standard keyword set.
pub fn pricing(adjudications: &[Value]) -> Pricing {
    Pricing {
        submitted: find_amount(adjudications, SUBMITTED),
        allowed: find_amount(adjudications, ALLOWED),
        payment: find_amount_opt(adjudications, PAID_TO_PROVIDER)
            .or_else(|| find_amount_opt(adjudications, BENEFIT))
            .unwrap_or(0.0),
        patient_responsibility: PatientResponsibility {
            coinsurance: find_amount(adjudications, COINSURANCE),
            deductible: find_amount(adjudications, DEDUCTIBLE),
            non_covered: find_amount(adjudications, NON_COVERED),
        },
    }
}

pub fn details(adjudications: &[Value]) -> Vec<AdjudicationDetail> {
    adjudications
        .iter()
        .map(|adjudication| AdjudicationDetail {
            category: path::get_string(adjudication, "category.coding.0.display"),
            amount: path::get_f64(adjudication, "amount.value"),
            reason: path::get_string(adjudication, "reason.coding.0.display"),
        })
        .collect()
}
