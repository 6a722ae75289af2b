//! Bản ghi phẳng cho Patient, Coverage và tóm tắt claim đơn giản.
//!
//! Mọi trường văn bản dùng [`NOT_AVAILABLE`](crate::NOT_AVAILABLE) khi thiếu dữ liệu.

use serde::{Deserialize, Serialize};

use crate::NOT_AVAILABLE;

/// Thông tin nhân khẩu học của một Patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: String,
    pub full_name: String,
    pub firstname: String,
    pub middlename: String,
    pub lastname: String,
    pub birth_date: String,
    pub gender: String,
    pub postal_code: String,
    pub state: String,
    pub race: String,
    pub deceased: String,
    pub deceased_date: String,
}

impl Default for PatientSummary {
    fn default() -> Self {
        Self {
            id: NOT_AVAILABLE.to_string(),
            full_name: NOT_AVAILABLE.to_string(),
            firstname: NOT_AVAILABLE.to_string(),
            middlename: NOT_AVAILABLE.to_string(),
            lastname: NOT_AVAILABLE.to_string(),
            birth_date: NOT_AVAILABLE.to_string(),
            gender: NOT_AVAILABLE.to_string(),
            postal_code: NOT_AVAILABLE.to_string(),
            state: NOT_AVAILABLE.to_string(),
            race: NOT_AVAILABLE.to_string(),
            deceased: "No".to_string(),
            deceased_date: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Một Coverage (Part A/B/C/D) đã làm phẳng.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub id: String,
    pub status: String,
    #[serde(rename = "type")]
    pub coverage_type: String,
    pub subscriber_id: String,
    pub beneficiary: String,
    pub relationship: String,
    pub payor: String,
    pub group: String,
    pub plan: String,
    pub medicare_status: String,
    pub part_a_termination: String,
    pub part_b_termination: String,
    pub esrd_status: String,
    pub reference_year: String,
    pub original_entitlement: String,
    pub current_entitlement: String,
    pub dual_status: String,
    pub state_code: String,
    /// Tóm tắt 12 tháng `buyin01..buyin12`.
    pub state_buy_in: String,
    /// Tóm tắt 12 tháng `dual_01..dual_12`.
    pub dual_eligibility: String,
    pub last_updated: String,
}

impl Default for CoverageSummary {
    fn default() -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            id: na(),
            status: na(),
            coverage_type: na(),
            subscriber_id: na(),
            beneficiary: na(),
            relationship: na(),
            payor: na(),
            group: na(),
            plan: na(),
            medicare_status: na(),
            part_a_termination: na(),
            part_b_termination: na(),
            esrd_status: na(),
            reference_year: na(),
            original_entitlement: na(),
            current_entitlement: na(),
            dual_status: na(),
            state_code: na(),
            state_buy_in: na(),
            dual_eligibility: na(),
            last_updated: na(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimQuantity {
    pub value: Option<f64>,
    pub fill_num: Option<f64>,
    pub days_supply: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryAdjudication {
    pub category: String,
    pub amount: Option<f64>,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryInformation {
    pub sequence: Option<i64>,
    pub category: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPeriod {
    pub start: String,
    pub end: String,
}

/// Tóm tắt phẳng của một ExplanationOfBenefit bất kỳ loại nào.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSummary {
    pub id: String,
    pub patient_reference: String,
    pub status: String,
    #[serde(rename = "type")]
    pub claim_type: String,
    pub billable_period: SummaryPeriod,
    #[serde(rename = "organizationNPI")]
    pub organization_npi: String,
    pub facility_type: String,
    #[serde(rename = "facilityNPI")]
    pub facility_npi: String,
    pub serviced_date: String,
    pub medication: String,
    pub quantity: ClaimQuantity,
    pub adjudications: Vec<SummaryAdjudication>,
    pub information: Vec<SummaryInformation>,
}
