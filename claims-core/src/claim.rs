//! Cấu trúc claim đã "kết nối": dòng dịch vụ trỏ tới chẩn đoán và care team.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Bản ghi được tham chiếu qua số thứ tự `sequence` trong claim.
pub trait Sequenced {
    fn sequence(&self) -> Option<i64>;
}

/// Chẩn đoán của claim, dựng một lần từ `claim.diagnosis[]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRecord {
    pub sequence: Option<i64>,
    pub code: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Sequenced for DiagnosisRecord {
    fn sequence(&self) -> Option<i64> {
        self.sequence
    }
}

/// Thành viên care team, dựng một lần từ `claim.careTeam[]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareTeamRecord {
    pub sequence: Option<i64>,
    pub provider_id: Option<String>,
    pub name: String,
    pub npi: Option<String>,
    pub role: String,
    pub is_responsible: bool,
    pub specialty: Option<String>,
    pub participation: Option<String>,
}

impl Sequenced for CareTeamRecord {
    fn sequence(&self) -> Option<i64> {
        self.sequence
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    pub code: Option<String>,
    pub description: Option<String>,
}

/// Nơi thực hiện dịch vụ, kèm bang và mã bưu chính của nhà cung cấp.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOfService {
    pub code: Option<String>,
    pub description: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineExtensions {
    pub betos_code: Option<String>,
    pub processing_indicator: Option<String>,
    pub clia_lab_number: Option<String>,
}

/// Phần bệnh nhân phải trả.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponsibility {
    pub coinsurance: f64,
    pub deductible: f64,
    pub non_covered: f64,
}

/// Số tiền của một dòng dịch vụ, lấy từ danh sách adjudication.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub submitted: f64,
    pub allowed: f64,
    pub payment: f64,
    pub patient_responsibility: PatientResponsibility,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdjudicationDetail {
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub reason: Option<String>,
}

/// Một dòng `claim.item[]` đã gắn chẩn đoán, care team và giá.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub line_number: Option<i64>,
    pub service_date: Option<String>,
    pub procedure_code: Option<String>,
    pub procedure_description: Option<String>,
    pub modifiers: Vec<Modifier>,
    pub diagnosis_pointers: Vec<i64>,
    pub place_of_service: PlaceOfService,
    pub quantity: Option<f64>,
    pub ndc_code: Option<String>,
    pub extensions: LineExtensions,
    pub pricing: Pricing,
    pub adjudication_details: Vec<AdjudicationDetail>,
    pub diagnoses: Vec<Arc<DiagnosisRecord>>,
    pub care_team: Vec<Arc<CareTeamRecord>>,
}

/// Giá trị kết quả xét nghiệm: số đo hoặc chuỗi.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ObservationValue {
    Number(f64),
    Text(String),
}

/// Kết quả xét nghiệm lấy từ `claim.contained[]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test_id: Option<String>,
    pub test_name: String,
    pub code: Option<String>,
    pub result: Option<ObservationValue>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Các extension riêng của claim carrier.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimExtensions {
    pub carrier_number: Option<String>,
    pub claim_control_number: Option<String>,
    pub assignment_code: Option<String>,
    pub claim_entry_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimInfo {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub claim_type: String,
    pub status: Option<String>,
    pub outcome: Option<String>,
    pub received_date: Option<String>,
    pub service_period: Period,
    pub extensions: ClaimExtensions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientReference {
    pub id: Option<String>,
    pub medicare_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BillingProvider {
    pub npi: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Providers {
    /// Thành viên đầu tiên có `responsible = true`.
    pub performing: Option<Arc<CareTeamRecord>>,
    pub billing: BillingProvider,
    /// Thành viên đầu tiên có vai trò "Referring".
    pub referral: Option<Arc<CareTeamRecord>>,
    pub all_members: Vec<Arc<CareTeamRecord>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Payer {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Insurance {
    #[serde(rename = "type")]
    pub insurance_type: String,
    pub payer: Payer,
    pub is_assigned: bool,
}

/// Tổng số tiền của claim, luôn cộng lại từ các dòng dịch vụ.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub submitted: f64,
    pub allowed: f64,
    pub paid: f64,
    pub patient_responsibility: PatientResponsibility,
}

impl Totals {
    /// Cộng dồn `pricing` của toàn bộ dòng dịch vụ.
    pub fn from_line_items(items: &[LineItem]) -> Self {
        items.iter().fold(Self::default(), |mut acc, item| {
            let pricing = &item.pricing;
            acc.submitted += pricing.submitted;
            acc.allowed += pricing.allowed;
            acc.paid += pricing.payment;
            acc.patient_responsibility.coinsurance += pricing.patient_responsibility.coinsurance;
            acc.patient_responsibility.deductible += pricing.patient_responsibility.deductible;
            acc.patient_responsibility.non_covered += pricing.patient_responsibility.non_covered;
            acc
        })
    }
}

/// Hình thức thanh toán suy ra từ tổng tiền.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    #[serde(rename = "Direct to provider")]
    DirectToProvider,
    #[serde(rename = "Patient responsibility")]
    PatientResponsibility,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl PaymentMethod {
    pub fn infer(totals: &Totals) -> Self {
        if totals.paid > 0.0 {
            PaymentMethod::DirectToProvider
        } else if totals.patient_responsibility.coinsurance > 0.0 {
            PaymentMethod::PatientResponsibility
        } else {
            PaymentMethod::Unknown
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub amount: f64,
    pub date: Option<String>,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BenefitFinancial {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BenefitBalance {
    pub category: Option<String>,
    pub financials: Vec<BenefitFinancial>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Financials {
    pub totals: Totals,
    pub payment: Payment,
    pub benefit_balance: Vec<BenefitBalance>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimMeta {
    pub last_updated: Option<String>,
    pub profile: Option<String>,
}

/// Kết quả cuối cùng của một lần chuyển đổi ExplanationOfBenefit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransformedClaim {
    pub claim_info: ClaimInfo,
    pub patient: PatientReference,
    pub providers: Providers,
    pub insurance: Insurance,
    pub line_items: Vec<LineItem>,
    pub diagnoses: Vec<Arc<DiagnosisRecord>>,
    pub test_results: Vec<TestResult>,
    pub financials: Financials,
    pub meta: ClaimMeta,
}

impl TransformedClaim {
    /// Các dòng dịch vụ trỏ tới chẩn đoán có `sequence` cho trước.
    pub fn lines_for_diagnosis(&self, sequence: i64) -> impl Iterator<Item = &LineItem> {
        self.line_items.iter().filter(move |item| {
            item.diagnoses
                .iter()
                .any(|diagnosis| diagnosis.sequence == Some(sequence))
        })
    }
}
