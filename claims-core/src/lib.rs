//! Mô hình dữ liệu lõi cho lớp chuyển đổi claim Blue Button 2.0.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

mod claim;
mod demographics;

pub use claim::*;
pub use demographics::*;

/// Giá trị hiển thị khi trường nguồn không có dữ liệu.
pub const NOT_AVAILABLE: &str = "N/A";

/// Cấu hình điều chỉnh các giá trị cố định khi dựng claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransformConfig {
    /// Loại bảo hiểm gán cho mọi claim (nguồn không cung cấp trường này).
    pub insurance_type: String,
    /// Tên đơn vị chi trả hiển thị cạnh mã `insurer`.
    pub payer_name: String,
    /// Ngày thay thế khi sắp xếp các dòng dịch vụ không có ngày.
    pub undated_sort_sentinel: NaiveDate,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            insurance_type: "Medicare Part B".to_string(),
            payer_name: "Medicare".to_string(),
            undated_sort_sentinel: NaiveDate::from_ymd_opt(2100, 1, 1).unwrap_or(NaiveDate::MAX),
        }
    }
}

/// Loại claim theo code system `eob-type` của CMS.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimType {
    Carrier,
    Inpatient,
    Outpatient,
    Snf,
    Hha,
    Hospice,
    Dme,
    Pde,
}

impl ClaimType {
    pub const ALL: [ClaimType; 8] = [
        ClaimType::Carrier,
        ClaimType::Inpatient,
        ClaimType::Outpatient,
        ClaimType::Snf,
        ClaimType::Hha,
        ClaimType::Hospice,
        ClaimType::Dme,
        ClaimType::Pde,
    ];

    /// Mã dùng trong `type.coding[].code` và tham số `type` của API.
    pub fn as_code(self) -> &'static str {
        match self {
            ClaimType::Carrier => "CARRIER",
            ClaimType::Inpatient => "INPATIENT",
            ClaimType::Outpatient => "OUTPATIENT",
            ClaimType::Snf => "SNF",
            ClaimType::Hha => "HHA",
            ClaimType::Hospice => "HOSPICE",
            ClaimType::Dme => "DME",
            ClaimType::Pde => "PDE",
        }
    }
}

impl FromStr for ClaimType {
    type Err = ClaimsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        ClaimType::ALL
            .into_iter()
            .find(|kind| kind.as_code().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ClaimsError::UnknownClaimType(needle.to_string()))
    }
}

/// Đọc danh sách loại claim phân tách bằng dấu phẩy, ví dụ `carrier,snf`.
pub fn parse_type_list(raw: &str) -> Result<Vec<ClaimType>, ClaimsError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ClaimType::from_str)
        .collect()
}

/// Lỗi chung khi chuyển đổi dữ liệu claim.
#[derive(Debug, thiserror::Error)]
pub enum ClaimsError {
    #[error("Dữ liệu đầu vào không hợp lệ: {0}")]
    InvalidInput(String),
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Loại claim không được hỗ trợ: {0}")]
    UnknownClaimType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_type_parses_case_insensitively() {
        assert_eq!("carrier".parse::<ClaimType>().unwrap(), ClaimType::Carrier);
        assert_eq!(" SNF ".parse::<ClaimType>().unwrap(), ClaimType::Snf);
        assert!(matches!(
            "dental".parse::<ClaimType>(),
            Err(ClaimsError::UnknownClaimType(code)) if code == "dental"
        ));
    }

    #[test]
    fn type_list_skips_blank_segments() {
        let kinds = parse_type_list("carrier, dme,,").unwrap();
        assert_eq!(kinds, vec![ClaimType::Carrier, ClaimType::Dme]);
        assert!(parse_type_list("").unwrap().is_empty());
        assert!(parse_type_list("carrier,bogus").is_err());
    }

    #[test]
    fn default_config_uses_far_future_sentinel() {
        let config = TransformConfig::default();
        assert_eq!(config.insurance_type, "Medicare Part B");
        assert_eq!(config.payer_name, "Medicare");
        assert_eq!(
            config.undated_sort_sentinel,
            NaiveDate::from_ymd_opt(2100, 1, 1).unwrap()
        );
    }
}
