//! Bridge WASM <-> JavaScript cho lớp chuyển đổi claim Blue Button.

use chrono::NaiveDate;
use claims_core::{parse_type_list, ClaimsError, TransformConfig};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
struct JsTransformConfig {
    #[serde(default)]
    insurance_type: Option<String>,
    #[serde(default)]
    payer_name: Option<String>,
    #[serde(default)]
    undated_sort_sentinel: Option<NaiveDate>,
}

impl From<JsTransformConfig> for TransformConfig {
    fn from(cfg: JsTransformConfig) -> Self {
        let mut base = TransformConfig::default();
        if let Some(insurance_type) = cfg.insurance_type {
            base.insurance_type = insurance_type;
        }
        if let Some(payer_name) = cfg.payer_name {
            base.payer_name = payer_name;
        }
        if let Some(sentinel) = cfg.undated_sort_sentinel {
            base.undated_sort_sentinel = sentinel;
        }
        base
    }
}

fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn read_bundle(input_bundle: JsValue) -> Result<serde_json::Value, JsValue> {
    from_value::<serde_json::Value>(input_bundle)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON bundle: {err}")))
}

fn read_config(config: Option<JsValue>) -> Result<TransformConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsTransformConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            Ok(TransformConfig::from(cfg))
        }
        _ => Ok(TransformConfig::default()),
    }
}

/// Xuất ra object JS thuần (không dùng `Map`), `None` thành `null`.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&format!("Không serialize kết quả: {err}")))
}

fn format_claims_error(err: ClaimsError) -> String {
    format!("Claims error: {err}")
}

/// Chuyển entry đầu tiên của bundle thành claim đã kết nối.
#[wasm_bindgen]
pub fn transform_eob(input_bundle: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    init();
    let bundle = read_bundle(input_bundle)?;
    let cfg = read_config(config)?;

    let claim = claims_fhir::transform_eob(&bundle, &cfg)
        .map_err(|err| JsValue::from_str(&format_claims_error(err)))?;
    to_js(&claim)
}

/// Chuyển mọi ExplanationOfBenefit trong bundle.
#[wasm_bindgen]
pub fn transform_eob_bundle(
    input_bundle: JsValue,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    init();
    let bundle = read_bundle(input_bundle)?;
    let cfg = read_config(config)?;

    let claims = claims_fhir::transform_eob_bundle(&bundle, &cfg)
        .map_err(|err| JsValue::from_str(&format_claims_error(err)))?;
    to_js(&claims)
}

/// Lọc bundle theo danh sách loại claim, ví dụ `"CARRIER,SNF"`.
#[wasm_bindgen]
pub fn filter_eob(input_bundle: JsValue, types: &str) -> Result<JsValue, JsValue> {
    init();
    let bundle = read_bundle(input_bundle)?;
    let kinds =
        parse_type_list(types).map_err(|err| JsValue::from_str(&format_claims_error(err)))?;

    to_js(&claims_fhir::filter_by_claim_types(&bundle, &kinds))
}

#[wasm_bindgen]
pub fn extract_patients(input_bundle: JsValue) -> Result<JsValue, JsValue> {
    init();
    let bundle = read_bundle(input_bundle)?;
    to_js(&claims_fhir::extract_patients(&bundle))
}

#[wasm_bindgen]
pub fn extract_coverages(input_bundle: JsValue) -> Result<JsValue, JsValue> {
    init();
    let bundle = read_bundle(input_bundle)?;
    to_js(&claims_fhir::extract_coverages(&bundle))
}

/// Tóm tắt phẳng cho mọi claim trong bundle.
#[wasm_bindgen]
pub fn summarize_claims(input_bundle: JsValue) -> Result<JsValue, JsValue> {
    init();
    let bundle = read_bundle(input_bundle)?;
    to_js(&claims_fhir::summarize_claims(&bundle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_overrides_only_present_fields() {
        let cfg: JsTransformConfig =
            serde_json::from_str(r#"{ "payer_name": "CMS" }"#).unwrap();
        let config = TransformConfig::from(cfg);
        assert_eq!(config.payer_name, "CMS");
        assert_eq!(config.insurance_type, "Medicare Part B");
        assert_eq!(
            config.undated_sort_sentinel,
            TransformConfig::default().undated_sort_sentinel
        );
    }

    #[test]
    fn sentinel_override_parses_iso_dates() {
        let cfg: JsTransformConfig =
            serde_json::from_str(r#"{ "undated_sort_sentinel": "2999-12-31" }"#).unwrap();
        assert_eq!(
            TransformConfig::from(cfg).undated_sort_sentinel,
            NaiveDate::from_ymd_opt(2999, 12, 31).unwrap()
        );
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(
            TransformConfig::from(JsTransformConfig::default()),
            TransformConfig::default()
        );
    }
}
