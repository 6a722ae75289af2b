//! Lookup of URL-identified FHIR extensions.
//!
//! CMS encodes claim-system fields (carrier number, BETOS code, buy-in
//! months...) as extensions keyed only by URL. Everything that reads one
//! goes through [`find_extension`].

use serde_json::Value;

use crate::path;

/// Extension URLs published by Blue Button 2.0.
pub mod urls {
    pub const CMS_VARIABLES: &str = "https://bluebutton.cms.gov/resources/variables/";

    pub const NDC: &str = "http://hl7.org/fhir/sid/ndc";
    pub const CARRIER_NUMBER: &str = "https://bluebutton.cms.gov/resources/variables/carr_num";
    pub const CLAIM_CONTROL_NUMBER: &str =
        "https://bluebutton.cms.gov/resources/variables/carr_clm_cntl_num";
    pub const ASSIGNMENT_CODE: &str = "https://bluebutton.cms.gov/resources/variables/asgmntcd";
    pub const CLAIM_ENTRY_CODE: &str =
        "https://bluebutton.cms.gov/resources/variables/carr_clm_entry_cd";
    pub const PARTICIPATION: &str =
        "https://bluebutton.cms.gov/resources/variables/prtcptng_ind_cd";
    pub const PROVIDER_STATE: &str = "https://bluebutton.cms.gov/resources/variables/prvdr_state_cd";
    pub const PROVIDER_ZIP: &str = "https://bluebutton.cms.gov/resources/variables/prvdr_zip";
    pub const BETOS_CODE: &str = "https://bluebutton.cms.gov/resources/variables/betos_cd";
    pub const PROCESSING_INDICATOR: &str =
        "https://bluebutton.cms.gov/resources/variables/line_prcsg_ind_cd";
    pub const CLIA_LAB_NUMBER: &str =
        "https://bluebutton.cms.gov/resources/variables/carr_line_clia_lab_num";
    pub const RACE: &str = "https://bluebutton.cms.gov/resources/variables/race";
    pub const FILL_NUMBER: &str = "https://bluebutton.cms.gov/resources/variables/fill_num";
    pub const DAYS_SUPPLY: &str = "https://bluebutton.cms.gov/resources/variables/days_suply_num";
}

/// The typed payload of an extension, chosen by which `value*` key is present.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionValue {
    Coding {
        code: Option<String>,
        display: Option<String>,
    },
    Identifier(Option<String>),
    Money(Option<f64>),
    Quantity(Option<f64>),
    Date(String),
}

impl ExtensionValue {
    pub fn from_entry(entry: &Value) -> Option<Self> {
        if let Some(coding) = entry.get("valueCoding") {
            return Some(ExtensionValue::Coding {
                code: path::get_string(coding, "code"),
                display: path::get_string(coding, "display"),
            });
        }
        if let Some(identifier) = entry.get("valueIdentifier") {
            return Some(ExtensionValue::Identifier(path::get_string(
                identifier, "value",
            )));
        }
        if let Some(money) = entry.get("valueMoney") {
            return Some(ExtensionValue::Money(path::get_f64(money, "value")));
        }
        if let Some(quantity) = entry.get("valueQuantity") {
            return Some(ExtensionValue::Quantity(path::get_f64(quantity, "value")));
        }
        path::get_string(entry, "valueDate").map(ExtensionValue::Date)
    }

    /// Human-readable text: coding display, then code; identifiers and dates as-is.
    pub fn text(&self) -> Option<String> {
        match self {
            ExtensionValue::Coding { code, display } => display.clone().or_else(|| code.clone()),
            ExtensionValue::Identifier(value) => value.clone(),
            ExtensionValue::Date(value) => Some(value.clone()),
            ExtensionValue::Money(value) | ExtensionValue::Quantity(value) => {
                value.map(|v| v.to_string())
            }
        }
    }
}

/// First extension in `extensions` whose `url` equals `url` exactly.
pub fn find_extension<'a>(extensions: Option<&'a Value>, url: &str) -> Option<&'a Value> {
    extensions?
        .as_array()?
        .iter()
        .find(|entry| entry.get("url").and_then(Value::as_str) == Some(url))
}

/// `valueCoding.display`, falling back to `valueCoding.code`.
pub fn extension_display(extensions: Option<&Value>, url: &str) -> Option<String> {
    let entry = find_extension(extensions, url)?;
    path::get_string(entry, "valueCoding.display")
        .or_else(|| path::get_string(entry, "valueCoding.code"))
}

pub fn extension_code(extensions: Option<&Value>, url: &str) -> Option<String> {
    find_extension(extensions, url).and_then(|entry| path::get_string(entry, "valueCoding.code"))
}

pub fn extension_identifier(extensions: Option<&Value>, url: &str) -> Option<String> {
    find_extension(extensions, url)
        .and_then(|entry| path::get_string(entry, "valueIdentifier.value"))
}

pub fn extension_money(extensions: Option<&Value>, url: &str) -> Option<f64> {
    find_extension(extensions, url).and_then(|entry| path::get_f64(entry, "valueMoney.value"))
}

pub fn extension_quantity(extensions: Option<&Value>, url: &str) -> Option<f64> {
    find_extension(extensions, url).and_then(|entry| path::get_f64(entry, "valueQuantity.value"))
}

pub fn extension_date(extensions: Option<&Value>, url: &str) -> Option<String> {
    find_extension(extensions, url).and_then(|entry| path::get_string(entry, "valueDate"))
}

/// Final path segment of an extension URL, e.g. `ms_cd` for `.../variables/ms_cd`.
pub fn url_suffix(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}
