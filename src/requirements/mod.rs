//! Requirements document ingestion.
//!
//! Accepts the JSON shapes seen in practice and normalizes them into one
//! canonical [`RequirementsDocument`]:
//! - metadata nested under `"metadata"` (an object, or a list of
//!   `{"field": .., "expected": ..}` rows) or placed at the root
//! - field aliases (`campaign_code`, `country_code`, `sender_address`, ...)
//! - scalar values as strings or numbers
//!
//! Unknown keys are ignored; a missing or blank value means "not checked".

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error_handling::InputError;
use crate::normalize::non_blank;

/// Canonical field names and the keys accepted for each, in priority order.
const FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("sender", &["sender", "sender_address", "sender-address", "from"]),
    ("sender_name", &["sender_name", "sender-name", "from_name"]),
    ("reply_to", &["reply_to", "reply-to", "reply_address", "reply-address"]),
    ("subject", &["subject"]),
    ("preheader", &["preheader"]),
    ("copyright_year", &["copyright_year", "copyright"]),
    ("footer_campaign_code", &["footer_campaign_code", "campaign_code"]),
    ("country", &["country", "country_code"]),
    ("language", &["language", "lang"]),
];

/// Expected metadata values. `None` means the field is surfaced as INFO.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataRequirements {
    pub sender: Option<String>,
    pub sender_name: Option<String>,
    pub reply_to: Option<String>,
    pub subject: Option<String>,
    pub preheader: Option<String>,
    pub copyright_year: Option<String>,
    /// Campaign code expected in the footer (prefix allowed)
    pub footer_campaign_code: Option<String>,
    /// Country expected next to the footer campaign code
    pub country: Option<String>,
    /// Expected `<html lang>`; only checked when present
    pub language: Option<String>,
}

/// The normalized requirements for one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequirementsDocument {
    pub metadata: MetadataRequirements,
    /// UTM parameter name to expected value, in document order; `"*"`
    /// accepts any non-empty value
    pub utm_parameters: Vec<(String, String)>,
    /// Locale code the requirements were written (or localized) for
    pub locale: Option<String>,
}

impl RequirementsDocument {
    /// Parses requirements from JSON text.
    ///
    /// # Errors
    ///
    /// `InputError::InvalidRequirementsJson` for malformed JSON and
    /// `InputError::RequirementsNotAnObject` when the top level is not an
    /// object.
    pub fn from_json(json: &str) -> Result<Self, InputError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Reads and parses a requirements file.
    pub fn load(path: &Path) -> Result<Self, InputError> {
        let raw = std::fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Normalizes an already-parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self, InputError> {
        let root = value
            .as_object()
            .ok_or_else(|| InputError::RequirementsNotAnObject(json_kind(value)))?;

        let nested = match root.get("metadata") {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Array(rows)) => rows_to_map(rows),
            Some(other) if !other.is_null() => {
                log::warn!(
                    "Ignoring requirements metadata of type {}",
                    json_kind(other)
                );
                Map::new()
            }
            _ => Map::new(),
        };

        let field = |canonical: &str| -> Option<String> {
            let keys = FIELD_ALIASES
                .iter()
                .find(|(name, _)| *name == canonical)
                .map_or(&[][..], |(_, keys)| *keys);
            [&nested, root]
                .iter()
                .flat_map(|map| keys.iter().map(move |key| map.get(*key)))
                .flatten()
                .find_map(scalar_to_string)
        };

        let mut metadata = MetadataRequirements {
            sender: field("sender"),
            sender_name: field("sender_name"),
            reply_to: field("reply_to"),
            subject: field("subject"),
            preheader: field("preheader"),
            copyright_year: field("copyright_year"),
            footer_campaign_code: field("footer_campaign_code"),
            country: field("country"),
            language: field("language"),
        };
        split_localized_code(&mut metadata);

        let utm_parameters = match root.get("utm_parameters") {
            Some(Value::Object(map)) => map
                .iter()
                .filter_map(|(name, value)| {
                    scalar_to_string(value).map(|expected| (name.clone(), expected))
                })
                .collect(),
            Some(other) if !other.is_null() => {
                log::warn!("Ignoring utm_parameters of type {}", json_kind(other));
                Vec::new()
            }
            _ => Vec::new(),
        };

        let locale = root.get("locale").and_then(scalar_to_string);

        log::debug!(
            "Loaded requirements: {} UTM parameters, locale={:?}",
            utm_parameters.len(),
            locale
        );
        Ok(Self {
            metadata,
            utm_parameters,
            locale,
        })
    }

    /// Expected value for a UTM parameter, if required.
    pub fn utm_expectation(&self, name: &str) -> Option<&str> {
        self.utm_parameters
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, expected)| expected.as_str())
    }
}

/// `{"field": "subject", "expected": "Sale"}` rows into a key/value map.
fn rows_to_map(rows: &[Value]) -> Map<String, Value> {
    rows.iter()
        .filter_map(Value::as_object)
        .filter_map(|row| {
            let name = ["field", "field_name", "name"]
                .iter()
                .find_map(|k| row.get(*k).and_then(Value::as_str))?;
            let expected = ["expected", "expected_value", "value"]
                .iter()
                .find_map(|k| row.get(*k))?;
            Some((name.to_string(), expected.clone()))
        })
        .collect()
}

/// Strings are trimmed, numbers stringified; everything else is "not set".
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s).map(str::to_string),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Splits a localized `"ABC2505 - US"` campaign code into code and country.
///
/// An explicit `country` requirement wins over the split suffix.
fn split_localized_code(metadata: &mut MetadataRequirements) {
    let Some(raw) = metadata.footer_campaign_code.clone() else {
        return;
    };
    let Some((code, country)) = raw.rsplit_once('-') else {
        return;
    };
    let (code, country) = (code.trim(), country.trim());
    if code.is_empty() || country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
        return;
    }
    metadata.footer_campaign_code = Some(code.to_string());
    if metadata.country.is_none() {
        metadata.country = Some(country.to_ascii_uppercase());
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
