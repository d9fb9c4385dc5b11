//! Form field keys and values.

use core::fmt;

use ms_core::{ElementSymbol, lenient_number};
use serde::{Deserialize, Serialize};

use crate::fields::RESERVED_STATIC_KEYS;

const RAW_SUFFIX: &str = "_raw";
const SCRAP_PREFIX: &str = "scrap_";

/// Which schema-driven family a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementFamily {
    /// Raw/virgin metal quantity, `<element>_raw`.
    Raw,
    /// Scrap composition percentage, `scrap_<element>`.
    Scrap,
}

impl ElementFamily {
    pub fn key(self, element: &ElementSymbol) -> FieldKey {
        match self {
            ElementFamily::Raw => FieldKey::Raw(element.clone()),
            ElementFamily::Scrap => FieldKey::Scrap(element.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    Static(String),
    Raw(ElementSymbol),
    Scrap(ElementSymbol),
}

impl FieldKey {
    /// Classify a textual key. Element parts are normalized, so `Fe_raw`
    /// and `fe_raw` name the same field.
    pub fn parse(raw: &str) -> Self {
        let key = raw.trim();
        if RESERVED_STATIC_KEYS.contains(&key) {
            return FieldKey::Static(key.to_string());
        }
        if let Some(element) = key.strip_suffix(RAW_SUFFIX).and_then(ElementSymbol::parse) {
            return FieldKey::Raw(element);
        }
        if let Some(element) = key.strip_prefix(SCRAP_PREFIX).and_then(ElementSymbol::parse) {
            return FieldKey::Scrap(element);
        }
        FieldKey::Static(key.to_string())
    }

    pub fn is_schema_driven(&self) -> bool {
        !matches!(self, FieldKey::Static(_))
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Static(key) => f.write_str(key),
            FieldKey::Raw(element) => write!(f, "{}{}", element.key(), RAW_SUFFIX),
            FieldKey::Scrap(element) => write!(f, "{}{}", SCRAP_PREFIX, element.key()),
        }
    }
}

/// A form value: operator text or a number written by the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(text) if text.trim().is_empty())
    }

    /// Numeric reading of the value; text that is not a number reads as zero.
    pub fn as_number(&self) -> f64 {
        match self {
            FieldValue::Number(v) if v.is_finite() => *v,
            FieldValue::Number(_) => 0.0,
            FieldValue::Text(text) => lenient_number(text),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(v) => write!(f, "{v}"),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}
