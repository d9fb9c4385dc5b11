//! Response envelopes of the grade endpoints.
//!
//! The backend has shipped several shapes over time. Each is an explicit
//! variant, tried in a fixed order.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct GradeNamesField {
    #[serde(rename = "gradeNames")]
    grade_names: Vec<Value>,
}

/// Accepted shapes of `GET /grade-names`, in priority order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GradeListEnvelope {
    /// `{ "data": { "gradeNames": [...] } }`
    Nested { data: GradeNamesField },
    /// `[...]`
    Bare(Vec<Value>),
    /// `{ "gradeNames": [...] }`
    TopLevel {
        #[serde(rename = "gradeNames")]
        grade_names: Vec<Value>,
    },
}

#[derive(Debug, Deserialize)]
struct ElementsField {
    elements: Vec<Value>,
}

/// Accepted shapes of `POST /grade-elements`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ElementsEnvelope {
    Flat(ElementsField),
    Nested { data: ElementsField },
}

/// Grade names from any accepted envelope; unrecognized shapes yield an
/// empty list. Non-string and blank entries are dropped.
pub fn decode_grade_names(body: Value) -> Vec<String> {
    let entries = match serde_json::from_value::<GradeListEnvelope>(body) {
        Ok(GradeListEnvelope::Nested { data }) => data.grade_names,
        Ok(GradeListEnvelope::Bare(list)) => list,
        Ok(GradeListEnvelope::TopLevel { grade_names }) => grade_names,
        Err(_) => return Vec::new(),
    };
    entries
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Raw element entries, or `None` when the body matches no envelope.
pub fn decode_element_entries(body: Value) -> Option<Vec<String>> {
    let entries = match serde_json::from_value::<ElementsEnvelope>(body).ok()? {
        ElementsEnvelope::Flat(field) | ElementsEnvelope::Nested { data: field } => field.elements,
    };
    Some(entries.iter().filter_map(normalize_entry).collect())
}

/// Trimmed string form of an entry; falsy entries (`null`, `false`, `0`,
/// blank strings) are dropped.
fn normalize_entry(entry: &Value) -> Option<String> {
    let text = match entry {
        Value::Null | Value::Bool(false) => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) if n.as_f64() == Some(0.0) => return None,
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_envelope_wins() {
        let body = json!({"data": {"gradeNames": ["A", "B"]}, "gradeNames": ["Z"]});
        assert_eq!(decode_grade_names(body), vec!["A", "B"]);
    }

    #[test]
    fn bare_array() {
        assert_eq!(decode_grade_names(json!(["SG-400", " EN-GJS "])), vec!["SG-400", "EN-GJS"]);
    }

    #[test]
    fn top_level_used_when_nested_is_not_an_array() {
        let body = json!({"data": {"gradeNames": "oops"}, "gradeNames": ["C"]});
        assert_eq!(decode_grade_names(body), vec!["C"]);
    }

    #[test]
    fn unknown_shapes_are_empty() {
        assert!(decode_grade_names(json!({"grades": ["A"]})).is_empty());
        assert!(decode_grade_names(Value::Null).is_empty());
        assert!(decode_grade_names(json!("A")).is_empty());
    }

    #[test]
    fn non_string_grade_names_are_dropped() {
        assert_eq!(decode_grade_names(json!(["A", 3, null, ""])), vec!["A"]);
    }

    #[test]
    fn element_entries_are_normalized() {
        let body = json!({"elements": [" Fe ", "", null, false, 0, "C"]});
        assert_eq!(decode_element_entries(body), Some(vec!["Fe".into(), "C".into()]));
    }

    #[test]
    fn element_entries_under_data() {
        let body = json!({"data": {"elements": ["Mn"]}});
        assert_eq!(decode_element_entries(body), Some(vec!["Mn".into()]));
        assert_eq!(decode_element_entries(json!({"items": []})), None);
    }
}
