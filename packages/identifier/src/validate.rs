//! Response validation - turn an untrusted model reply into a
//! policy-compliant component list.
//!
//! The pipeline is parse -> repair -> filter -> sort -> truncate -> assign
//! ids. Structural failure (the reply is not component-shaped data at all)
//! is the caller's signal to issue the single corrective retry; everything
//! below that level is repaired in place to maximize yield from an
//! imperfect model:
//!
//! - unknown `type` labels drop the record, they do not fail the response
//! - out-of-range confidences are clamped into [0, 1]
//! - missing or unrecognized `reuse_potential` maps to `Unknown`

use serde::Deserialize;

use openai_client::strip_code_blocks;

use crate::error::{IdentifyError, Result};
use crate::types::component::{Component, ComponentType, ReusePotential};
use crate::types::request::IdentifyOptions;

/// A component-shaped record as the model emitted it, before repair.
///
/// Every field is optional: structural leniency lives here, and the
/// repair step decides what each absence means.
#[derive(Debug, Clone, Deserialize)]
pub struct RawComponent {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub text: Option<String>,

    /// Number or numeric string; models occasionally emit either
    #[serde(default)]
    pub confidence: Option<serde_json::Value>,

    #[serde(default)]
    pub reuse_potential: Option<String>,

    #[serde(default)]
    pub rationale: Option<String>,

    #[serde(default)]
    pub component_id: Option<String>,
}

/// Parse a raw model reply into component-shaped records.
///
/// Accepts, in order of preference: a bare JSON array (optionally inside
/// markdown fences), an object wrapping the array under a `components`
/// key, a single object, and finally the outermost `[...]` span of an
/// otherwise unparseable reply. Fails with `SchemaError` only when none
/// of these produce structured data.
pub fn parse_components(raw: &str) -> Result<Vec<RawComponent>> {
    let cleaned = strip_code_blocks(raw);

    let value = match serde_json::from_str::<serde_json::Value>(cleaned) {
        Ok(value) => value,
        Err(_) => extract_array_span(cleaned).ok_or_else(|| {
            IdentifyError::Schema("response is not valid JSON and contains no array".into())
        })?,
    };

    records_from_value(value)
        .ok_or_else(|| IdentifyError::Schema("response JSON is not component-shaped".into()))
}

/// Last-resort parse: the outermost `[...]` span of the reply.
fn extract_array_span(text: &str) -> Option<serde_json::Value> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn records_from_value(value: serde_json::Value) -> Option<Vec<RawComponent>> {
    let elements = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("components") {
            Some(serde_json::Value::Array(items)) => items,
            // A single bare object is treated as a one-element list
            _ => vec![serde_json::Value::Object(map)],
        },
        _ => return None,
    };

    // Individual malformed elements are dropped, not fatal
    Some(
        elements
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
    )
}

/// Repair parsed records into typed components.
///
/// Records without a recognized type, a title, a text span, or a
/// coercible confidence are dropped; everything else is repaired.
pub fn repair_components(records: Vec<RawComponent>) -> Vec<Component> {
    records.into_iter().filter_map(repair_one).collect()
}

fn repair_one(record: RawComponent) -> Option<Component> {
    let component_type = ComponentType::parse(record.kind.as_deref()?)?;
    let title = non_empty(record.title)?;
    let text = non_empty(record.text)?;
    let confidence = coerce_confidence(record.confidence.as_ref()?)?.clamp(0.0, 1.0);

    Some(Component {
        component_type,
        title,
        text,
        confidence,
        reuse_potential: ReusePotential::parse_lenient(record.reuse_potential.as_deref()),
        rationale: record.rationale.filter(|r| !r.trim().is_empty()),
        component_id: record.component_id.filter(|id| !id.trim().is_empty()),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn coerce_confidence(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Apply the policy filters, in order: confidence floor, descending sort,
/// cap, then positional id assignment for components the model left
/// unlabeled.
pub fn apply_policy(
    mut components: Vec<Component>,
    options: &IdentifyOptions,
) -> Vec<Component> {
    components.retain(|c| c.confidence >= options.min_confidence);
    components.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    components.truncate(options.max_components);

    for (i, component) in components.iter_mut().enumerate() {
        if component.component_id.is_none() {
            component.component_id = Some(format!("comp_{:03}", i + 1));
        }
    }

    components
}

/// Full pass: parse, repair, and apply policy in one call.
pub fn validate_response(raw: &str, options: &IdentifyOptions) -> Result<Vec<Component>> {
    let records = parse_components(raw)?;
    Ok(apply_policy(repair_components(records), options))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str, confidence: f64) -> serde_json::Value {
        serde_json::json!({
            "type": kind,
            "title": format!("{} title", kind),
            "text": format!("{} text", kind),
            "confidence": confidence,
            "reuse_potential": "high",
            "rationale": "why"
        })
    }

    #[test]
    fn test_parse_bare_array() {
        let raw = serde_json::json!([record("boilerplate", 0.9)]).to_string();
        assert_eq!(parse_components(&raw).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_fenced_array() {
        let raw = format!(
            "```json\n{}\n```",
            serde_json::json!([record("safety", 0.8)])
        );
        assert_eq!(parse_components(&raw).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_object_with_components_key() {
        let raw = serde_json::json!({"components": [record("definition", 0.9)]}).to_string();
        assert_eq!(parse_components(&raw).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_single_object() {
        let raw = record("procedure", 0.85).to_string();
        assert_eq!(parse_components(&raw).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_array_embedded_in_prose() {
        let raw = format!(
            "Here are the components you asked for: {} Hope that helps!",
            serde_json::json!([record("drug_info", 0.9)])
        );
        assert_eq!(parse_components(&raw).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_garbage_is_schema_error() {
        let err = parse_components("I could not find any components, sorry.").unwrap_err();
        assert!(matches!(err, IdentifyError::Schema(_)));
    }

    #[test]
    fn test_unknown_type_dropped_not_fatal() {
        let raw = serde_json::json!([
            record("boilerplate", 0.9),
            record("paragraph", 0.95),
        ])
        .to_string();

        let components = repair_components(parse_components(&raw).unwrap());
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].component_type, ComponentType::Boilerplate);
    }

    #[test]
    fn test_out_of_range_confidence_clamped() {
        let raw = serde_json::json!([
            record("safety", 1.3),
            record("definition", -0.2),
        ])
        .to_string();

        let components = repair_components(parse_components(&raw).unwrap());
        assert_eq!(components[0].confidence, 1.0);
        assert_eq!(components[1].confidence, 0.0);
    }

    #[test]
    fn test_string_confidence_coerced() {
        let raw = r#"[{"type": "safety", "title": "t", "text": "x", "confidence": "0.85"}]"#;
        let components = repair_components(parse_components(raw).unwrap());
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].confidence, 0.85);
    }

    #[test]
    fn test_missing_reuse_potential_maps_to_unknown() {
        let raw = r#"[{"type": "safety", "title": "t", "text": "x", "confidence": 0.9}]"#;
        let components = repair_components(parse_components(raw).unwrap());
        assert_eq!(components[0].reuse_potential, ReusePotential::Unknown);
    }

    #[test]
    fn test_record_without_text_dropped() {
        let raw = r#"[{"type": "safety", "title": "t", "confidence": 0.9}]"#;
        let components = repair_components(parse_components(raw).unwrap());
        assert!(components.is_empty());
    }

    #[test]
    fn test_policy_filters_sorts_and_truncates() {
        let raw = serde_json::json!([
            record("boilerplate", 0.72),
            record("definition", 0.95),
            record("safety", 0.55),
            record("procedure", 0.88),
        ])
        .to_string();

        let options = IdentifyOptions::default()
            .with_min_confidence(0.7)
            .with_max_components(2);
        let components = validate_response(&raw, &options).unwrap();

        assert_eq!(components.len(), 2);
        assert_eq!(components[0].confidence, 0.95);
        assert_eq!(components[1].confidence, 0.88);
    }

    #[test]
    fn test_policy_respects_existing_ids() {
        let raw = serde_json::json!([
            {
                "type": "safety",
                "title": "t",
                "text": "x",
                "confidence": 0.9,
                "component_id": "upstream-7"
            },
            record("definition", 0.8),
        ])
        .to_string();

        let components = validate_response(&raw, &IdentifyOptions::default()).unwrap();
        assert_eq!(components[0].component_id.as_deref(), Some("upstream-7"));
        assert_eq!(components[1].component_id.as_deref(), Some("comp_002"));
    }

    #[test]
    fn test_ids_are_positional_after_filtering() {
        let raw = serde_json::json!([
            record("safety", 0.4),
            record("definition", 0.9),
            record("boilerplate", 0.8),
        ])
        .to_string();

        let components = validate_response(&raw, &IdentifyOptions::default()).unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].component_id.as_deref(), Some("comp_001"));
        assert_eq!(components[1].component_id.as_deref(), Some("comp_002"));
    }

    #[test]
    fn test_high_floor_yields_empty_not_error() {
        let raw = serde_json::json!([record("boilerplate", 0.9)]).to_string();
        let options = IdentifyOptions::default().with_min_confidence(0.99);
        let components = validate_response(&raw, &options).unwrap();
        assert!(components.is_empty());
    }

    #[test]
    fn test_empty_array_is_valid() {
        let components = validate_response("[]", &IdentifyOptions::default()).unwrap();
        assert!(components.is_empty());
    }
}
