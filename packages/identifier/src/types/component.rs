//! The component taxonomy and the extracted component shape.

use serde::{Deserialize, Serialize};

/// The fixed taxonomy of reusable component types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    /// Standard regulatory or administrative text (GCP statements,
    /// confidentiality clauses)
    Boilerplate,

    /// Precise definitions of terms, endpoints, or events
    Definition,

    /// Study-specific methodology (inclusion/exclusion criteria, objectives)
    StudySection,

    /// Information about the investigational product (dosing, mechanism)
    DrugInfo,

    /// Safety monitoring or reporting procedures
    Safety,

    /// Clinical or administrative procedures
    Procedure,
}

impl ComponentType {
    /// All taxonomy entries, in display order.
    pub const ALL: [ComponentType; 6] = [
        ComponentType::Boilerplate,
        ComponentType::Definition,
        ComponentType::StudySection,
        ComponentType::DrugInfo,
        ComponentType::Safety,
        ComponentType::Procedure,
    ];

    /// Wire name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Boilerplate => "boilerplate",
            ComponentType::Definition => "definition",
            ComponentType::StudySection => "study_section",
            ComponentType::DrugInfo => "drug_info",
            ComponentType::Safety => "safety",
            ComponentType::Procedure => "procedure",
        }
    }

    /// Parse a wire name. Unknown labels return `None`; the validator drops
    /// those records rather than failing the response.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "boilerplate" => Some(ComponentType::Boilerplate),
            "definition" => Some(ComponentType::Definition),
            "study_section" => Some(ComponentType::StudySection),
            "drug_info" => Some(ComponentType::DrugInfo),
            "safety" => Some(ComponentType::Safety),
            "procedure" => Some(ComponentType::Procedure),
            _ => None,
        }
    }

    /// Short human description, as served by the taxonomy endpoint.
    pub fn description(&self) -> &'static str {
        match self {
            ComponentType::Boilerplate => "Standard regulatory or administrative text",
            ComponentType::Definition => "Precise definitions of terms or endpoints",
            ComponentType::StudySection => "Study-specific methodology or procedures",
            ComponentType::DrugInfo => "Information about investigational product",
            ComponentType::Safety => "Safety monitoring or reporting procedures",
            ComponentType::Procedure => "Clinical or administrative procedures",
        }
    }
}

/// Coarse estimate of how often a component recurs across documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReusePotential {
    High,
    Medium,
    Low,
    /// The model omitted the field or emitted an unrecognized label.
    Unknown,
}

impl ReusePotential {
    /// Parse a wire label, mapping anything unrecognized to `Unknown`.
    pub fn parse_lenient(s: Option<&str>) -> Self {
        match s {
            Some("high") => ReusePotential::High,
            Some("medium") => ReusePotential::Medium,
            Some("low") => ReusePotential::Low,
            _ => ReusePotential::Unknown,
        }
    }
}

/// A typed, confidence-scored span of clinical text judged reusable
/// across documents.
///
/// Created transiently per extraction request and owned by the response
/// that produced it; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// Taxonomy type
    #[serde(rename = "type")]
    pub component_type: ComponentType,

    /// Short human label
    pub title: String,

    /// The extracted span
    pub text: String,

    /// Model-reported certainty, always within [0.0, 1.0]
    pub confidence: f64,

    /// Reuse estimate
    pub reuse_potential: ReusePotential,

    /// Free-text justification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,

    /// Stable identifier, unique within a response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_type_round_trip() {
        for ty in ComponentType::ALL {
            assert_eq!(ComponentType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(ComponentType::parse("paragraph"), None);
    }

    #[test]
    fn test_component_type_serde_wire_names() {
        let json = serde_json::to_string(&ComponentType::StudySection).unwrap();
        assert_eq!(json, r#""study_section""#);

        let ty: ComponentType = serde_json::from_str(r#""drug_info""#).unwrap();
        assert_eq!(ty, ComponentType::DrugInfo);
    }

    #[test]
    fn test_reuse_potential_lenient_parse() {
        assert_eq!(ReusePotential::parse_lenient(Some("high")), ReusePotential::High);
        assert_eq!(ReusePotential::parse_lenient(Some("HIGH")), ReusePotential::Unknown);
        assert_eq!(ReusePotential::parse_lenient(Some("sometimes")), ReusePotential::Unknown);
        assert_eq!(ReusePotential::parse_lenient(None), ReusePotential::Unknown);
    }

    #[test]
    fn test_component_serialization_omits_empty_optionals() {
        let component = Component {
            component_type: ComponentType::Boilerplate,
            title: "GCP Compliance Statement".into(),
            text: "This study follows GCP guidelines.".into(),
            confidence: 0.97,
            reuse_potential: ReusePotential::High,
            rationale: None,
            component_id: None,
        };

        let json = serde_json::to_value(&component).unwrap();
        assert_eq!(json["type"], "boilerplate");
        assert!(json.get("rationale").is_none());
        assert!(json.get("component_id").is_none());
    }
}
