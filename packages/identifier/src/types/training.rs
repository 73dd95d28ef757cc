//! Training record schema for fine-tuning artifacts.
//!
//! One labeled example is a three-message chat exchange whose assistant
//! turn is a serialized component list. Training data and inference output
//! share the component contract: an artifact line is only valid if its
//! assistant content parses under the same schema the response validator
//! enforces at inference time.

use serde::{Deserialize, Serialize};

use crate::error::{IdentifyError, Result};
use crate::types::component::Component;

/// Maximum number of per-line errors reported for one artifact.
const MAX_REPORTED_ERRORS: usize = 10;

/// One chat message inside a training example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// One labeled training example in the provider's chat fine-tune format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingExample {
    pub messages: Vec<ChatTurn>,
}

impl TrainingExample {
    /// Build an example from its three parts.
    pub fn new(
        system_prompt: impl Into<String>,
        user_text: impl Into<String>,
        assistant_json: impl Into<String>,
    ) -> Self {
        Self {
            messages: vec![
                ChatTurn {
                    role: "system".to_string(),
                    content: system_prompt.into(),
                },
                ChatTurn {
                    role: "user".to_string(),
                    content: user_text.into(),
                },
                ChatTurn {
                    role: "assistant".to_string(),
                    content: assistant_json.into(),
                },
            ],
        }
    }

    /// The assistant turn's content, if present.
    pub fn assistant_json(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == "assistant")
            .map(|m| m.content.as_str())
    }

    /// Check this example against the shared component contract.
    ///
    /// Requires a system, a user, and an assistant turn, none empty, and an
    /// assistant content that parses as a component list with in-range
    /// confidences.
    pub fn validate(&self) -> Result<()> {
        let roles: Vec<&str> = self.messages.iter().map(|m| m.role.as_str()).collect();
        for required in ["system", "user", "assistant"] {
            if !roles.contains(&required) {
                return Err(IdentifyError::Validation(format!(
                    "missing {} message",
                    required
                )));
            }
        }

        for (i, turn) in self.messages.iter().enumerate() {
            if turn.content.trim().is_empty() {
                return Err(IdentifyError::Validation(format!(
                    "message {} ({}) has empty content",
                    i, turn.role
                )));
            }
        }

        let assistant = self
            .assistant_json()
            .ok_or_else(|| IdentifyError::Validation("missing assistant message".into()))?;
        let components: Vec<Component> = serde_json::from_str(assistant).map_err(|e| {
            IdentifyError::Validation(format!("assistant content is not a component list: {}", e))
        })?;

        for component in &components {
            if !(0.0..=1.0).contains(&component.confidence) {
                return Err(IdentifyError::Validation(format!(
                    "component confidence {} out of range",
                    component.confidence
                )));
            }
        }

        Ok(())
    }
}

/// Validate a line-oriented training artifact.
///
/// Every non-empty line must parse as a [`TrainingExample`] that passes
/// [`TrainingExample::validate`]. Returns the number of examples on
/// success; on failure, reports the first few offending lines (1-based)
/// in one `ValidationError`.
pub fn validate_artifact(content: &str) -> Result<usize> {
    let mut count = 0;
    let mut errors: Vec<String> = Vec::new();

    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let line_no = i + 1;
        match serde_json::from_str::<TrainingExample>(line) {
            Ok(example) => match example.validate() {
                Ok(()) => count += 1,
                Err(e) => errors.push(format!("line {}: {}", line_no, e)),
            },
            Err(e) => errors.push(format!("line {}: invalid JSON: {}", line_no, e)),
        }

        if errors.len() >= MAX_REPORTED_ERRORS {
            break;
        }
    }

    if !errors.is_empty() {
        return Err(IdentifyError::Validation(format!(
            "training artifact invalid: {}",
            errors.join("; ")
        )));
    }

    if count == 0 {
        return Err(IdentifyError::Validation(
            "training artifact contains no examples".into(),
        ));
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_assistant_json() -> String {
        serde_json::json!([{
            "type": "boilerplate",
            "title": "GCP Compliance Statement",
            "text": "This study will be conducted in accordance with GCP.",
            "confidence": 0.97,
            "reuse_potential": "high",
            "rationale": "Standard regulatory compliance statement"
        }])
        .to_string()
    }

    fn valid_example() -> TrainingExample {
        TrainingExample::new(
            "Identify reusable components in clinical documents.",
            "Identify components in this clinical text:\n\nThis study follows GCP.",
            valid_assistant_json(),
        )
    }

    #[test]
    fn test_round_trip_under_component_schema() {
        let example = valid_example();
        assert!(example.validate().is_ok());

        // The assistant content parses under the shared contract
        let components: Vec<Component> =
            serde_json::from_str(example.assistant_json().unwrap()).unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].confidence, 0.97);
    }

    #[test]
    fn test_missing_assistant_rejected() {
        let example = TrainingExample {
            messages: vec![
                ChatTurn {
                    role: "system".into(),
                    content: "prompt".into(),
                },
                ChatTurn {
                    role: "user".into(),
                    content: "text".into(),
                },
            ],
        };
        assert!(matches!(
            example.validate(),
            Err(IdentifyError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_content_rejected() {
        let example = TrainingExample::new("prompt", "  ", valid_assistant_json());
        assert!(example.validate().is_err());
    }

    #[test]
    fn test_non_component_assistant_rejected() {
        let example = TrainingExample::new("prompt", "text", r#"{"not": "a list"}"#);
        assert!(example.validate().is_err());
    }

    #[test]
    fn test_out_of_range_confidence_rejected() {
        let assistant = serde_json::json!([{
            "type": "safety",
            "title": "AE Reporting",
            "text": "All serious adverse events must be reported within 24 hours.",
            "confidence": 1.4,
            "reuse_potential": "high"
        }])
        .to_string();
        let example = TrainingExample::new("prompt", "text", assistant);
        assert!(example.validate().is_err());
    }

    #[test]
    fn test_artifact_validation_reports_line_numbers() {
        let good = serde_json::to_string(&valid_example()).unwrap();
        let content = format!("{}\nnot json at all\n{}\n", good, good);

        let err = validate_artifact(&content).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 2"), "got: {}", message);
    }

    #[test]
    fn test_artifact_validation_counts_examples() {
        let good = serde_json::to_string(&valid_example()).unwrap();
        let content = format!("{}\n\n{}\n", good, good);
        assert_eq!(validate_artifact(&content).unwrap(), 2);
    }

    #[test]
    fn test_empty_artifact_rejected() {
        assert!(validate_artifact("\n\n").is_err());
    }
}
