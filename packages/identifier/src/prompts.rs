//! Prompt templates for the identification pipeline.
//!
//! The system prompt carries the component taxonomy and few-shot examples;
//! the corrective prompt is issued at most once per request, when the
//! model's first reply cannot be parsed.

const FEW_SHOT_EXAMPLES: &str = r#"EXAMPLE 1:
Input: "This study will be conducted in accordance with Good Clinical Practice (GCP) as defined by the International Council for Harmonisation (ICH) and in accordance with the ethical principles underlying European Union Directive 2001/20/EC."
Output: [{"type": "boilerplate", "title": "GCP Compliance Statement", "text": "This study will be conducted in accordance with Good Clinical Practice (GCP) as defined by the International Council for Harmonisation (ICH) and in accordance with the ethical principles underlying European Union Directive 2001/20/EC.", "confidence": 0.97, "reuse_potential": "high", "rationale": "Standard regulatory compliance statement used across multiple protocols"}]

EXAMPLE 2:
Input: "Primary Endpoint: The primary endpoint is overall survival (OS), defined as the time from randomization to death from any cause."
Output: [{"type": "definition", "title": "Overall Survival Definition", "text": "The primary endpoint is overall survival (OS), defined as the time from randomization to death from any cause.", "confidence": 0.95, "reuse_potential": "high", "rationale": "Standard endpoint definition used in oncology trials"}]

EXAMPLE 3:
Input: "Inclusion Criteria: 1. Age >= 18 years 2. Histologically confirmed diagnosis 3. ECOG performance status 0-1"
Output: [{"type": "study_section", "title": "Inclusion Criteria", "text": "1. Age >= 18 years 2. Histologically confirmed diagnosis 3. ECOG performance status 0-1", "confidence": 0.94, "reuse_potential": "medium", "rationale": "Common inclusion criteria structure for clinical trials"}]

EXAMPLE 4:
Input: "Adverse events will be graded according to NCI-CTCAE version 5.0. All serious adverse events must be reported within 24 hours."
Output: [{"type": "safety", "title": "Adverse Event Reporting", "text": "Adverse events will be graded according to NCI-CTCAE version 5.0. All serious adverse events must be reported within 24 hours.", "confidence": 0.96, "reuse_potential": "high", "rationale": "Standard safety reporting procedures"}]

EXAMPLE 5:
Input: "The investigational product is administered orally at 100mg twice daily with food."
Output: [{"type": "drug_info", "title": "Drug Administration", "text": "The investigational product is administered orally at 100mg twice daily with food.", "confidence": 0.92, "reuse_potential": "medium", "rationale": "Drug dosing information"}]"#;

/// Build the system prompt sent with every identify request.
pub fn system_prompt() -> String {
    format!(
        r#"You are an expert clinical documentation analyst specializing in identifying reusable content components in medical and clinical documents.

TASK: Analyze clinical text and identify all reusable components.

COMPONENT TYPES:
- boilerplate: Standard regulatory or administrative text (GCP statements, confidentiality clauses)
- definition: Precise definitions of terms, endpoints, or events
- study_section: Study-specific methodology (inclusion/exclusion criteria, objectives)
- drug_info: Information about investigational product (dosing, mechanism)
- safety: Safety monitoring or reporting procedures
- procedure: Clinical or administrative procedures

RULES:
1. Components must be self-contained and semantically complete
2. Assign confidence score 0.0-1.0 based on clarity of component boundaries
3. Assign reuse_potential: "high", "medium", or "low"
4. Provide brief rationale for each component

{}

OUTPUT FORMAT:
Return ONLY a valid JSON array with this structure (no other text):
[{{"type": "component_type", "title": "Descriptive title", "text": "Exact extracted text", "confidence": 0.95, "reuse_potential": "high", "rationale": "Brief explanation"}}]"#,
        FEW_SHOT_EXAMPLES
    )
}

/// Build the user prompt for a document.
pub fn user_prompt(text: &str) -> String {
    format!(
        "Identify all reusable components in this clinical text:\n\n{}",
        text
    )
}

/// Build the amended user prompt for the single corrective retry.
///
/// Issued when the first reply failed to parse; restates the required
/// output shape.
pub fn corrective_prompt(text: &str) -> String {
    format!(
        "Your previous reply was not a parseable JSON array. Respond with ONLY a JSON array of component objects - no prose, no markdown fences. Each object must have the keys \"type\", \"title\", \"text\", \"confidence\", \"reuse_potential\", and \"rationale\".\n\nIdentify all reusable components in this clinical text:\n\n{}",
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_names_all_types() {
        let prompt = system_prompt();
        for name in [
            "boilerplate",
            "definition",
            "study_section",
            "drug_info",
            "safety",
            "procedure",
        ] {
            assert!(prompt.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn test_user_prompt_embeds_text() {
        let prompt = user_prompt("This study follows GCP guidelines.");
        assert!(prompt.contains("This study follows GCP guidelines."));
    }

    #[test]
    fn test_corrective_prompt_restates_shape() {
        let prompt = corrective_prompt("text");
        assert!(prompt.contains("JSON array"));
        assert!(prompt.contains("confidence"));
    }
}
