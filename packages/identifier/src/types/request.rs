//! Request and result types for the identify operation.

use serde::{Deserialize, Serialize};

use crate::error::{IdentifyError, Result};
use crate::types::component::Component;

/// Default confidence floor applied when the caller does not set one.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.7;

/// Default cap on returned components.
pub const DEFAULT_MAX_COMPONENTS: usize = 20;

/// Policy options for one identify request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyOptions {
    /// Components below this confidence are dropped. Must be in [0, 1].
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// At most this many components are returned. Must be >= 1.
    #[serde(default = "default_max_components")]
    pub max_components: usize,
}

fn default_min_confidence() -> f64 {
    DEFAULT_MIN_CONFIDENCE
}

fn default_max_components() -> usize {
    DEFAULT_MAX_COMPONENTS
}

impl Default for IdentifyOptions {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            max_components: DEFAULT_MAX_COMPONENTS,
        }
    }
}

impl IdentifyOptions {
    /// Set the confidence floor.
    pub fn with_min_confidence(mut self, min: f64) -> Self {
        self.min_confidence = min;
        self
    }

    /// Set the component cap.
    pub fn with_max_components(mut self, max: usize) -> Self {
        self.max_components = max;
        self
    }

    /// Check option bounds. Called before any external request.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(IdentifyError::Validation(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        if self.max_components == 0 {
            return Err(IdentifyError::Validation(
                "max_components must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// One identification request: a clinical document plus policy options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyRequest {
    /// The input document
    pub text: String,

    /// Policy options (defaults apply when omitted)
    #[serde(default)]
    pub options: IdentifyOptions,
}

impl IdentifyRequest {
    /// Create a request with default options.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: IdentifyOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: IdentifyOptions) -> Self {
        self.options = options;
        self
    }

    /// Check the request shape. Called before any external request.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(IdentifyError::Validation("text cannot be empty".into()));
        }
        self.options.validate()
    }
}

/// Token accounting reported by the upstream call. Informational only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Fold another usage report into this one (corrective retries make
    /// two upstream calls for one request).
    pub fn absorb(&mut self, other: TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

impl From<openai_client::Usage> for TokenUsage {
    fn from(usage: openai_client::Usage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

/// The outcome of one identify request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyResult {
    /// Filtered components, sorted by confidence descending
    pub components: Vec<Component>,

    /// Identifier of the model that produced the result
    pub model_used: String,

    /// Token accounting across all upstream calls made for this request
    pub usage: TokenUsage,
}
