//! OpenAI API request and response types.

use serde::{Deserialize, Serialize};

// =============================================================================
// Chat Completion
// =============================================================================

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model to use (base model or a fine-tuned model id)
    pub model: String,

    /// Conversation messages
    pub messages: Vec<Message>,

    /// Sampling temperature (0.0 to 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens in completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl ChatRequest {
    /// Create a new chat request with the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add a message to the conversation.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Response content
    pub content: String,

    /// Token usage statistics
    pub usage: Option<Usage>,
}

/// Raw chat response from API (for internal parsing).
#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponseRaw {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatMessageResponse {
    pub content: String,
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt
    pub prompt_tokens: u32,

    /// Tokens in the completion
    pub completion_tokens: u32,

    /// Total tokens used
    pub total_tokens: u32,
}

// =============================================================================
// Files
// =============================================================================

/// An uploaded file, as reported by the files API.
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    /// File id ("file-...")
    pub id: String,

    /// Original filename
    pub filename: String,

    /// Size in bytes
    pub bytes: u64,

    /// Processing status ("uploaded", "processed", "error")
    #[serde(default)]
    pub status: Option<String>,

    /// Unix timestamp of upload
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileList {
    pub data: Vec<FileObject>,
}

// =============================================================================
// Fine-tuning
// =============================================================================

/// Fine-tuning job creation request.
#[derive(Debug, Clone, Serialize)]
pub struct FineTuneRequest {
    /// Base model to fine-tune (e.g., "gpt-4o-mini-2024-07-18")
    pub model: String,

    /// Id of the uploaded training file
    pub training_file: String,

    /// Id of the uploaded validation file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_file: Option<String>,

    /// Suffix appended to the fine-tuned model name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    /// Training hyperparameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyperparameters: Option<Hyperparameters>,
}

impl FineTuneRequest {
    /// Create a request for the given base model and training file id.
    pub fn new(model: impl Into<String>, training_file: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            training_file: training_file.into(),
            validation_file: None,
            suffix: None,
            hyperparameters: None,
        }
    }

    /// Attach a validation file id.
    pub fn validation_file(mut self, file_id: impl Into<String>) -> Self {
        self.validation_file = Some(file_id.into());
        self
    }

    /// Set the model name suffix.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Set the number of training epochs.
    pub fn n_epochs(mut self, epochs: u32) -> Self {
        self.hyperparameters = Some(Hyperparameters {
            n_epochs: Some(epochs),
        });
        self
    }
}

/// Fine-tuning hyperparameters.
#[derive(Debug, Clone, Serialize)]
pub struct Hyperparameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_epochs: Option<u32>,
}

/// A fine-tuning job, as reported by the fine-tuning API.
#[derive(Debug, Clone, Deserialize)]
pub struct FineTuneJobObject {
    /// Job id ("ftjob-...")
    pub id: String,

    /// Upstream status string: "validating_files", "queued", "running",
    /// "succeeded", "failed", "cancelled"
    pub status: String,

    /// Base model being fine-tuned
    #[serde(default)]
    pub model: Option<String>,

    /// Resulting model id, present once the job succeeds
    #[serde(default)]
    pub fine_tuned_model: Option<String>,

    /// Upstream error details, present once the job fails
    #[serde(default)]
    pub error: Option<FineTuneJobError>,

    /// Unix timestamp of creation
    #[serde(default)]
    pub created_at: Option<i64>,

    /// Unix timestamp of completion
    #[serde(default)]
    pub finished_at: Option<i64>,

    /// Tokens consumed by training
    #[serde(default)]
    pub trained_tokens: Option<u64>,
}

/// Error details attached to a failed fine-tuning job.
#[derive(Debug, Clone, Deserialize)]
pub struct FineTuneJobError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl FineTuneJobError {
    /// Human-readable form, falling back to the code when no message is set.
    pub fn describe(&self) -> String {
        match (&self.message, &self.code) {
            (Some(m), _) => m.clone(),
            (None, Some(c)) => c.clone(),
            (None, None) => "unknown fine-tuning error".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FineTuneJobList {
    pub data: Vec<FineTuneJobObject>,
}

// =============================================================================
// Utilities
// =============================================================================

/// Strip markdown code blocks from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
