//! Pure OpenAI REST API client
//!
//! A clean, minimal client for the OpenAI API with no domain-specific logic.
//! Supports chat completions, file uploads, and the fine-tuning job API.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{OpenAIClient, ChatRequest, Message};
//!
//! let client = OpenAIClient::from_env()?;
//!
//! // Chat completion against a fine-tuned model
//! let response = client.chat_completion(ChatRequest {
//!     model: "ft:gpt-4o-mini-2024-07-18:org:clinical-components:abc".into(),
//!     messages: vec![Message::user("Identify components: ...")],
//!     ..Default::default()
//! }).await?;
//!
//! // Fine-tuning workflow
//! let file = client.upload_file("training.jsonl", bytes, "fine-tune").await?;
//! let job = client.create_fine_tune_job(
//!     FineTuneRequest::new("gpt-4o-mini-2024-07-18", &file.id),
//! ).await?;
//! let job = client.retrieve_fine_tune_job(&job.id).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{OpenAIError, Result};
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

/// Pure OpenAI API client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OpenAIError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // Chat completions
    // =========================================================================

    /// Chat completion.
    ///
    /// Send messages to the chat completion API and get a response.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                OpenAIError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            return Err(OpenAIError::api(status, error_text));
        }

        let chat_response: types::ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        let usage = chat_response.usage;
        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OpenAIError::Parse("No choices in response".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "OpenAI chat completion"
        );

        Ok(ChatResponse { content, usage })
    }

    // =========================================================================
    // Files
    // =========================================================================

    /// Upload a file for the given purpose (e.g., "fine-tune").
    ///
    /// The bytes are sent as a multipart form, matching the files API contract.
    pub async fn upload_file(
        &self,
        filename: impl Into<String>,
        bytes: Vec<u8>,
        purpose: &str,
    ) -> Result<FileObject> {
        let filename = filename.into();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.clone())
            .mime_str("application/jsonl")
            .map_err(|e| OpenAIError::Config(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("purpose", purpose.to_string())
            .part("file", part);

        let response = self
            .http_client
            .post(format!("{}/files", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "File upload failed");
                OpenAIError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI file upload error");
            return Err(OpenAIError::api(status, error_text));
        }

        let file: FileObject = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        debug!(file_id = %file.id, filename = %filename, bytes = file.bytes, "File uploaded");

        Ok(file)
    }

    /// List uploaded files, optionally filtered by purpose.
    pub async fn list_files(&self, purpose: Option<&str>) -> Result<Vec<FileObject>> {
        let mut url = format!("{}/files", self.base_url);
        if let Some(p) = purpose {
            url = format!("{}?purpose={}", url, p);
        }

        let list: types::FileList = self.get_json(&url).await?;
        Ok(list.data)
    }

    // =========================================================================
    // Fine-tuning jobs
    // =========================================================================

    /// Create a fine-tuning job.
    pub async fn create_fine_tune_job(
        &self,
        request: FineTuneRequest,
    ) -> Result<FineTuneJobObject> {
        let response = self
            .http_client
            .post(format!("{}/fine_tuning/jobs", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Fine-tune job creation failed");
                OpenAIError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI fine-tuning API error");
            return Err(OpenAIError::api(status, error_text));
        }

        let job: FineTuneJobObject = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        debug!(job_id = %job.id, status = %job.status, "Fine-tune job created");

        Ok(job)
    }

    /// Retrieve the current state of a fine-tuning job.
    pub async fn retrieve_fine_tune_job(&self, job_id: &str) -> Result<FineTuneJobObject> {
        self.get_json(&format!("{}/fine_tuning/jobs/{}", self.base_url, job_id))
            .await
    }

    /// Cancel a fine-tuning job.
    pub async fn cancel_fine_tune_job(&self, job_id: &str) -> Result<FineTuneJobObject> {
        let response = self
            .http_client
            .post(format!(
                "{}/fine_tuning/jobs/{}/cancel",
                self.base_url, job_id
            ))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| OpenAIError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OpenAIError::api(status, error_text));
        }

        response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))
    }

    /// List recent fine-tuning jobs.
    pub async fn list_fine_tune_jobs(&self, limit: usize) -> Result<Vec<FineTuneJobObject>> {
        let list: types::FineTuneJobList = self
            .get_json(&format!(
                "{}/fine_tuning/jobs?limit={}",
                self.base_url, limit
            ))
            .await?;
        Ok(list.data)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    async fn get_json<R: for<'de> serde::Deserialize<'de>>(&self, url: &str) -> Result<R> {
        let response = self
            .http_client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| OpenAIError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OpenAIError::api(status, error_text));
        }

        response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = OpenAIClient::new("sk-test").with_base_url("https://custom.api.com");

        assert_eq!(client.api_key, "sk-test");
        assert_eq!(client.base_url, "https://custom.api.com");
    }

    #[test]
    fn test_fine_tune_job_deserialization() {
        let json = r#"{
            "id": "ftjob-abc123",
            "status": "succeeded",
            "model": "gpt-4o-mini-2024-07-18",
            "fine_tuned_model": "ft:gpt-4o-mini-2024-07-18:org:clinical-components:abc",
            "created_at": 1700000000,
            "finished_at": 1700003600,
            "trained_tokens": 120000
        }"#;

        let job: FineTuneJobObject = serde_json::from_str(json).unwrap();
        assert_eq!(job.id, "ftjob-abc123");
        assert_eq!(job.status, "succeeded");
        assert!(job.fine_tuned_model.is_some());
        assert!(job.error.is_none());
    }

    #[test]
    fn test_failed_job_deserialization() {
        let json = r#"{
            "id": "ftjob-def456",
            "status": "failed",
            "error": {"code": "invalid_training_file", "message": "line 3 is malformed"}
        }"#;

        let job: FineTuneJobObject = serde_json::from_str(json).unwrap();
        assert_eq!(job.status, "failed");
        assert_eq!(job.error.unwrap().describe(), "line 3 is malformed");
    }
}
