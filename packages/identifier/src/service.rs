//! The request-facing identify operation.
//!
//! `IdentifyService` is stateless across requests: it holds only the
//! provider handle, the deployed model id, and retry policy. Any number of
//! `identify` calls may run concurrently.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{IdentifyError, Result};
use crate::prompts;
use crate::traits::chat::{ChatApi, Completion};
use crate::types::request::{IdentifyRequest, IdentifyResult, TokenUsage};
use crate::validate;

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Retry policy for transient upstream failures.
///
/// Both knobs are policy, not contract; the defaults follow the rest of
/// the codebase (3 attempts, exponential backoff from 1s).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Retries after the first attempt, for transient failures only
    pub max_retries: u32,

    /// Base delay; attempt n waits `retry_delay * 2^(n-1)`
    pub retry_delay: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Identification service over a configured fine-tuned model.
#[derive(Clone)]
pub struct IdentifyService {
    api: Arc<dyn ChatApi>,
    model: String,
    config: ServiceConfig,
}

impl IdentifyService {
    /// Create a service for the given provider and deployed model id.
    pub fn new(api: Arc<dyn ChatApi>, model: impl Into<String>) -> Self {
        Self {
            api,
            model: model.into(),
            config: ServiceConfig::default(),
        }
    }

    /// Override the retry policy.
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// The deployed model id this service queries.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Identify reusable components in a clinical document.
    ///
    /// Validates the request before any external call; retries transient
    /// upstream failures with bounded backoff; issues at most one
    /// corrective re-prompt when the model's reply fails to parse.
    pub async fn identify(&self, request: &IdentifyRequest) -> Result<IdentifyResult> {
        request.validate()?;

        let system = prompts::system_prompt();
        let mut usage = TokenUsage::default();

        let completion = self
            .complete_with_retry(&system, &prompts::user_prompt(&request.text))
            .await?;
        if let Some(u) = completion.usage {
            usage.absorb(u);
        }

        let records = match validate::parse_components(&completion.content) {
            Ok(records) => records,
            Err(first_error) => {
                warn!(
                    error = %first_error,
                    "Model reply failed to parse, issuing corrective retry"
                );

                let retry = self
                    .complete_with_retry(&system, &prompts::corrective_prompt(&request.text))
                    .await?;
                if let Some(u) = retry.usage {
                    usage.absorb(u);
                }

                validate::parse_components(&retry.content).map_err(|e| {
                    IdentifyError::Schema(format!(
                        "model response unparseable after corrective retry: {}",
                        e
                    ))
                })?
            }
        };

        let parsed_count = records.len();
        let components =
            validate::apply_policy(validate::repair_components(records), &request.options);

        info!(
            model = %self.model,
            parsed = parsed_count,
            returned = components.len(),
            min_confidence = request.options.min_confidence,
            "Identified components"
        );

        Ok(IdentifyResult {
            components,
            model_used: self.model.clone(),
            usage,
        })
    }

    /// One inference call with bounded retry on transient failures.
    async fn complete_with_retry(&self, system: &str, user: &str) -> Result<Completion> {
        let mut attempt = 0u32;

        loop {
            match self.api.complete(&self.model, system, user).await {
                Ok(completion) => return Ok(completion),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.retry_delay * 2u32.pow(attempt - 1);
                    warn!(
                        error = %e,
                        attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Transient upstream failure, backing off"
                    );
                    sleep(delay).await;
                }
                Err(e) => {
                    debug!(error = %e, "Upstream failure, not retrying");
                    return Err(e);
                }
            }
        }
    }
}
