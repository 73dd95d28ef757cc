//! Process-wide configuration, resolved once at startup.
//!
//! Absence of the API credential or the deployed model id is a fatal
//! startup condition, never a per-request error.

use anyhow::{Context, Result};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Inference provider credential
    pub openai_api_key: String,

    /// Identifier of the currently deployed fine-tuned model
    pub fine_tuned_model: String,

    /// Listen port
    pub port: u16,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let openai_api_key =
            std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;
        let fine_tuned_model =
            std::env::var("FINE_TUNED_MODEL").context("FINE_TUNED_MODEL must be set")?;
        let port = match std::env::var("PORT") {
            Ok(value) => value.parse().context("PORT must be a valid port number")?,
            Err(_) => 5000,
        };

        Ok(Self {
            openai_api_key,
            fine_tuned_model,
            port,
        })
    }
}
