//! Clinical component identification library.
//!
//! Extracts reusable, typed components (boilerplate, definitions, study
//! sections, drug info, safety text, procedures) from free-text clinical
//! documents using a fine-tuned language model, and manages the lifecycle
//! of producing that model from labeled examples.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use identifier::{IdentifyRequest, IdentifyService};
//! use openai_client::OpenAIClient;
//!
//! let client = Arc::new(OpenAIClient::from_env()?);
//! let service = IdentifyService::new(client, "ft:gpt-4o-mini-2024-07-18:org:clinical-components:abc");
//!
//! let result = service
//!     .identify(&IdentifyRequest::new("This study follows GCP guidelines."))
//!     .await?;
//!
//! for component in &result.components {
//!     println!("{} ({:.2})", component.title, component.confidence);
//! }
//! ```
//!
//! # Fine-tuning
//!
//! ```rust,ignore
//! use identifier::JobOrchestrator;
//!
//! let mut orchestrator = JobOrchestrator::new(client).with_n_epochs(3);
//! let mut job = orchestrator
//!     .submit(Path::new("data/training_data.jsonl"), Some(Path::new("data/validation_data.jsonl")))
//!     .await?;
//! let job = orchestrator
//!     .await_completion(&mut job, Duration::from_secs(60), Duration::from_secs(6 * 3600))
//!     .await?;
//! println!("{}", job.model_id.unwrap());
//! ```

pub mod error;
pub mod finetune;
pub mod prompts;
pub mod service;
pub mod testing;
pub mod traits;
pub mod types;
pub mod validate;

pub use error::{IdentifyError, Result};
pub use finetune::{JobOrchestrator, DEFAULT_BASE_MODEL, DEFAULT_SUFFIX};
pub use service::{IdentifyService, ServiceConfig};
pub use traits::{ChatApi, Completion, FineTuneApi, JobParams};
pub use types::{
    Component, ComponentType, FineTuneJob, IdentifyOptions, IdentifyRequest, IdentifyResult,
    JobSnapshot, JobStatus, ReusePotential, TokenUsage, TrainingExample,
};
