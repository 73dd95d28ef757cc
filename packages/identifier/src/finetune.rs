//! Fine-tuning job orchestration.
//!
//! Drives exactly one external fine-tuning job from artifact validation to
//! a terminal state. The workflow is submit -> poll -> resolve:
//!
//! 1. `submit` validates both JSONL artifacts locally, uploads them, and
//!    creates the job. Invalid artifacts fail before any network call.
//! 2. `await_completion` polls at a fixed interval inside a client-side
//!    time budget. A lapsed budget is a `TimeoutError`, not a
//!    cancellation - the job keeps running upstream and polling can
//!    resume later, in this process or another (`resume`).
//! 3. `Succeeded` yields the fine-tuned model id; `Failed`/`Cancelled`
//!    yield `JobError` with the upstream reason verbatim. Job failures are
//!    never retried automatically - they almost always mean the training
//!    data needs human correction.
//!
//! One job at a time: submitting while a previous job is non-terminal is a
//! caller error. Training quota and the cost model assume sequential
//! experiments.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{IdentifyError, Result};
use crate::traits::finetune::{FineTuneApi, JobParams};
use crate::types::job::{FineTuneJob, JobSnapshot, JobStatus};
use crate::types::training::validate_artifact;

/// Default base model to fine-tune.
pub const DEFAULT_BASE_MODEL: &str = "gpt-4o-mini-2024-07-18";

/// Default suffix appended to the fine-tuned model name.
pub const DEFAULT_SUFFIX: &str = "clinical-components";

/// Orchestrator for one fine-tuning job at a time.
pub struct JobOrchestrator<A: FineTuneApi> {
    api: A,
    base_model: String,
    suffix: Option<String>,
    n_epochs: Option<u32>,
    active: Option<FineTuneJob>,
}

impl<A: FineTuneApi> JobOrchestrator<A> {
    /// Create an orchestrator with the default base model and suffix.
    pub fn new(api: A) -> Self {
        Self {
            api,
            base_model: DEFAULT_BASE_MODEL.to_string(),
            suffix: Some(DEFAULT_SUFFIX.to_string()),
            n_epochs: None,
            active: None,
        }
    }

    /// Set the base model to fine-tune.
    pub fn with_base_model(mut self, model: impl Into<String>) -> Self {
        self.base_model = model.into();
        self
    }

    /// Set the model name suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Set the number of training epochs.
    pub fn with_n_epochs(mut self, epochs: u32) -> Self {
        self.n_epochs = Some(epochs);
        self
    }

    /// The job currently tracked by this orchestrator, if any.
    pub fn active_job(&self) -> Option<&FineTuneJob> {
        self.active.as_ref()
    }

    /// Validate, upload, and submit a fine-tuning job.
    ///
    /// Every line of both artifacts must parse as a valid training example
    /// before anything is uploaded. Returns the job in `Queued`.
    pub async fn submit(
        &mut self,
        training_path: &Path,
        validation_path: Option<&Path>,
    ) -> Result<FineTuneJob> {
        if let Some(job) = &self.active {
            if !job.status.is_terminal() {
                return Err(IdentifyError::Validation(format!(
                    "job {} is still {}; one fine-tuning job at a time",
                    job.id, job.status
                )));
            }
        }

        // Local validation happens in full before any network interaction
        let training = read_artifact(training_path).await?;
        let training_count = validate_artifact(&training)?;
        info!(
            path = %training_path.display(),
            examples = training_count,
            "Training artifact validated"
        );

        let validation = match validation_path {
            Some(path) => {
                let content = read_artifact(path).await?;
                let count = validate_artifact(&content)?;
                info!(path = %path.display(), examples = count, "Validation artifact validated");
                Some((path, content))
            }
            None => None,
        };

        let training_file_id = self
            .api
            .upload_artifact(&artifact_name(training_path), training.into_bytes())
            .await?;
        debug!(file_id = %training_file_id, "Training artifact uploaded");

        let mut file_ids = vec![training_file_id.clone()];
        let validation_file_id = match validation {
            Some((path, content)) => {
                let id = self
                    .api
                    .upload_artifact(&artifact_name(path), content.into_bytes())
                    .await?;
                debug!(file_id = %id, "Validation artifact uploaded");
                file_ids.push(id.clone());
                Some(id)
            }
            None => None,
        };

        let snapshot = self
            .api
            .create_job(&JobParams {
                base_model: self.base_model.clone(),
                training_file_id,
                validation_file_id,
                suffix: self.suffix.clone(),
                n_epochs: self.n_epochs,
            })
            .await?;

        info!(job_id = %snapshot.id, "Fine-tuning job created");

        let job = FineTuneJob::new(snapshot.id, file_ids, Utc::now());
        self.active = Some(job.clone());
        Ok(job)
    }

    /// Reattach to an existing job by its external id.
    ///
    /// Fetches the current upstream state so a restarted process can
    /// continue polling without resubmitting.
    pub async fn resume(&mut self, job_id: &str) -> Result<FineTuneJob> {
        let snapshot = self.api.retrieve_job(job_id).await?;

        let mut job = FineTuneJob::resume(job_id, Utc::now());
        job.observe(&snapshot, Utc::now());

        info!(job_id = %job.id, status = %job.status, "Reattached to fine-tuning job");

        self.active = Some(job.clone());
        Ok(job)
    }

    /// Poll the job until it reaches a terminal state or the time budget
    /// lapses.
    ///
    /// `Succeeded` returns the job with its `model_id` populated;
    /// `Failed`/`Cancelled` return `JobError`. A lapsed budget returns
    /// `TimeoutError` and leaves `job` unresolved - a later call with a
    /// longer budget continues from where this one stopped.
    pub async fn await_completion(
        &mut self,
        job: &mut FineTuneJob,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<FineTuneJob> {
        let max_attempts =
            (timeout.as_millis() / poll_interval.as_millis().max(1)).max(1) as u64;
        let mut attempts: u64 = 0;

        while !job.status.is_terminal() {
            attempts += 1;
            if attempts > max_attempts {
                warn!(
                    job_id = %job.id,
                    status = %job.status,
                    "Polling budget exceeded; job left running upstream"
                );
                return Err(IdentifyError::Timeout {
                    job_id: job.id.clone(),
                    waited_secs: timeout.as_secs(),
                });
            }

            sleep(poll_interval).await;

            let snapshot = self.api.retrieve_job(&job.id).await?;
            job.observe(&snapshot, Utc::now());

            if attempts % 6 == 0 {
                info!(
                    job_id = %job.id,
                    status = %job.status,
                    attempts,
                    "Fine-tuning in progress"
                );
            }
        }

        self.sync_active(job);

        match job.status {
            JobStatus::Succeeded => {
                info!(
                    job_id = %job.id,
                    model_id = job.model_id.as_deref().unwrap_or(""),
                    "Fine-tuning succeeded"
                );
                Ok(job.clone())
            }
            status => Err(IdentifyError::Job {
                status: status.to_string(),
                reason: job
                    .error
                    .clone()
                    .unwrap_or_else(|| "no reason reported".to_string()),
            }),
        }
    }

    /// Request upstream cancellation of a job.
    ///
    /// This is the one deliberate exception to "callers only abandon
    /// observation": cancellation is explicit, never implied by a lapsed
    /// polling budget.
    pub async fn cancel(&mut self, job_id: &str) -> Result<JobSnapshot> {
        let snapshot = self.api.cancel_job(job_id).await?;

        if let Some(job) = self.active.as_mut().filter(|j| j.id == job_id) {
            job.observe(&snapshot, Utc::now());
        }

        Ok(snapshot)
    }

    /// List recent jobs, newest first.
    pub async fn list_jobs(&self, limit: usize) -> Result<Vec<JobSnapshot>> {
        self.api.list_jobs(limit).await
    }

    fn sync_active(&mut self, job: &FineTuneJob) {
        if let Some(active) = self.active.as_mut().filter(|j| j.id == job.id) {
            *active = job.clone();
        }
    }
}

async fn read_artifact(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        IdentifyError::Validation(format!("cannot read artifact {}: {}", path.display(), e))
    })
}

fn artifact_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("training_data.jsonl")
        .to_string()
}
