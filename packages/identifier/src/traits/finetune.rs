//! Fine-tuning provider seam for the job orchestrator.

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;
use crate::types::job::{JobSnapshot, JobStatus};

/// Parameters for creating one fine-tuning job.
#[derive(Debug, Clone)]
pub struct JobParams {
    /// Base model to fine-tune
    pub base_model: String,

    /// Id of the uploaded training artifact
    pub training_file_id: String,

    /// Id of the uploaded validation artifact
    pub validation_file_id: Option<String>,

    /// Suffix for the resulting model name
    pub suffix: Option<String>,

    /// Number of training epochs (provider default when unset)
    pub n_epochs: Option<u32>,
}

/// Fine-tuning provider seam: artifact upload plus job CRUD.
#[async_trait]
pub trait FineTuneApi: Send + Sync {
    /// Upload a line-oriented training artifact; returns the file id.
    async fn upload_artifact(&self, filename: &str, bytes: Vec<u8>) -> Result<String>;

    /// Create a job and return its initial snapshot.
    async fn create_job(&self, params: &JobParams) -> Result<JobSnapshot>;

    /// Fetch the current state of a job.
    async fn retrieve_job(&self, job_id: &str) -> Result<JobSnapshot>;

    /// Request upstream cancellation of a job.
    async fn cancel_job(&self, job_id: &str) -> Result<JobSnapshot>;

    /// List recent jobs, newest first.
    async fn list_jobs(&self, limit: usize) -> Result<Vec<JobSnapshot>>;
}

fn snapshot_from(job: openai_client::FineTuneJobObject) -> JobSnapshot {
    let status = JobStatus::parse(&job.status).unwrap_or_else(|| {
        // Unknown upstream label: treat as still in flight rather than
        // failing the poll loop.
        warn!(job_id = %job.id, status = %job.status, "Unrecognized job status");
        JobStatus::Running
    });

    JobSnapshot {
        id: job.id,
        status,
        fine_tuned_model: job.fine_tuned_model,
        error: job.error.map(|e| e.describe()),
    }
}

#[async_trait]
impl FineTuneApi for openai_client::OpenAIClient {
    async fn upload_artifact(&self, filename: &str, bytes: Vec<u8>) -> Result<String> {
        let file = self.upload_file(filename, bytes, "fine-tune").await?;
        Ok(file.id)
    }

    async fn create_job(&self, params: &JobParams) -> Result<JobSnapshot> {
        let mut request = openai_client::FineTuneRequest::new(
            params.base_model.clone(),
            params.training_file_id.clone(),
        );
        if let Some(validation) = &params.validation_file_id {
            request = request.validation_file(validation.clone());
        }
        if let Some(suffix) = &params.suffix {
            request = request.suffix(suffix.clone());
        }
        if let Some(epochs) = params.n_epochs {
            request = request.n_epochs(epochs);
        }

        let job = self.create_fine_tune_job(request).await?;
        Ok(snapshot_from(job))
    }

    async fn retrieve_job(&self, job_id: &str) -> Result<JobSnapshot> {
        let job = self.retrieve_fine_tune_job(job_id).await?;
        Ok(snapshot_from(job))
    }

    async fn cancel_job(&self, job_id: &str) -> Result<JobSnapshot> {
        let job = self.cancel_fine_tune_job(job_id).await?;
        Ok(snapshot_from(job))
    }

    async fn list_jobs(&self, limit: usize) -> Result<Vec<JobSnapshot>> {
        let jobs = self.list_fine_tune_jobs(limit).await?;
        Ok(jobs.into_iter().map(snapshot_from).collect())
    }
}
