//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the identifier
//! library without making real inference or fine-tuning calls. Both mocks
//! return deterministic, scripted responses and track the calls made to
//! them for assertions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{IdentifyError, Result};
use crate::traits::chat::{ChatApi, Completion};
use crate::traits::finetune::{FineTuneApi, JobParams};
use crate::types::job::{JobSnapshot, JobStatus};
use crate::types::request::TokenUsage;

/// A scripted reply for [`MockChatApi`].
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this content successfully
    Content(String),

    /// Fail with a transient upstream error
    Transient(String),

    /// Fail with a permanent upstream error
    Permanent(String),
}

/// Record of one call made to the mock chat API.
#[derive(Debug, Clone)]
pub struct MockChatCall {
    pub model: String,
    pub system: String,
    pub user: String,
}

/// A mock chat API that replays a scripted sequence of replies.
///
/// Replies are consumed in order; the final reply repeats once the script
/// is exhausted, so identical consecutive requests observe identical
/// output.
#[derive(Clone, Default)]
pub struct MockChatApi {
    replies: Arc<Mutex<Vec<MockReply>>>,
    cursor: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<MockChatCall>>>,
    usage: Option<TokenUsage>,
}

impl MockChatApi {
    /// Create a mock with no scripted replies (every call fails).
    pub fn new() -> Self {
        Self {
            usage: Some(TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 50,
                total_tokens: 150,
            }),
            ..Default::default()
        }
    }

    /// Append a successful reply to the script.
    pub fn with_reply(self, content: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Content(content.into()));
        self
    }

    /// Append a transient failure to the script.
    pub fn with_transient_error(self, message: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Transient(message.into()));
        self
    }

    /// Append a permanent failure to the script.
    pub fn with_permanent_error(self, message: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Permanent(message.into()));
        self
    }

    /// Report no token usage from completions.
    pub fn without_usage(mut self) -> Self {
        self.usage = None;
        self
    }

    /// Calls made so far.
    pub fn calls(&self) -> Vec<MockChatCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next_reply(&self) -> Option<MockReply> {
        let replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return None;
        }
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        Some(replies[index.min(replies.len() - 1)].clone())
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn complete(&self, model: &str, system: &str, user: &str) -> Result<Completion> {
        self.calls.lock().unwrap().push(MockChatCall {
            model: model.to_string(),
            system: system.to_string(),
            user: user.to_string(),
        });

        match self.next_reply() {
            Some(MockReply::Content(content)) => Ok(Completion {
                content,
                usage: self.usage,
            }),
            Some(MockReply::Transient(message)) => Err(IdentifyError::Upstream {
                message,
                transient: true,
            }),
            Some(MockReply::Permanent(message)) => Err(IdentifyError::Upstream {
                message,
                transient: false,
            }),
            None => Err(IdentifyError::Upstream {
                message: "mock chat api has no scripted reply".into(),
                transient: false,
            }),
        }
    }
}

/// A mock fine-tuning API that replays a scripted status sequence.
///
/// `retrieve_job` consumes the script in order, repeating the final
/// snapshot once exhausted.
#[derive(Clone, Default)]
pub struct MockFineTuneApi {
    script: Arc<Mutex<Vec<JobSnapshot>>>,
    cursor: Arc<AtomicUsize>,
    uploads: Arc<Mutex<Vec<String>>>,
    created: Arc<Mutex<Vec<JobParams>>>,
    cancelled: Arc<Mutex<Vec<String>>>,
    retrieve_count: Arc<AtomicUsize>,
}

impl MockFineTuneApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot to the retrieve script.
    pub fn with_snapshot(self, snapshot: JobSnapshot) -> Self {
        self.script.lock().unwrap().push(snapshot);
        self
    }

    /// Append a plain status to the retrieve script, with model id and
    /// error fields filled in the way a real provider would.
    pub fn with_status(self, status: JobStatus) -> Self {
        let snapshot = JobSnapshot {
            id: "ftjob-mock".to_string(),
            status,
            fine_tuned_model: (status == JobStatus::Succeeded)
                .then(|| "ft:gpt-4o-mini-2024-07-18:mock:clinical-components:1".to_string()),
            error: matches!(status, JobStatus::Failed | JobStatus::Cancelled)
                .then(|| "mock failure reason".to_string()),
        };
        self.with_snapshot(snapshot)
    }

    /// Filenames uploaded so far.
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    /// Number of artifact uploads so far.
    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    /// Number of jobs created so far.
    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    /// Parameters of created jobs.
    pub fn created_jobs(&self) -> Vec<JobParams> {
        self.created.lock().unwrap().clone()
    }

    /// Number of status polls so far.
    pub fn poll_count(&self) -> usize {
        self.retrieve_count.load(Ordering::SeqCst)
    }

    /// Job ids cancelled so far.
    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }

    fn next_snapshot(&self, job_id: &str) -> JobSnapshot {
        let script = self.script.lock().unwrap();
        if script.is_empty() {
            return JobSnapshot {
                id: job_id.to_string(),
                status: JobStatus::Running,
                fine_tuned_model: None,
                error: None,
            };
        }
        let index = self.cursor.fetch_add(1, Ordering::SeqCst);
        let mut snapshot = script[index.min(script.len() - 1)].clone();
        snapshot.id = job_id.to_string();
        snapshot
    }
}

#[async_trait]
impl FineTuneApi for MockFineTuneApi {
    async fn upload_artifact(&self, filename: &str, _bytes: Vec<u8>) -> Result<String> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(filename.to_string());
        Ok(format!("file-mock-{}", uploads.len()))
    }

    async fn create_job(&self, params: &JobParams) -> Result<JobSnapshot> {
        self.created.lock().unwrap().push(params.clone());
        Ok(JobSnapshot {
            id: "ftjob-mock".to_string(),
            status: JobStatus::Queued,
            fine_tuned_model: None,
            error: None,
        })
    }

    async fn retrieve_job(&self, job_id: &str) -> Result<JobSnapshot> {
        self.retrieve_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.next_snapshot(job_id))
    }

    async fn cancel_job(&self, job_id: &str) -> Result<JobSnapshot> {
        self.cancelled.lock().unwrap().push(job_id.to_string());
        Ok(JobSnapshot {
            id: job_id.to_string(),
            status: JobStatus::Cancelled,
            fine_tuned_model: None,
            error: Some("cancelled by user".to_string()),
        })
    }

    async fn list_jobs(&self, limit: usize) -> Result<Vec<JobSnapshot>> {
        let script = self.script.lock().unwrap();
        Ok(script.iter().take(limit).cloned().collect())
    }
}
