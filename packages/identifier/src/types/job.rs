//! Fine-tuning job state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states of a fine-tuning job.
///
/// `ValidatingFiles`, `Uploading`, and `Queued` precede `Running`; the
/// three terminal states are final. A job may drop to `Failed` straight
/// from `Uploading` or `Queued` (e.g., quota exceeded) without ever
/// entering `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    ValidatingFiles,
    Uploading,
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Whether the job can make no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::ValidatingFiles => "validating_files",
            JobStatus::Uploading => "uploading",
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Parse an upstream status string. Unknown labels return `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "validating_files" => Some(JobStatus::ValidatingFiles),
            "uploading" => Some(JobStatus::Uploading),
            "queued" => Some(JobStatus::Queued),
            "running" => Some(JobStatus::Running),
            "succeeded" => Some(JobStatus::Succeeded),
            "failed" => Some(JobStatus::Failed),
            "cancelled" => Some(JobStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point-in-time view of an upstream job, as reported by one poll.
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    pub id: String,
    pub status: JobStatus,
    /// Present once the job succeeds
    pub fine_tuned_model: Option<String>,
    /// Upstream-reported reason, present once the job fails or is cancelled
    pub error: Option<String>,
}

/// One fine-tuning job tracked by the orchestrator.
///
/// Held in process memory for the duration of orchestration; resumable
/// across restarts by reattaching to the external `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineTuneJob {
    /// Opaque external identifier, assigned once submission succeeds
    pub id: String,

    /// Current lifecycle state
    pub status: JobStatus,

    /// Ids of the uploaded training/validation artifacts
    pub file_ids: Vec<String>,

    /// Resulting model id; present iff status is `Succeeded`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    /// Upstream failure reason; present iff status is `Failed` or `Cancelled`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_polled_at: Option<DateTime<Utc>>,
}

impl FineTuneJob {
    /// Create a freshly submitted job.
    pub fn new(id: impl Into<String>, file_ids: Vec<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Queued,
            file_ids,
            model_id: None,
            error: None,
            created_at,
            last_polled_at: None,
        }
    }

    /// Reattach to a job known only by its external id (process restart).
    pub fn resume(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Queued,
            file_ids: Vec::new(),
            model_id: None,
            error: None,
            created_at,
            last_polled_at: None,
        }
    }

    /// Fold an upstream snapshot into this job.
    ///
    /// Terminal states are final: once `Succeeded`, `Failed`, or
    /// `Cancelled`, later snapshots only refresh `last_polled_at`.
    /// `model_id` is set only on success; `error` only on failure or
    /// cancellation.
    pub fn observe(&mut self, snapshot: &JobSnapshot, polled_at: DateTime<Utc>) {
        self.last_polled_at = Some(polled_at);

        if self.status.is_terminal() {
            return;
        }

        self.status = snapshot.status;
        self.model_id = if snapshot.status == JobStatus::Succeeded {
            snapshot.fine_tuned_model.clone()
        } else {
            None
        };
        self.error = if matches!(snapshot.status, JobStatus::Failed | JobStatus::Cancelled) {
            snapshot.error.clone()
        } else {
            None
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(status: JobStatus) -> JobSnapshot {
        JobSnapshot {
            id: "ftjob-1".into(),
            status,
            fine_tuned_model: (status == JobStatus::Succeeded)
                .then(|| "ft:gpt-4o-mini:org:suffix:1".to_string()),
            error: matches!(status, JobStatus::Failed | JobStatus::Cancelled)
                .then(|| "upstream reason".to_string()),
        }
    }

    #[test]
    fn test_terminal_states_never_transition() {
        let mut job = FineTuneJob::new("ftjob-1", vec!["file-a".into()], Utc::now());
        job.observe(&snapshot(JobStatus::Succeeded), Utc::now());
        assert_eq!(job.status, JobStatus::Succeeded);

        // A later (stale or contradictory) snapshot cannot move it
        job.observe(&snapshot(JobStatus::Running), Utc::now());
        assert_eq!(job.status, JobStatus::Succeeded);
        assert!(job.model_id.is_some());

        job.observe(&snapshot(JobStatus::Failed), Utc::now());
        assert_eq!(job.status, JobStatus::Succeeded);
        assert!(job.error.is_none());
    }

    #[test]
    fn test_model_id_present_iff_succeeded() {
        let mut job = FineTuneJob::new("ftjob-1", vec![], Utc::now());
        assert!(job.model_id.is_none());

        job.observe(&snapshot(JobStatus::Running), Utc::now());
        assert!(job.model_id.is_none());

        job.observe(&snapshot(JobStatus::Succeeded), Utc::now());
        assert_eq!(job.status, JobStatus::Succeeded);
        assert!(job.model_id.is_some());
    }

    #[test]
    fn test_error_present_iff_failed_or_cancelled() {
        let mut job = FineTuneJob::new("ftjob-1", vec![], Utc::now());
        job.observe(&snapshot(JobStatus::Failed), Utc::now());
        assert_eq!(job.error.as_deref(), Some("upstream reason"));
        assert!(job.model_id.is_none());
    }

    #[test]
    fn test_polling_timestamp_refreshes_even_when_terminal() {
        let mut job = FineTuneJob::new("ftjob-1", vec![], Utc::now());
        job.observe(&snapshot(JobStatus::Cancelled), Utc::now());

        let later = Utc::now();
        job.observe(&snapshot(JobStatus::Cancelled), later);
        assert_eq!(job.last_polled_at, Some(later));
    }

    #[test]
    fn test_status_parse_round_trip() {
        for status in [
            JobStatus::ValidatingFiles,
            JobStatus::Uploading,
            JobStatus::Queued,
            JobStatus::Running,
            JobStatus::Succeeded,
            JobStatus::Failed,
            JobStatus::Cancelled,
        ] {
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::parse("paused"), None);
    }
}
