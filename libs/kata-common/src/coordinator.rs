//! Submission Coordinator
//!
//! Submits a program to the remote execution service, then polls the job
//! token until the job leaves {Queued, Processing} or the attempt ceiling is
//! reached. Running out of attempts is not an error: the last snapshot is
//! handed back because the job may still be running remotely.
//!
//! Dropping the returned future stops polling. The remote job is unaffected;
//! the service has no cancel call.

use crate::config::PollPolicy;
use crate::error::ExecutionError;
use crate::types::{JobStatus, SubmissionJob, SubmissionRequest};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Remote asynchronous job service
#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Create a job without waiting for it. Returns the job token.
    async fn submit(&self, request: &SubmissionRequest) -> Result<String, ExecutionError>;

    /// Status snapshot exactly as the service reported it
    async fn status(&self, token: &str) -> Result<Value, ExecutionError>;

    /// Typed status snapshot
    async fn poll(&self, token: &str) -> Result<SubmissionJob, ExecutionError> {
        let snapshot = self.status(token).await?;
        decode_snapshot(token, &snapshot)
    }
}

fn text_field(snapshot: &Value, key: &str) -> Option<String> {
    snapshot.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Turn a Judge0-shaped snapshot into a [`SubmissionJob`]
pub fn decode_snapshot(token: &str, snapshot: &Value) -> Result<SubmissionJob, ExecutionError> {
    let status = snapshot
        .get("status")
        .ok_or_else(|| ExecutionError::Decode("snapshot has no status".to_string()))?;
    let status_id = status
        .get("id")
        .and_then(Value::as_u64)
        .ok_or_else(|| ExecutionError::Decode("snapshot status has no id".to_string()))?;

    // `time` arrives as a string, but some deployments send a bare number
    let time = match snapshot.get("time") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    Ok(SubmissionJob {
        token: text_field(snapshot, "token").unwrap_or_else(|| token.to_string()),
        status: JobStatus::from_status_id(status_id as u32),
        description: text_field(status, "description").unwrap_or_default(),
        stdout: text_field(snapshot, "stdout"),
        stderr: text_field(snapshot, "stderr"),
        compile_output: text_field(snapshot, "compile_output"),
        message: text_field(snapshot, "message"),
        time,
        memory: snapshot.get("memory").and_then(Value::as_u64),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The job reached a terminal state
    Completed(SubmissionJob),
    /// Attempts ran out first; `last` may still be Queued or Processing
    Exhausted { last: SubmissionJob, attempts: u32 },
}

impl PollOutcome {
    pub fn job(&self) -> &SubmissionJob {
        match self {
            PollOutcome::Completed(job) => job,
            PollOutcome::Exhausted { last, .. } => last,
        }
    }

    pub fn into_job(self) -> SubmissionJob {
        match self {
            PollOutcome::Completed(job) => job,
            PollOutcome::Exhausted { last, .. } => last,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, PollOutcome::Exhausted { .. })
    }
}

/// Poll `token` with a fixed delay before each attempt
pub async fn await_completion<S>(
    service: &S,
    token: &str,
    policy: PollPolicy,
) -> Result<PollOutcome, ExecutionError>
where
    S: ExecutionService + ?Sized,
{
    if token.trim().is_empty() {
        return Err(ExecutionError::MissingToken);
    }

    let max_attempts = policy.max_attempts.max(1);
    let mut previous: Option<JobStatus> = None;
    let mut attempt = 0;

    loop {
        attempt += 1;
        tokio::time::sleep(policy.interval).await;

        let job = service.poll(token).await?;
        debug!(token = %token, attempt, status = ?job.status, "Polled job");

        if let Some(prev) = previous {
            if !prev.can_transition_to(job.status) {
                warn!(
                    token = %token,
                    from = ?prev,
                    to = ?job.status,
                    "Execution service reported an invalid status transition"
                );
            }
        }
        previous = Some(job.status);

        if job.status.is_terminal() {
            info!(token = %token, attempts = attempt, status = ?job.status, "Job finished");
            return Ok(PollOutcome::Completed(job));
        }

        if attempt >= max_attempts {
            warn!(token = %token, attempts = attempt, status = ?job.status, "Poll attempts exhausted");
            return Ok(PollOutcome::Exhausted {
                last: job,
                attempts: attempt,
            });
        }
    }
}

/// Submit and wait. Returns the token alongside the outcome.
pub async fn submit_and_wait<S>(
    service: &S,
    request: &SubmissionRequest,
    policy: PollPolicy,
) -> Result<(String, PollOutcome), ExecutionError>
where
    S: ExecutionService + ?Sized,
{
    let token = service.submit(request).await?;
    info!(token = %token, language_id = request.language_id, "Submission accepted");
    let outcome = await_completion(service, &token, policy).await?;
    Ok((token, outcome))
}
