use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::sleep;

use super::classification::{JobStateClassification, StateClass, StateToken};
use super::policy::PollingPolicy;
use crate::remote::RemoteStatusClient;

pub const MSG_STARTED: &str = "Job tracking started.";
pub const MSG_COMPLETED: &str = "Job tracking completed.";
pub const MSG_OVERLAP: &str = "Overlapping job states found.";
pub const MSG_ZERO_INTERVAL: &str = "Polling interval must be greater than zero.";
pub const MSG_EXCEPTION_PREFIX: &str = "Exception in job tracking ";

/// How a tracking call ended. `failed`/`message` carry the same information
/// for callers that only look at text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingOutcome {
    Completed,
    /// The job reported a fail-state token.
    Failed,
    /// Budget exhausted while the job was still running.
    TimedOut,
    /// The status resource stopped answering, or answered with a fatal error.
    Unreachable,
    /// Rejected before any I/O.
    InvalidConfig,
}

/// Result of one [`track_job`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingResult {
    pub failed: bool,
    pub message: String,
    pub outcome: TrackingOutcome,
    /// Last document fetched, if any poll succeeded.
    pub last_snapshot: Option<Value>,
    pub last_state: Option<StateToken>,
    /// Sum of the poll intervals slept (the initial delay is not counted).
    pub elapsed_wait: Duration,
    pub polls: u32,
}

impl TrackingResult {
    fn started() -> Self {
        Self {
            failed: true,
            message: MSG_STARTED.to_string(),
            outcome: TrackingOutcome::TimedOut,
            last_snapshot: None,
            last_state: None,
            elapsed_wait: Duration::ZERO,
            polls: 0,
        }
    }

    pub(crate) fn rejected(message: impl Into<String>, outcome: TrackingOutcome) -> Self {
        Self {
            message: message.into(),
            outcome,
            ..Self::started()
        }
    }

    pub fn timed_out(&self) -> bool {
        self.outcome == TrackingOutcome::TimedOut
    }
}

fn fail_message(token: Option<&StateToken>) -> String {
    match token {
        Some(StateToken::Name(name)) => format!("Job is in {name} state."),
        _ => "Job is in Failed state.".to_string(),
    }
}

/// Poll `job_uri` until the job reaches a complete or fail state, the
/// resource stops answering, or the policy's budget runs out.
pub async fn track_job<C: RemoteStatusClient>(
    client: &C,
    job_uri: &str,
    classification: &JobStateClassification,
    policy: &PollingPolicy,
) -> TrackingResult {
    if classification.has_overlap() {
        return TrackingResult::rejected(MSG_OVERLAP, TrackingOutcome::InvalidConfig);
    }
    if policy.poll_interval.is_zero() {
        return TrackingResult::rejected(MSG_ZERO_INTERVAL, TrackingOutcome::InvalidConfig);
    }

    sleep(policy.initial_delay).await;

    let max_retries = policy.max_retries();
    let full_budget = policy.unresponsive_budget();
    let mut unresponsive = full_budget;
    let mut result = TrackingResult::started();

    for attempt in 1..=max_retries {
        result.polls = attempt;

        match client.get(job_uri).await {
            Ok(response) => {
                unresponsive = full_budget;
                let token = classification.state_path.extract(&response.body);
                tracing::debug!(job_uri, attempt, max_retries, state = ?token, "polled job status");
                result.last_snapshot = Some(response.body);

                match classification.classify(token.as_ref()) {
                    StateClass::Complete => {
                        result.failed = false;
                        result.message = MSG_COMPLETED.to_string();
                        result.outcome = TrackingOutcome::Completed;
                        result.last_state = token;
                        break;
                    }
                    StateClass::Failed => {
                        result.failed = true;
                        result.message = fail_message(token.as_ref());
                        result.outcome = TrackingOutcome::Failed;
                        result.last_state = token;
                        break;
                    }
                    StateClass::Running => {
                        if let Some(t) = &token {
                            if !classification.running_states.is_empty()
                                && !classification.is_known_running(t)
                            {
                                tracing::debug!(job_uri, state = %t, "unrecognised job state, still waiting");
                            }
                        }
                        result.last_state = token;
                    }
                }
            }
            Err(err) if err.is_transient() && unresponsive > 0 => {
                unresponsive -= 1;
                tracing::warn!(job_uri, attempt, remaining = unresponsive, error = %err, "job status unavailable, retrying");
            }
            Err(err) => {
                result.failed = true;
                result.message = format!("{MSG_EXCEPTION_PREFIX}{err}");
                result.outcome = TrackingOutcome::Unreachable;
                break;
            }
        }

        sleep(policy.poll_interval).await;
        result.elapsed_wait += policy.poll_interval;
    }

    tracing::info!(
        job_uri,
        outcome = ?result.outcome,
        polls = result.polls,
        elapsed_secs = result.elapsed_wait.as_secs(),
        "job tracking finished"
    );
    result
}
