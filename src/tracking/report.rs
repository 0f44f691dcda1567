use chrono::{DateTime, Utc};
use serde::Serialize;

use super::classification::{StateToken, ome_status_name};
use super::tracker::{TrackingOutcome, TrackingResult};

/// Record of one tracked job, printed by the CLI once tracking finishes.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingReport {
    pub job_uri: String,
    pub failed: bool,
    pub message: String,
    pub outcome: TrackingOutcome,
    pub last_state: Option<StateToken>,
    /// OME status name for numeric states.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_state_name: Option<String>,
    pub polls: u32,
    pub elapsed_wait_secs: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl TrackingReport {
    pub fn from_result(job_uri: &str, result: &TrackingResult, started_at: DateTime<Utc>) -> Self {
        let finished_at = Utc::now();
        let last_state_name = match &result.last_state {
            Some(StateToken::Code(code)) => ome_status_name(*code).map(str::to_string),
            _ => None,
        };

        Self {
            job_uri: job_uri.to_string(),
            failed: result.failed,
            message: result.message.clone(),
            outcome: result.outcome,
            last_state: result.last_state.clone(),
            last_state_name,
            polls: result.polls,
            elapsed_wait_secs: result.elapsed_wait.as_secs(),
            started_at,
            finished_at,
            duration_ms: (finished_at - started_at).num_milliseconds(),
        }
    }
}
