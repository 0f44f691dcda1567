use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;

use super::classification::JobStateClassification;
use super::policy::PollingPolicy;
use super::tracker::{TrackingOutcome, TrackingResult, track_job};
use crate::error::FailureKind;
use crate::remote::{ClientError, RemoteResponse, RemoteStatusClient};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("response did not identify the created job")]
    MissingJobLocator,
}

/// Where the action that was just POSTed can be polled.
///
/// iDRAC answers with a `Location` header; OME returns the job body, with
/// either an `@odata.id` or just an `Id` relative to the job collection.
fn job_locator(response: &RemoteResponse, job_collection: Option<&str>) -> Option<String> {
    if let Some(location) = &response.location {
        return Some(location.clone());
    }
    if let Some(id) = response.body.get("@odata.id").and_then(Value::as_str) {
        return Some(id.to_string());
    }
    let collection = job_collection?;
    match response.body.get("Id")? {
        Value::Number(n) => Some(format!("{collection}({n})")),
        Value::String(s) => Some(format!("{}/{s}", collection.trim_end_matches('/'))),
        _ => None,
    }
}

/// POST an action and return the locator of the job it created.
pub async fn submit_job<C: RemoteStatusClient>(
    client: &C,
    action_uri: &str,
    payload: &Value,
    job_collection: Option<&str>,
) -> Result<String, SubmitError> {
    let response = client.post(action_uri, payload).await?;
    let locator = job_locator(&response, job_collection).ok_or(SubmitError::MissingJobLocator)?;
    tracing::info!(action_uri, job = %locator, "job submitted");
    Ok(locator)
}

/// Submit an action, then track the job it created.
pub async fn submit_and_track<C: RemoteStatusClient>(
    client: &C,
    action_uri: &str,
    payload: &Value,
    job_collection: Option<&str>,
    classification: &JobStateClassification,
    policy: &PollingPolicy,
) -> TrackingResult {
    match submit_job(client, action_uri, payload, job_collection).await {
        Ok(job_uri) => track_job(client, &job_uri, classification, policy).await,
        Err(err) => TrackingResult::rejected(
            format!("Job submission failed: {err}"),
            TrackingOutcome::Unreachable,
        ),
    }
}

/// After a controller reset, wait until `uri` answers again.
///
/// Returns the time waited, or `None` if the budget ran out or the
/// controller answered with something retrying cannot fix.
pub async fn wait_until_responsive<C: RemoteStatusClient>(
    client: &C,
    uri: &str,
    policy: &PollingPolicy,
) -> Option<Duration> {
    sleep(policy.initial_delay).await;

    let mut waited = Duration::ZERO;
    for attempt in 1..=policy.max_retries() {
        match client.get(uri).await {
            Ok(_) => {
                tracing::info!(uri, attempt, waited_secs = waited.as_secs(), "controller is responsive");
                return Some(waited);
            }
            Err(err) if err.kind() == FailureKind::Fatal => {
                tracing::warn!(uri, error = %err, "controller answered with a fatal error");
                return None;
            }
            Err(err) => {
                tracing::debug!(uri, attempt, error = %err, "controller not responsive yet");
            }
        }
        sleep(policy.poll_interval).await;
        waited += policy.poll_interval;
    }
    None
}
