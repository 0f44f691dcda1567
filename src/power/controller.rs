use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::sleep;

use super::state::{PowerPollPolicy, PowerState, PowerTransitionRequest, ResetType};
use crate::remote::{ClientError, RemoteStatusClient};

/// Steps of a host reset.
///
/// A reset to `On` flows: INSPECT → SHUTDOWN → AWAIT_OFF → (ESCALATE) → POWER_ON → AWAIT_ON → DONE.
/// SHUTDOWN and AWAIT_OFF are skipped when the host is not running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetPhase {
    Inspect,
    Shutdown(ResetType),
    AwaitOff,
    Escalate,
    PowerOn,
    AwaitOn,
    Done,
}

impl fmt::Display for ResetPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResetPhase::Inspect => write!(f, "INSPECT"),
            ResetPhase::Shutdown(action) => write!(f, "SHUTDOWN({action})"),
            ResetPhase::AwaitOff => write!(f, "AWAIT_OFF"),
            ResetPhase::Escalate => write!(f, "ESCALATE"),
            ResetPhase::PowerOn => write!(f, "POWER_ON"),
            ResetPhase::AwaitOn => write!(f, "AWAIT_ON"),
            ResetPhase::Done => write!(f, "DONE"),
        }
    }
}

/// Result of [`reset_host`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetOutcome {
    /// The desired final state was observed.
    pub success: bool,
    /// The graceful (or first) shutdown did not converge and `ForceOff` was attempted.
    pub escalated: bool,
    /// Reset actions issued, in order.
    pub actions: Vec<ResetType>,
    pub phases: Vec<ResetPhase>,
    /// Last power state read from the host.
    pub final_state: PowerState,
    /// Set when issuing an action failed and the sequence was aborted.
    pub error: Option<String>,
}

/// Read `PowerState` from a Redfish system resource.
pub async fn read_power_state<C: RemoteStatusClient>(
    client: &C,
    power_uri: &str,
) -> Result<PowerState, ClientError> {
    let response = client.get(power_uri).await?;
    let state = response
        .body
        .get("PowerState")
        .and_then(|v| v.as_str())
        .map(PowerState::from_redfish)
        .unwrap_or(PowerState::Unknown);
    Ok(state)
}

/// Drives one host through a reset. Holds no state beyond a single call.
pub struct PowerStateController<'a, C> {
    client: &'a C,
    action_uri: String,
    power_uri: &'a str,
    policy: PowerPollPolicy,
}

impl<'a, C: RemoteStatusClient> PowerStateController<'a, C> {
    pub fn new(client: &'a C, system_uri: &str, power_uri: &'a str, policy: PowerPollPolicy) -> Self {
        Self {
            client,
            action_uri: format!(
                "{}/Actions/ComputerSystem.Reset",
                system_uri.trim_end_matches('/')
            ),
            power_uri,
            policy,
        }
    }

    pub fn action_uri(&self) -> &str {
        &self.action_uri
    }

    /// Run the reset sequence for `requested` (a Redfish `ResetType` name).
    pub async fn reset(&self, requested: &str) -> ResetOutcome {
        let request = PowerTransitionRequest::from_reset_type(requested);
        let mut outcome = ResetOutcome {
            success: false,
            escalated: false,
            actions: Vec::new(),
            phases: Vec::new(),
            final_state: PowerState::Unknown,
            error: None,
        };

        let mut phase = ResetPhase::Inspect;
        loop {
            outcome.phases.push(phase);
            phase = match phase {
                ResetPhase::Inspect => {
                    let current = match read_power_state(self.client, self.power_uri).await {
                        Ok(state) => state,
                        Err(err) => {
                            tracing::warn!(power_uri = self.power_uri, error = %err, "could not read power state");
                            PowerState::Unknown
                        }
                    };
                    outcome.final_state = current;
                    tracing::debug!(requested, %current, "inspected host power state");

                    if current == PowerState::On {
                        ResetPhase::Shutdown(request.shutdown_action())
                    } else if request.desired == PowerState::Off {
                        ResetPhase::AwaitOff
                    } else {
                        ResetPhase::PowerOn
                    }
                }
                ResetPhase::Shutdown(action) => {
                    if let Err(err) = self.invoke(action, &mut outcome).await {
                        self.abort(&mut outcome, action, err);
                        break;
                    }
                    ResetPhase::AwaitOff
                }
                ResetPhase::AwaitOff => {
                    let off = self.wait_for(PowerState::Off, &mut outcome).await;
                    match (off, request.desired) {
                        (true, PowerState::Off) => {
                            outcome.success = true;
                            ResetPhase::Done
                        }
                        (true, _) => ResetPhase::PowerOn,
                        (false, _) if !outcome.escalated => ResetPhase::Escalate,
                        (false, _) => ResetPhase::Done,
                    }
                }
                ResetPhase::Escalate => {
                    tracing::info!(
                        delay_secs = self.policy.escalation_delay.as_secs(),
                        "host did not power off, escalating to ForceOff"
                    );
                    sleep(self.policy.escalation_delay).await;
                    outcome.escalated = true;
                    if let Err(err) = self.invoke(ResetType::ForceOff, &mut outcome).await {
                        self.abort(&mut outcome, ResetType::ForceOff, err);
                        break;
                    }
                    if request.desired == PowerState::Off {
                        ResetPhase::AwaitOff
                    } else {
                        ResetPhase::PowerOn
                    }
                }
                ResetPhase::PowerOn => {
                    if let Err(err) = self.invoke(ResetType::On, &mut outcome).await {
                        self.abort(&mut outcome, ResetType::On, err);
                        break;
                    }
                    ResetPhase::AwaitOn
                }
                ResetPhase::AwaitOn => {
                    outcome.success = self.wait_for(PowerState::On, &mut outcome).await;
                    ResetPhase::Done
                }
                ResetPhase::Done => break,
            };
        }

        tracing::info!(
            requested,
            success = outcome.success,
            escalated = outcome.escalated,
            final_state = %outcome.final_state,
            "host reset finished"
        );
        outcome
    }

    async fn invoke(&self, action: ResetType, outcome: &mut ResetOutcome) -> Result<(), ClientError> {
        outcome.actions.push(action);
        tracing::debug!(action = %action, uri = %self.action_uri, "issuing reset action");
        self.client
            .post(&self.action_uri, &json!({ "ResetType": action.as_str() }))
            .await?;
        Ok(())
    }

    fn abort(&self, outcome: &mut ResetOutcome, action: ResetType, err: ClientError) {
        tracing::warn!(action = %action, error = %err, "reset action failed, aborting");
        outcome.success = false;
        outcome.error = Some(format!("{action} failed: {err}"));
        outcome.phases.push(ResetPhase::Done);
    }

    /// Poll until `target` is observed or the retry budget is spent.
    /// Read errors count as "not yet".
    async fn wait_for(&self, target: PowerState, outcome: &mut ResetOutcome) -> bool {
        for attempt in 1..=self.policy.retries {
            match read_power_state(self.client, self.power_uri).await {
                Ok(state) => {
                    outcome.final_state = state;
                    if state == target {
                        return true;
                    }
                    tracing::debug!(%target, %state, attempt, "waiting for power state");
                }
                Err(err) => {
                    tracing::debug!(%target, attempt, error = %err, "power state unavailable");
                }
            }
            sleep(self.policy.interval).await;
        }
        false
    }
}

/// Reset a host to the state implied by `requested`, escalating from a
/// graceful to a forced shutdown when needed.
pub async fn reset_host<C: RemoteStatusClient>(
    client: &C,
    requested: &str,
    system_uri: &str,
    power_uri: &str,
    policy: PowerPollPolicy,
) -> ResetOutcome {
    PowerStateController::new(client, system_uri, power_uri, policy)
        .reset(requested)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteResponse;
    use crate::remote::mock::{Reply, ScriptedClient};
    use serde_json::Value;
    use std::time::Duration;
    use tokio::time::Instant;

    const SYSTEM: &str = "/redfish/v1/Systems/System.Embedded.1";
    const RESET: &str = "/redfish/v1/Systems/System.Embedded.1/Actions/ComputerSystem.Reset";

    fn power(state: &str) -> Reply {
        Reply::doc(json!({"Id": "System.Embedded.1", "PowerState": state}))
    }

    fn quick() -> PowerPollPolicy {
        PowerPollPolicy {
            retries: 3,
            interval: Duration::from_secs(10),
            escalation_delay: Duration::from_secs(5),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn graceful_restart_from_on() {
        let client = ScriptedClient::new().on_get(SYSTEM, [power("On"), power("Off"), power("On")]);

        let out = reset_host(&client, "GracefulRestart", SYSTEM, SYSTEM, quick()).await;

        assert!(out.success);
        assert!(!out.escalated);
        assert_eq!(out.actions, vec![ResetType::GracefulShutdown, ResetType::On]);
        assert_eq!(client.posted_reset_types(), vec!["GracefulShutdown", "On"]);
        assert!(client.calls().iter().filter(|c| c.method == "POST").all(|c| c.uri == RESET));
        assert_eq!(out.final_state, PowerState::On);
        assert_eq!(
            out.phases,
            vec![
                ResetPhase::Inspect,
                ResetPhase::Shutdown(ResetType::GracefulShutdown),
                ResetPhase::AwaitOff,
                ResetPhase::PowerOn,
                ResetPhase::AwaitOn,
                ResetPhase::Done,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn force_in_name_skips_graceful_attempt() {
        let client = ScriptedClient::new().on_get(SYSTEM, [power("On"), power("Off"), power("On")]);

        let out = reset_host(&client, "ForceRestart", SYSTEM, SYSTEM, quick()).await;

        assert!(out.success);
        assert_eq!(client.posted_reset_types()[0], "ForceOff");
        assert_eq!(out.actions, vec![ResetType::ForceOff, ResetType::On]);
    }

    #[tokio::test(start_paused = true)]
    async fn escalates_once_when_shutdown_stalls() {
        let client = ScriptedClient::new().on_get(SYSTEM, [power("On")]);
        let start = Instant::now();

        let out = reset_host(&client, "GracefulRestart", SYSTEM, SYSTEM, quick()).await;

        assert!(out.escalated);
        assert!(out.success);
        assert_eq!(
            client.posted_reset_types(),
            vec!["GracefulShutdown", "ForceOff", "On"]
        );
        // Inspect, three AWAIT_OFF polls, one AWAIT_ON poll.
        assert_eq!(client.get_count(), 5);
        assert_eq!(start.elapsed(), Duration::from_secs(35));
    }

    #[tokio::test(start_paused = true)]
    async fn escalation_applies_to_forced_requests_too() {
        let client = ScriptedClient::new().on_get(SYSTEM, [power("On")]);

        let out = reset_host(&client, "ForceRestart", SYSTEM, SYSTEM, quick()).await;

        assert!(out.escalated);
        assert_eq!(client.posted_reset_types(), vec!["ForceOff", "ForceOff", "On"]);
    }

    #[tokio::test(start_paused = true)]
    async fn host_already_off_is_only_powered_on() {
        let client = ScriptedClient::new().on_get(SYSTEM, [power("Off"), power("PoweringOn"), power("On")]);

        let out = reset_host(&client, "GracefulRestart", SYSTEM, SYSTEM, quick()).await;

        assert!(out.success);
        assert_eq!(out.actions, vec![ResetType::On]);
    }

    #[tokio::test(start_paused = true)]
    async fn power_on_never_observed() {
        let client = ScriptedClient::new().on_get(SYSTEM, [power("Off")]);

        let out = reset_host(&client, "GracefulRestart", SYSTEM, SYSTEM, quick()).await;

        assert!(!out.success);
        assert!(out.error.is_none());
        assert_eq!(out.final_state, PowerState::Off);
        assert_eq!(client.get_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_action_aborts_sequence() {
        let client = ScriptedClient::new()
            .on_get(SYSTEM, [power("On")])
            .on_post([Reply::Transient("connection reset".into())]);

        let out = reset_host(&client, "GracefulRestart", SYSTEM, SYSTEM, quick()).await;

        assert!(!out.success);
        assert_eq!(client.posted_reset_types(), vec!["GracefulShutdown"]);
        assert_eq!(client.get_count(), 1);
        let error = out.error.unwrap();
        assert!(error.starts_with("GracefulShutdown failed"));
        assert!(error.contains("connection reset"));
        assert_eq!(out.phases.last(), Some(&ResetPhase::Done));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_power_on_aborts_sequence() {
        let client = ScriptedClient::new()
            .on_get(SYSTEM, [power("Off")])
            .on_post([Reply::Transient("refused".into())]);

        let out = reset_host(&client, "GracefulRestart", SYSTEM, SYSTEM, quick()).await;

        assert!(!out.success);
        assert!(!out.escalated);
        assert_eq!(client.posted_reset_types(), vec!["On"]);
        assert_eq!(client.get_count(), 1);
        assert!(out.error.unwrap().starts_with("On failed"));
        assert_eq!(out.final_state, PowerState::Off);
        assert_eq!(out.phases.last(), Some(&ResetPhase::Done));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_force_off_aborts_sequence() {
        let client = ScriptedClient::new()
            .on_get(SYSTEM, [power("On")])
            .on_post([
                Reply::Ok(RemoteResponse::new(204, Value::Null)),
                Reply::Transient("refused".into()),
            ]);

        let out = reset_host(&client, "GracefulRestart", SYSTEM, SYSTEM, quick()).await;

        assert!(!out.success);
        assert!(out.escalated);
        assert_eq!(
            client.posted_reset_types(),
            vec!["GracefulShutdown", "ForceOff"]
        );
        // One inspection read plus the three stalled AWAIT_OFF polls.
        assert_eq!(client.get_count(), 4);
        assert!(out.error.unwrap().starts_with("ForceOff failed"));
        assert_eq!(out.phases.last(), Some(&ResetPhase::Done));
        assert!(!out.phases.contains(&ResetPhase::PowerOn));
    }

    #[tokio::test(start_paused = true)]
    async fn polling_errors_are_retried() {
        let client = ScriptedClient::new().on_get(
            SYSTEM,
            [
                power("On"),
                Reply::Transient("timeout".into()),
                Reply::Transient("timeout".into()),
                power("Off"),
                Reply::Transient("timeout".into()),
                power("On"),
            ],
        );

        let out = reset_host(&client, "GracefulRestart", SYSTEM, SYSTEM, quick()).await;

        assert!(out.success);
        assert!(!out.escalated);
    }

    #[tokio::test(start_paused = true)]
    async fn unreadable_state_goes_straight_to_power_on() {
        let client = ScriptedClient::new().on_get(SYSTEM, [Reply::Transient("down".into()), power("On")]);

        let out = reset_host(&client, "GracefulRestart", SYSTEM, SYSTEM, quick()).await;

        assert!(out.success);
        assert_eq!(out.actions, vec![ResetType::On]);
    }

    #[tokio::test(start_paused = true)]
    async fn graceful_shutdown_does_not_power_back_on() {
        let client = ScriptedClient::new().on_get(SYSTEM, [power("On"), power("PoweringOff"), power("Off")]);

        let out = reset_host(&client, "GracefulShutdown", SYSTEM, SYSTEM, quick()).await;

        assert!(out.success);
        assert_eq!(out.actions, vec![ResetType::GracefulShutdown]);
        assert_eq!(out.final_state, PowerState::Off);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_escalates_then_reports_failure() {
        let client = ScriptedClient::new().on_get(SYSTEM, [power("On")]);

        let out = reset_host(&client, "GracefulShutdown", SYSTEM, SYSTEM, quick()).await;

        assert!(!out.success);
        assert!(out.escalated);
        assert_eq!(out.actions, vec![ResetType::GracefulShutdown, ResetType::ForceOff]);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_power_resource_is_polled() {
        let power_uri = "/redfish/v1/Chassis/System.Embedded.1";
        let client = ScriptedClient::new().on_get(power_uri, [power("Off"), power("On")]);

        let out = reset_host(&client, "On", SYSTEM, power_uri, quick()).await;

        assert!(out.success);
        assert!(client.calls().iter().filter(|c| c.method == "GET").all(|c| c.uri == power_uri));
    }

    #[test]
    fn action_uri_tolerates_trailing_slash() {
        let client = ScriptedClient::new();
        let ctl = PowerStateController::new(&client, "/redfish/v1/Systems/System.Embedded.1/", SYSTEM, quick());
        assert_eq!(ctl.action_uri(), RESET);
    }

    #[test]
    fn phase_display() {
        assert_eq!(ResetPhase::Shutdown(ResetType::ForceOff).to_string(), "SHUTDOWN(ForceOff)");
        assert_eq!(ResetPhase::AwaitOn.to_string(), "AWAIT_ON");
    }
}
