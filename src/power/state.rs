use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Power state as reported in a Redfish `ComputerSystem` resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerState {
    On,
    Off,
    PoweringOn,
    PoweringOff,
    Unknown,
}

impl PowerState {
    pub fn from_redfish(value: &str) -> Self {
        match value {
            "On" => PowerState::On,
            "Off" => PowerState::Off,
            "PoweringOn" => PowerState::PoweringOn,
            "PoweringOff" => PowerState::PoweringOff,
            _ => PowerState::Unknown,
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PowerState::On => "On",
            PowerState::Off => "Off",
            PowerState::PoweringOn => "PoweringOn",
            PowerState::PoweringOff => "PoweringOff",
            PowerState::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

/// Redfish `ResetType` values accepted by `ComputerSystem.Reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetType {
    On,
    ForceOff,
    GracefulShutdown,
    GracefulRestart,
    ForceRestart,
    PowerCycle,
    PushPowerButton,
    Nmi,
}

impl ResetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetType::On => "On",
            ResetType::ForceOff => "ForceOff",
            ResetType::GracefulShutdown => "GracefulShutdown",
            ResetType::GracefulRestart => "GracefulRestart",
            ResetType::ForceRestart => "ForceRestart",
            ResetType::PowerCycle => "PowerCycle",
            ResetType::PushPowerButton => "PushPowerButton",
            ResetType::Nmi => "Nmi",
        }
    }
}

impl fmt::Display for ResetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown reset type: {0}")]
pub struct UnknownResetType(pub String);

impl FromStr for ResetType {
    type Err = UnknownResetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reset = match s {
            "On" => ResetType::On,
            "ForceOff" => ResetType::ForceOff,
            "GracefulShutdown" => ResetType::GracefulShutdown,
            "GracefulRestart" => ResetType::GracefulRestart,
            "ForceRestart" => ResetType::ForceRestart,
            "PowerCycle" => ResetType::PowerCycle,
            "PushPowerButton" => ResetType::PushPowerButton,
            "Nmi" => ResetType::Nmi,
            other => return Err(UnknownResetType(other.to_string())),
        };
        Ok(reset)
    }
}

/// What the caller asked for, reduced to the two facts the controller needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerTransitionRequest {
    /// `On` or `Off`.
    pub desired: PowerState,
    /// The requested name contains "Force": skip the graceful shutdown.
    pub force: bool,
}

impl PowerTransitionRequest {
    pub fn from_reset_type(name: &str) -> Self {
        let desired = match name {
            "ForceOff" | "GracefulShutdown" => PowerState::Off,
            _ => PowerState::On,
        };
        Self {
            desired,
            force: name.contains("Force"),
        }
    }

    /// First action used to take a running host down.
    pub fn shutdown_action(&self) -> ResetType {
        if self.force {
            ResetType::ForceOff
        } else {
            ResetType::GracefulShutdown
        }
    }
}

/// Retry budget for each power-state wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerPollPolicy {
    pub retries: u32,
    pub interval: Duration,
    /// Pause before escalating to `ForceOff`.
    pub escalation_delay: Duration,
}

impl Default for PowerPollPolicy {
    fn default() -> Self {
        Self {
            retries: 30,
            interval: Duration::from_secs(10),
            escalation_delay: Duration::from_secs(10),
        }
    }
}
