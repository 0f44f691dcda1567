//! Host power transitions over the Redfish `ComputerSystem.Reset` action.

mod controller;
mod state;

pub use controller::{PowerStateController, ResetOutcome, ResetPhase, read_power_state, reset_host};
pub use state::{PowerPollPolicy, PowerState, PowerTransitionRequest, ResetType, UnknownResetType};
