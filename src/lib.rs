//! Job tracking and power-state orchestration for Dell iDRAC (Redfish) and
//! OpenManage Enterprise.
//!
//! [`tracking::track_job`] polls a job resource until it completes, fails or
//! the budget runs out. [`power::reset_host`] drives a host through a reset,
//! escalating from a graceful to a forced shutdown. Both talk to the network
//! only through [`remote::RemoteStatusClient`].

pub mod config;
pub mod error;
pub mod power;
pub mod remote;
pub mod tracking;
