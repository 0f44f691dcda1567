//! Polling of long-running controller jobs until they finish, fail or time out.

mod classification;
mod policy;
mod report;
mod submit;
mod tracker;

pub use classification::{
    JobStateClassification, StateClass, StatePath, StateToken, ome_status_name,
};
pub use policy::PollingPolicy;
pub use report::TrackingReport;
pub use submit::{SubmitError, submit_and_track, submit_job, wait_until_responsive};
pub use tracker::{
    MSG_COMPLETED, MSG_EXCEPTION_PREFIX, MSG_OVERLAP, MSG_STARTED, MSG_ZERO_INTERVAL,
    TrackingOutcome, TrackingResult, track_job,
};
