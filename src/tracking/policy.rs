use std::time::Duration;

/// Time budget for one [`track_job`](super::track_job) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingPolicy {
    /// Total budget; `max_wait / poll_interval` polls at most.
    pub max_wait: Duration,
    pub poll_interval: Duration,
    /// Grace period before the first poll.
    pub initial_delay: Duration,
    /// Consecutive unreachable time tolerated, in the same units as `max_wait`.
    pub max_unresponsive: Duration,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(600),
            poll_interval: Duration::from_secs(10),
            initial_delay: Duration::from_secs(1),
            max_unresponsive: Duration::from_secs(30),
        }
    }
}

impl PollingPolicy {
    /// Number of polls the budget allows. Zero if `poll_interval` is zero.
    pub fn max_retries(&self) -> u32 {
        Self::intervals_in(self.max_wait, self.poll_interval)
    }

    /// Number of consecutive transient failures tolerated.
    pub fn unresponsive_budget(&self) -> u32 {
        Self::intervals_in(self.max_unresponsive, self.poll_interval)
    }

    fn intervals_in(budget: Duration, interval: Duration) -> u32 {
        if interval.is_zero() {
            return 0;
        }
        u32::try_from(budget.as_nanos() / interval.as_nanos()).unwrap_or(u32::MAX)
    }
}
