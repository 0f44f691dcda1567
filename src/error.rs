use thiserror::Error;

/// Errors detected while validating `jobwatch.toml`, before any request is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base_url must not be empty")]
    MissingBaseUrl,

    #[error("job.poll_interval_secs must be greater than zero")]
    ZeroPollInterval,

    #[error("power.interval_secs must be greater than zero")]
    ZeroPowerInterval,
}

/// Classifies a client failure for the polling loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Worth another poll: network hiccup, 5xx, garbled body, controller rebooting.
    Transient,
    /// Retrying cannot help (bad credentials, malformed locator).
    Fatal,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Transient => write!(f, "Transient"),
            FailureKind::Fatal => write!(f, "Fatal"),
        }
    }
}
