use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One decoded response from the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteResponse {
    /// HTTP status code (always 2xx; other codes surface as `ClientError`).
    pub status: u16,
    /// Decoded JSON body. Empty bodies (e.g. 204 from a reset action) decode to `Null`.
    pub body: Value,
    /// `Location` header, set by job-creating actions on iDRAC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl RemoteResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}
