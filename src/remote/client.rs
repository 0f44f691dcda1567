use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url, header};
use serde_json::Value;

use super::error::ClientError;
use super::types::RemoteResponse;

/// The single seam between the polling core and the network.
///
/// Both OME and iDRAC adapters implement this with the same `uri` parameter;
/// the core never knows which dialect is on the other side.
#[allow(async_fn_in_trait)]
pub trait RemoteStatusClient {
    async fn get(&self, uri: &str) -> Result<RemoteResponse, ClientError>;

    async fn post(&self, uri: &str, payload: &Value) -> Result<RemoteResponse, ClientError>;
}

/// reqwest-backed client using HTTP basic auth against one controller.
pub struct RestClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl RestClient {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        validate_certs: bool,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        // Controllers ship self-signed certificates unless an operator replaced them.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .danger_accept_invalid_certs(!validate_certs)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
        })
    }

    /// Resolve a locator against the base URL. Absolute URLs pass through untouched.
    pub fn resolve(&self, uri: &str) -> Result<Url, ClientError> {
        let joined = if uri.starts_with("http://") || uri.starts_with("https://") {
            uri.to_string()
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                uri.trim_start_matches('/')
            )
        };
        Url::parse(&joined).map_err(|e| ClientError::InvalidUri(format!("{joined}: {e}")))
    }

    async fn decode(response: Response) -> Result<RemoteResponse, ClientError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))?
        };

        Ok(RemoteResponse {
            status: status.as_u16(),
            body,
            location,
        })
    }
}

impl RemoteStatusClient for RestClient {
    async fn get(&self, uri: &str) -> Result<RemoteResponse, ClientError> {
        let url = self.resolve(uri)?;
        tracing::trace!(%url, "GET");
        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn post(&self, uri: &str, payload: &Value) -> Result<RemoteResponse, ClientError> {
        let url = self.resolve(uri)?;
        tracing::trace!(%url, "POST");
        let response = self
            .client
            .post(url)
            .basic_auth(&self.username, Some(&self.password))
            .json(payload)
            .send()
            .await?;
        Self::decode(response).await
    }
}
