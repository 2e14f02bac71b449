//! REST transport over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ExchangeError, Method, SignedAction, Transport};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const BODY_PREVIEW_SIZE: usize = 200;

/// Sends signed actions as JSON to `{base_url}/{endpoint}`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// # Errors
    /// `Transport` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ExchangeError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(
        &self,
        method: Method,
        endpoint: &str,
        payload: &SignedAction,
    ) -> Result<Value, ExchangeError> {
        let url = self.endpoint_url(endpoint);
        debug!(%method, url = %url, nonce = payload.nonce, "Sending exchange request");

        let mut request = self.client.request(method.into(), &url);
        if method == Method::Post {
            request = request.json(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(format!("{method} {url} failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Transport(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            let body_preview: String = body.chars().take(BODY_PREVIEW_SIZE).collect();
            warn!(
                status = status.as_u16(),
                url = %url,
                body_preview = %body_preview,
                "HTTP error response"
            );
            return Err(ExchangeError::Transport(format!("HTTP {status}: {body_preview}")));
        }

        serde_json::from_str(&body).map_err(|e| ExchangeError::InvalidResponse(e.to_string()))
    }
}
