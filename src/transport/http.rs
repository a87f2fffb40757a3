use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use tracing::{debug, warn};

use async_trait::async_trait;

use crate::config::ProbeConfig;
use crate::error::{Result, TransportFailure};
use crate::protocol::{RpcRequest, RpcResponse};

use super::{ExchangeResult, Transport};

const BODY_PREVIEW_CHARS: usize = 200;

/// HTTP POST transport. Each exchange opens its own connection.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint(),
        })
    }

    async fn post(&self, request: &RpcRequest) -> ExchangeResult {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<RpcResponse>(&body) {
            Ok(envelope) => {
                if !status.is_success() {
                    debug!(%status, method = %request.method, "envelope delivered with non-success status");
                }
                Ok(envelope)
            }
            Err(e) if status.is_success() => {
                Err(TransportFailure::other(format!("invalid JSON response: {e}")))
            }
            Err(_) => Err(TransportFailure::other(format!(
                "HTTP {status}: {}",
                preview(&String::from_utf8_lossy(&body))
            ))),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn exchange(&self, request: &RpcRequest) -> ExchangeResult {
        let result = self.post(request).await;
        if let Err(failure) = &result {
            warn!(
                endpoint = %self.endpoint,
                method = %request.method,
                kind = ?failure.kind(),
                error = %failure,
                "exchange failed"
            );
        }
        result
    }
}

fn preview(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= BODY_PREVIEW_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(BODY_PREVIEW_CHARS).collect();
    format!("{cut}...")
}
