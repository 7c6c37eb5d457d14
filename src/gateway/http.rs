use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use super::types::{ChatMessage, ChatRequest, ErrorBody, TurnReply, UPSTREAM_API_ERROR};
use super::ChatGateway;
use crate::config::RequestConfig;
use crate::error::{GatewayError, GatewayResult};

/// Gateway reached over HTTP (`POST /api/chat` on a `socratic serve` instance)
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    endpoint: String,
    timeout_ms: u64,
}

impl HttpGateway {
    /// Create a client for the gateway at `base_url`
    pub fn new(base_url: &str, request_config: RequestConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(GatewayError::Http)?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
            timeout_ms: request_config.timeout_ms,
        })
    }

    /// Full URL of the chat endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Map a gateway error response back to a [`GatewayError`].
    ///
    /// A 500 carrying only `error` is the missing-key answer; relayed upstream
    /// failures always say [`UPSTREAM_API_ERROR`] and carry `details`.
    fn error_from_body(status: StatusCode, body: &str) -> GatewayError {
        let parsed = serde_json::from_str::<ErrorBody>(body).ok();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            if let Some(ErrorBody {
                error,
                details: None,
            }) = &parsed
            {
                if error != UPSTREAM_API_ERROR {
                    return GatewayError::Configuration {
                        message: error.clone(),
                    };
                }
            }
        }

        let message = parsed
            .as_ref()
            .map(|b| b.error.clone())
            .unwrap_or_else(|| body.to_string());
        let details = parsed
            .and_then(|b| b.details)
            .unwrap_or_else(|| message.clone());

        if status == StatusCode::GATEWAY_TIMEOUT {
            GatewayError::Network { message }
        } else {
            GatewayError::Upstream {
                status: status.as_u16(),
                details,
            }
        }
    }
}

#[async_trait]
impl ChatGateway for HttpGateway {
    async fn send(&self, history: &[ChatMessage]) -> GatewayResult<TurnReply> {
        debug!(endpoint = %self.endpoint, messages = history.len(), "Posting chat turn");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest {
                messages: history.to_vec(),
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    GatewayError::Network {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::error_from_body(status, &body));
        }

        response
            .json::<TurnReply>()
            .await
            .map_err(|e| GatewayError::InvalidResponse {
                message: format!("Failed to parse gateway reply: {}", e),
            })
    }
}
