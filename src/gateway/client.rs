use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Role, TurnReply};
use super::ChatGateway;
use crate::config::{RequestConfig, UpstreamConfig};
use crate::error::{GatewayError, GatewayResult};
use crate::prompts::SOCRATIC_SYSTEM_PROMPT;

/// Client for an OpenAI-compatible chat completion API
#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout_ms: u64,
}

impl CompletionClient {
    /// Create a new completion client
    pub fn new(config: &UpstreamConfig, request_config: RequestConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(GatewayError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout_ms: request_config.timeout_ms,
        })
    }

    /// Run one turn: prepend the system instruction, call upstream, normalize the reply
    pub async fn complete(&self, history: &[ChatMessage]) -> GatewayResult<TurnReply> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::Configuration {
                message: "SOCRATIC_API_KEY is not set".to_string(),
            })?;

        let request = ChatCompletionRequest::new(&self.model, Self::build_messages(history));
        let url = format!("{}/chat/completions", self.base_url);
        let start = Instant::now();

        match self.execute_request(&url, api_key, &request).await {
            Ok(response) => {
                let completion = response.first_content().ok_or_else(|| {
                    GatewayError::InvalidResponse {
                        message: "Completion has no choices".to_string(),
                    }
                })?;
                let reply = TurnReply::from_completion(completion);
                info!(
                    model = %self.model,
                    latency_ms = start.elapsed().as_millis(),
                    is_new_topic = reply.analysis.is_new_topic,
                    "Completion call succeeded"
                );
                Ok(reply)
            }
            Err(e) => {
                error!(
                    model = %self.model,
                    error = %e,
                    latency_ms = start.elapsed().as_millis(),
                    "Completion call failed"
                );
                Err(e)
            }
        }
    }

    /// Build the upstream message list: one fixed system instruction, then the history
    pub fn build_messages(history: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage::system(SOCRATIC_SYSTEM_PROMPT));
        // Client-supplied system messages are dropped; the instruction is ours.
        messages.extend(
            history
                .iter()
                .filter(|m| m.role != Role::System)
                .cloned(),
        );
        messages
    }

    /// Execute a single request (internal)
    async fn execute_request(
        &self,
        url: &str,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> GatewayResult<ChatCompletionResponse> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Calling completion API"
        );

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                details: error_body,
            });
        }

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    GatewayError::InvalidResponse {
                        message: format!("Failed to parse response: {}", e),
                    }
                }
            })
    }

    fn classify_send_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else if e.is_connect() || e.is_request() {
            GatewayError::Network {
                message: e.to_string(),
            }
        } else {
            GatewayError::Http(e)
        }
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the model identifier
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether an API key is configured
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ChatGateway for CompletionClient {
    async fn send(&self, history: &[ChatMessage]) -> GatewayResult<TurnReply> {
        self.complete(history).await
    }
}
