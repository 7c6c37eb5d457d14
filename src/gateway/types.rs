use serde::{Deserialize, Serialize};

use super::{remove_fence_markers, strip_code_fences};

/// Sampling temperature sent with every upstream call.
pub const TEMPERATURE: f64 = 1.3;

/// Message in a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Get the role name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// `error` field of a relayed upstream failure
pub const UPSTREAM_API_ERROR: &str = "Upstream API error";

/// Error body returned by the gateway on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Request to an OpenAI-compatible chat completion endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub response_format: ResponseFormat,
    pub stream: bool,
}

/// Requested output format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    /// Require the upstream to produce a JSON object
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

impl ChatCompletionRequest {
    /// Create a JSON-mode request with the fixed sampling temperature
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: TEMPERATURE,
            response_format: ResponseFormat::json_object(),
            stream: false,
        }
    }
}

/// Response from a chat completion endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub model: Option<String>,
    pub usage: Option<Usage>,
}

/// One completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    pub finish_reason: Option<String>,
}

/// Message payload inside a choice
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage information
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if any
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

/// Topic classification attached to every reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnAnalysis {
    #[serde(default)]
    pub is_new_topic: bool,
    #[serde(default)]
    pub reasoning: String,
}

/// Normalized gateway result: `{reply, analysis: {is_new_topic, reasoning}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReply {
    pub reply: String,
    #[serde(default)]
    pub analysis: TurnAnalysis,
}

impl TurnReply {
    /// Build a reply without a topic change
    pub fn continuing(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            analysis: TurnAnalysis::default(),
        }
    }

    /// Parse the upstream completion text.
    ///
    /// Fenced JSON is unwrapped only when it parses as a reply object.
    /// Anything else becomes the reply verbatim, minus fence markers, with
    /// `is_new_topic = false`.
    pub fn from_completion(completion: &str) -> Self {
        if let Ok(parsed) = serde_json::from_str::<TurnReply>(strip_code_fences(completion)) {
            return parsed;
        }

        let body = remove_fence_markers(completion);
        tracing::debug!(
            preview = %body.chars().take(80).collect::<String>(),
            "Completion is not a reply object, using raw text"
        );
        Self::continuing(body)
    }
}
