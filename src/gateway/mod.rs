//! Completion gateway: the boundary between the dialogue and the remote model.
//!
//! - [`CompletionClient`] calls the upstream chat-completion API directly.
//! - [`HttpGateway`] talks to a running `socratic serve` instance.
//!
//! Both implement [`ChatGateway`], which is what the session driver depends on.

mod client;
mod http;
mod types;


pub use client::CompletionClient;
pub use http::HttpGateway;
pub use types::*;

use async_trait::async_trait;

use crate::error::GatewayResult;

/// Anything that can turn a conversation history into the next reply.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send the history (user and assistant turns, oldest first) and get the
    /// normalized reply for the latest user turn.
    async fn send(&self, history: &[ChatMessage]) -> GatewayResult<TurnReply>;
}

/// Strip markdown code fences from a completion string.
///
/// Handles bare JSON, ```` ```json ... ``` ```` and ```` ``` ... ``` ````.
/// Text without fences comes back trimmed.
pub(crate) fn strip_code_fences(completion: &str) -> &str {
    // Fast path: raw JSON
    let trimmed = completion.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }

    match trimmed.split_once("```") {
        Some((_, after)) => {
            let after = after
                .strip_prefix("json")
                .or_else(|| after.strip_prefix("JSON"))
                .unwrap_or(after);
            after.split("```").next().unwrap_or(after).trim()
        }
        None => trimmed,
    }
}

/// The whole completion with fence markers removed and nothing else dropped
pub(crate) fn remove_fence_markers(completion: &str) -> String {
    completion
        .trim()
        .replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}
