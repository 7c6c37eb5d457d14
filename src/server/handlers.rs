use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::time::Instant;
use tracing::{info, warn};

use super::SharedState;
use crate::error::{GatewayError, PROXY_HINT};
use crate::gateway::{ChatRequest, TurnReply, UPSTREAM_API_ERROR};

/// `POST /api/chat`
pub async fn handle_chat(
    State(state): State<SharedState>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<TurnReply>, GatewayError> {
    let Json(request) = request.map_err(|rejection| GatewayError::InvalidRequest {
        message: rejection.body_text(),
    })?;
    let start = Instant::now();
    info!(messages = request.messages.len(), "Chat turn received");

    let reply = state.client.complete(&request.messages).await?;

    info!(
        latency_ms = start.elapsed().as_millis(),
        is_new_topic = reply.analysis.is_new_topic,
        "Chat turn answered"
    );
    Ok(Json(reply))
}

/// `GET /api/health`
pub async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        warn!(error = %self, "Chat turn failed");

        let (status, body) = match &self {
            GatewayError::Configuration { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": message }),
            ),
            GatewayError::Upstream { status, details } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                json!({ "error": UPSTREAM_API_ERROR, "details": details }),
            ),
            GatewayError::Network { .. } | GatewayError::Timeout { .. } => (
                StatusCode::GATEWAY_TIMEOUT,
                json!({ "error": self.to_string(), "details": PROXY_HINT }),
            ),
            GatewayError::InvalidResponse { .. }
            | GatewayError::InvalidRequest { .. }
            | GatewayError::Http(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error", "details": self.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
