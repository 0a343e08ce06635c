//! The chat surface: one conversational endpoint plus a read path for the
//! pending-manager-approval queue.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wardstock_agent::{AgentRuntime, ConversationReply};
use wardstock_core::domain::order::PendingOrder;
use wardstock_db::OrderRepository;

const PENDING_ORDERS_LIMIT: u32 = 50;

#[derive(Clone)]
pub struct ChatState {
    pub runtime: Arc<AgentRuntime>,
    pub orders: Arc<dyn OrderRepository>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
    pub session_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub correlation_id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct PendingOrdersResponse {
    pub orders: Vec<PendingOrder>,
    pub total: usize,
}

pub fn router(state: ChatState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/pending-orders", get(pending_orders))
        .with_state(state)
}

pub async fn chat(
    State(state): State<ChatState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ConversationReply>, (StatusCode, Json<ErrorResponse>)> {
    if request.message.trim().is_empty()
        || request.user_id.trim().is_empty()
        || request.session_id.trim().is_empty()
    {
        return Err(bad_request("message, user_id, and session_id must be non-empty"));
    }

    let reply = state
        .runtime
        .process_conversation(&request.message, &request.user_id, &request.session_id)
        .await;
    Ok(Json(reply))
}

pub async fn pending_orders(
    State(state): State<ChatState>,
) -> Result<Json<PendingOrdersResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.orders.list_pending_orders(PENDING_ORDERS_LIMIT).await {
        Ok(orders) => {
            let total = orders.len();
            Ok(Json(PendingOrdersResponse { orders, total }))
        }
        Err(error) => {
            let correlation_id = Uuid::new_v4().to_string();
            tracing::error!(
                event_name = "server.pending_orders.failed",
                correlation_id = %correlation_id,
                error = %error,
                "pending-order listing failed"
            );
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "The service is temporarily unavailable. Please retry shortly."
                        .to_string(),
                    correlation_id,
                }),
            ))
        }
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            correlation_id: Uuid::new_v4().to_string(),
        }),
    )
}
