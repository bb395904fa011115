use crate::error::{AppError, Result};
use crate::models::{ChatForm, ChatResponse};
use crate::services::ChatAssistant;
use axum::{
    extract::{RawForm, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use validator::Validate;

pub struct AppState {
    pub assistant: Arc<ChatAssistant>,
}

pub fn chat_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    RawForm(body): RawForm,
) -> Result<Json<ChatResponse>> {
    let form = ChatForm::from_urlencoded(&body);
    form.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    tracing::info!(
        "Chat turn with {} history entries",
        form.conversation_history.len()
    );

    let response = state
        .assistant
        .handle_turn(&form.user_input, form.conversation_history)
        .await?;

    Ok(Json(response))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
