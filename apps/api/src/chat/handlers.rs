use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chat::{build_chat_prompt, classify, ChatCategory, ROADMAP_INTAKE_REPLY};
use crate::errors::AppError;
use crate::llm_client::prompts::CHAT_SYSTEM;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_role() -> String {
    "student".to_string()
}

fn default_name() -> String {
    "User".to_string()
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub category: ChatCategory,
}

/// POST /ai-chat/
pub async fn handle_ai_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let category = classify(&req.message);
    debug!(?category, role = %req.role, "Chat message classified");

    let response = match category {
        ChatCategory::Roadmap => ROADMAP_INTAKE_REPLY.to_string(),
        ChatCategory::General => {
            let prompt = build_chat_prompt(&req.role, &req.name, &req.message);
            state.llm.complete(CHAT_SYSTEM, &prompt).await?
        }
    };

    Ok(Json(ChatResponse { response, category }))
}
