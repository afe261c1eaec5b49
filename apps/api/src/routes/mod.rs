pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::chat::handlers as chat;
use crate::roadmap::handlers as roadmap;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Roadmap generation
        .route(
            "/generate-ai-roadmap/",
            post(roadmap::handle_generate_ai_roadmap),
        )
        .route(
            "/generate-domain-roadmap/",
            post(roadmap::handle_generate_domain_roadmap),
        )
        // Stored roadmaps
        .route("/sessions/:session_id/roadmaps", get(roadmap::handle_list_roadmaps))
        .route(
            "/roadmaps/:id/progress",
            patch(roadmap::handle_update_progress),
        )
        // Chat assistant
        .route("/ai-chat/", post(chat::handle_ai_chat))
        .with_state(state)
}
