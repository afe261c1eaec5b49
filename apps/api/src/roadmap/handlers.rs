//! Axum route handlers for the Roadmap API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::prompts::{DOMAIN_ROADMAP_SYSTEM, ROADMAP_SYSTEM};
use crate::models::roadmap::{NewRoadmap, RoadmapKind, RoadmapRow};
use crate::roadmap::prompts::{build_domain_prompt, build_personal_prompt};
use crate::roadmap::quiz::{parse_quiz, split_sections, QuizQuestion};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Query parameters of `POST /generate-ai-roadmap/`.
#[derive(Debug, Deserialize)]
pub struct PersonalRoadmapParams {
    pub session_id: String,
    pub github_summary: String,
    pub linkedin_skills: String,
    pub career_goal: String,
}

#[derive(Debug, Serialize)]
pub struct PersonalRoadmapResponse {
    pub message: String,
    pub session_id: String,
    pub roadmap: String,
}

#[derive(Debug, Deserialize)]
pub struct DomainRoadmapRequest {
    pub domain: String,
    #[serde(default = "default_student_name")]
    pub student_name: String,
    #[serde(default = "default_mentor_name")]
    pub mentor_name: String,
    /// Empty means "don't persist".
    #[serde(default)]
    pub session_id: String,
}

fn default_student_name() -> String {
    "Student".to_string()
}

fn default_mentor_name() -> String {
    "Mentor".to_string()
}

#[derive(Debug, Serialize)]
pub struct DomainRoadmapResponse {
    pub domain: String,
    pub roadmap: String,
    pub quiz: String,
    pub quiz_questions: Vec<QuizQuestion>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ProgressUpdate {
    pub progress: i32,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /generate-ai-roadmap/
///
/// Generates a personalised 6-week roadmap for an existing mentorship session
/// and stores it against that session.
pub async fn handle_generate_ai_roadmap(
    State(state): State<AppState>,
    Query(params): Query<PersonalRoadmapParams>,
) -> Result<Json<PersonalRoadmapResponse>, AppError> {
    if !state.store.session_exists(&params.session_id).await? {
        return Err(AppError::NotFound(format!(
            "Mentorship session '{}' not found.",
            params.session_id
        )));
    }

    let prompt = build_personal_prompt(
        &params.github_summary,
        &params.linkedin_skills,
        &params.career_goal,
    );
    let roadmap = state.llm.complete(ROADMAP_SYSTEM, &prompt).await?;

    let row = state
        .store
        .insert_roadmap(NewRoadmap {
            session_id: params.session_id.clone(),
            kind: RoadmapKind::Ai,
            domain: None,
            roadmap_content: roadmap.clone(),
            quiz_content: None,
            quiz_questions: Vec::new(),
        })
        .await?;
    info!(roadmap_id = %row.id, session_id = %params.session_id, "Stored personalised roadmap");

    Ok(Json(PersonalRoadmapResponse {
        message: "AI Roadmap Created Successfully".to_string(),
        session_id: params.session_id,
        roadmap,
    }))
}

/// POST /generate-domain-roadmap/
///
/// Generates a domain roadmap plus a 5-question MCQ quiz. The result is stored
/// only when the request names a session.
pub async fn handle_generate_domain_roadmap(
    State(state): State<AppState>,
    Json(request): Json<DomainRoadmapRequest>,
) -> Result<Json<DomainRoadmapResponse>, AppError> {
    if request.domain.trim().is_empty() {
        return Err(AppError::Validation("domain cannot be empty".to_string()));
    }

    let prompt = build_domain_prompt(&request.domain, &request.student_name, &request.mentor_name);
    let full_text = state.llm.complete(DOMAIN_ROADMAP_SYSTEM, &prompt).await?;

    let (roadmap, quiz) = split_sections(&full_text);
    let quiz_questions = parse_quiz(&quiz);
    info!(
        domain = %request.domain,
        questions = quiz_questions.len(),
        "Generated domain roadmap"
    );

    if !request.session_id.is_empty() {
        let row = state
            .store
            .insert_roadmap(NewRoadmap {
                session_id: request.session_id.clone(),
                kind: RoadmapKind::DomainAi,
                domain: Some(request.domain.clone()),
                roadmap_content: roadmap.clone(),
                quiz_content: Some(quiz.clone()),
                quiz_questions: quiz_questions.clone(),
            })
            .await?;
        info!(roadmap_id = %row.id, session_id = %request.session_id, "Stored domain roadmap");
    }

    let message = format!("Domain roadmap for '{}' generated successfully", request.domain);
    Ok(Json(DomainRoadmapResponse {
        domain: request.domain,
        roadmap,
        quiz,
        quiz_questions,
        message,
    }))
}

/// GET /sessions/:session_id/roadmaps
pub async fn handle_list_roadmaps(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<RoadmapRow>>, AppError> {
    let rows = state.store.roadmaps_for_session(&session_id).await?;
    Ok(Json(rows))
}

/// PATCH /roadmaps/:id/progress
pub async fn handle_update_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<ProgressUpdate>,
) -> Result<Json<RoadmapRow>, AppError> {
    if !(0..=100).contains(&update.progress) {
        return Err(AppError::Validation(
            "progress must be between 0 and 100".to_string(),
        ));
    }

    let row = state
        .store
        .update_progress(id, update.progress)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Roadmap {id} not found")))?;

    Ok(Json(row))
}
