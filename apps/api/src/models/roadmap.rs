use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::roadmap::quiz::QuizQuestion;

/// Who asked for the roadmap: a personalised one or a domain roadmap with quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadmapKind {
    Ai,
    DomainAi,
}

impl RoadmapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoadmapKind::Ai => "ai",
            RoadmapKind::DomainAi => "domain_ai",
        }
    }
}

/// Roadmaps are only ever written by this service on behalf of the platform.
pub const CREATED_BY_SYSTEM: &str = "system";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoadmapRow {
    pub id: Uuid,
    pub session_id: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub roadmap_type: String,
    pub domain: Option<String>,
    pub created_by: String,
    pub roadmap_content: String,
    pub quiz_content: Option<String>,
    pub quiz_questions: Json<Vec<QuizQuestion>>,
    pub progress: i32,
    pub created_at: DateTime<Utc>,
}

/// Insert payload. `id`, `progress` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewRoadmap {
    pub session_id: String,
    pub kind: RoadmapKind,
    pub domain: Option<String>,
    pub roadmap_content: String,
    pub quiz_content: Option<String>,
    pub quiz_questions: Vec<QuizQuestion>,
}

impl NewRoadmap {
    /// Materialises the row exactly as it will be stored.
    pub fn into_row(self, id: Uuid, created_at: DateTime<Utc>) -> RoadmapRow {
        RoadmapRow {
            id,
            session_id: self.session_id,
            roadmap_type: self.kind.as_str().to_string(),
            domain: self.domain,
            created_by: CREATED_BY_SYSTEM.to_string(),
            roadmap_content: self.roadmap_content,
            quiz_content: self.quiz_content,
            quiz_questions: Json(self.quiz_questions),
            progress: 0,
            created_at,
        }
    }
}
