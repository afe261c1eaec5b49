//! Roadmap persistence.
//!
//! Handlers see only the `RoadmapStore` trait; `PgRoadmapStore` is the production
//! backend and `AppState` carries it as `Arc<dyn RoadmapStore>`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::roadmap::{NewRoadmap, RoadmapRow, CREATED_BY_SYSTEM};

#[async_trait]
pub trait RoadmapStore: Send + Sync {
    /// True when the platform has recorded a mentorship session with this id.
    async fn session_exists(&self, session_id: &str) -> Result<bool, AppError>;

    async fn insert_roadmap(&self, roadmap: NewRoadmap) -> Result<RoadmapRow, AppError>;

    /// All roadmaps for a session, newest first.
    async fn roadmaps_for_session(&self, session_id: &str) -> Result<Vec<RoadmapRow>, AppError>;

    /// Returns `None` when no roadmap has this id.
    async fn update_progress(&self, id: Uuid, progress: i32)
        -> Result<Option<RoadmapRow>, AppError>;
}

#[derive(Clone)]
pub struct PgRoadmapStore {
    pool: PgPool,
}

impl PgRoadmapStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoadmapStore for PgRoadmapStore {
    async fn session_exists(&self, session_id: &str) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM mentorship_sessions WHERE session_id = $1)",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_roadmap(&self, roadmap: NewRoadmap) -> Result<RoadmapRow, AppError> {
        let row = sqlx::query_as::<_, RoadmapRow>(
            r#"
            INSERT INTO roadmaps
                (id, session_id, type, domain, created_by, roadmap_content,
                 quiz_content, quiz_questions, progress, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&roadmap.session_id)
        .bind(roadmap.kind.as_str())
        .bind(&roadmap.domain)
        .bind(CREATED_BY_SYSTEM)
        .bind(&roadmap.roadmap_content)
        .bind(&roadmap.quiz_content)
        .bind(Json(&roadmap.quiz_questions))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn roadmaps_for_session(&self, session_id: &str) -> Result<Vec<RoadmapRow>, AppError> {
        let rows = sqlx::query_as::<_, RoadmapRow>(
            "SELECT * FROM roadmaps WHERE session_id = $1 ORDER BY created_at DESC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_progress(
        &self,
        id: Uuid,
        progress: i32,
    ) -> Result<Option<RoadmapRow>, AppError> {
        let row = sqlx::query_as::<_, RoadmapRow>(
            "UPDATE roadmaps SET progress = $1 WHERE id = $2 RETURNING *",
        )
        .bind(progress)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

/// In-memory store used by handler tests.
#[cfg(test)]
pub mod memory {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryStore {
        pub sessions: Mutex<HashSet<String>>,
        pub roadmaps: Mutex<Vec<RoadmapRow>>,
    }

    impl MemoryStore {
        pub fn with_session(session_id: &str) -> Self {
            let store = Self::default();
            store
                .sessions
                .lock()
                .unwrap()
                .insert(session_id.to_string());
            store
        }

        pub fn stored(&self) -> Vec<RoadmapRow> {
            self.roadmaps.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RoadmapStore for MemoryStore {
        async fn session_exists(&self, session_id: &str) -> Result<bool, AppError> {
            Ok(self.sessions.lock().unwrap().contains(session_id))
        }

        async fn insert_roadmap(&self, roadmap: NewRoadmap) -> Result<RoadmapRow, AppError> {
            let row = roadmap.into_row(Uuid::new_v4(), Utc::now());
            self.roadmaps.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn roadmaps_for_session(
            &self,
            session_id: &str,
        ) -> Result<Vec<RoadmapRow>, AppError> {
            let mut rows: Vec<RoadmapRow> = self
                .roadmaps
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.session_id == session_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rows)
        }

        async fn update_progress(
            &self,
            id: Uuid,
            progress: i32,
        ) -> Result<Option<RoadmapRow>, AppError> {
            let mut rows = self.roadmaps.lock().unwrap();
            Ok(rows.iter_mut().find(|r| r.id == id).map(|r| {
                r.progress = progress;
                r.clone()
            }))
        }
    }
}
