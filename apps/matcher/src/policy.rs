//! Shortlisting decisions: how two texts are compared and where the bar is.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::embedding::Embedder;
use crate::error::MatchError;
use crate::similarity::{cosine_similarity, dot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cosine,
    /// Dot product; meant for L2-normalised embeddings.
    Dot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchPolicy {
    pub metric: Metric,
    /// Whether the embedder should L2-normalise its output.
    pub normalize: bool,
    /// Minimum similarity (0..1) to accept.
    pub threshold: f32,
    pub accept_label: &'static str,
    pub reject_label: &'static str,
}

impl MatchPolicy {
    /// Resume PDF vs an alumni job post: cosine on MiniLM embeddings, 70% bar.
    pub fn resume() -> Self {
        Self {
            metric: Metric::Cosine,
            normalize: false,
            threshold: 0.70,
            accept_label: "SELECTED",
            reject_label: "REJECTED",
        }
    }

    /// Pasted resume text vs a job description: dot on normalised MPNet embeddings, 60% bar.
    pub fn shortlist() -> Self {
        Self {
            metric: Metric::Dot,
            normalize: true,
            threshold: 0.60,
            accept_label: "SHORTLISTED",
            reject_label: "NOT SHORTLISTED",
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn similarity(&self, a: &[f32], b: &[f32]) -> Result<f32, MatchError> {
        match self.metric {
            Metric::Cosine => cosine_similarity(a, b),
            Metric::Dot => dot(a, b),
        }
    }

    /// Turns a raw similarity into a report.
    pub fn judge(&self, similarity: f32) -> MatchReport {
        let is_eligible = similarity >= self.threshold;
        MatchReport {
            status: if is_eligible {
                self.accept_label
            } else {
                self.reject_label
            }
            .to_string(),
            score: to_percent(similarity),
            is_eligible,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchReport {
    pub status: String,
    /// Similarity as a percentage, rounded to two decimals.
    pub score: f64,
    pub is_eligible: bool,
}

/// `0.73456` -> `73.46`
pub fn to_percent(similarity: f32) -> f64 {
    (f64::from(similarity) * 100.0 * 100.0).round() / 100.0
}

/// Embeds both texts and judges them under `policy`.
///
/// The embedder is expected to already normalise when `policy.normalize` is set.
pub fn score_pair(
    embedder: &dyn Embedder,
    policy: &MatchPolicy,
    job_description: &str,
    resume: &str,
) -> Result<MatchReport> {
    if job_description.trim().is_empty() {
        return Err(MatchError::EmptyText("Job description").into());
    }
    if resume.trim().is_empty() {
        return Err(MatchError::EmptyText("Resume text").into());
    }

    let embeddings = embedder.embed_batch(&[job_description, resume])?;
    let [jd, cv] = embeddings.as_slice() else {
        anyhow::bail!("Expected 2 embeddings, got {}", embeddings.len());
    };

    let similarity = policy.similarity(jd, cv)?;
    debug!(
        model = embedder.model_name(),
        metric = ?policy.metric,
        similarity,
        "Scored resume against job description"
    );
    Ok(policy.judge(similarity))
}
