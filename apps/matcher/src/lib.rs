//! Semantic matching of a resume against a job description.
//!
//! Both texts are embedded with a sentence-transformer model and compared; a
//! [`MatchPolicy`] turns the similarity into a shortlisting decision.

pub mod cli;
pub mod embedding;
pub mod error;
pub mod policy;
pub mod resume;
pub mod similarity;

pub use embedding::{Embedder, OnnxEmbedder};
pub use error::MatchError;
pub use policy::{score_pair, MatchPolicy, MatchReport, Metric};
