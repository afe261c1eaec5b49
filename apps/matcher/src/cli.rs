//! Pieces shared by the `resume-match` and `shortlist` binaries.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::embedding::OnnxEmbedder;
use crate::policy::MatchPolicy;

/// Where to find the embedding model.
#[derive(Debug, Clone, Args)]
pub struct ModelArgs {
    /// Path to the ONNX export of the sentence-transformer
    #[arg(long, env = "MATCHER_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Path to the model's tokenizer.json
    #[arg(long, env = "MATCHER_TOKENIZER_PATH")]
    pub tokenizer_path: Option<PathBuf>,

    /// Model name, for logs
    #[arg(long, env = "MATCHER_MODEL_NAME")]
    pub model_name: Option<String>,

    /// Maximum tokens per text; longer texts are truncated
    #[arg(long, env = "MATCHER_MAX_LENGTH")]
    pub max_length: Option<usize>,

    /// Override the policy's acceptance threshold (0..1)
    #[arg(long, value_parser = parse_threshold)]
    pub threshold: Option<f32>,
}

impl ModelArgs {
    /// Loads the embedder configured for `policy` (normalising when the policy wants it).
    ///
    /// The model paths are checked here rather than by clap, so a caller that forgot
    /// its positional arguments still gets the binary's own error output.
    pub fn load_embedder(
        &self,
        default_name: &str,
        default_max_length: usize,
        policy: &MatchPolicy,
    ) -> Result<OnnxEmbedder> {
        let name = self
            .model_name
            .clone()
            .unwrap_or_else(|| default_name.to_string());
        let model_path = self
            .model_path
            .as_deref()
            .context("No ONNX model given; set --model-path or MATCHER_MODEL_PATH")?;
        let tokenizer_path = self
            .tokenizer_path
            .as_deref()
            .context("No tokenizer given; set --tokenizer-path or MATCHER_TOKENIZER_PATH")?;
        let embedder = OnnxEmbedder::load(
            name,
            model_path,
            tokenizer_path,
            self.max_length.unwrap_or(default_max_length),
        )?;
        Ok(embedder.normalized(policy.normalize))
    }

    pub fn apply_threshold(&self, policy: MatchPolicy) -> MatchPolicy {
        match self.threshold {
            Some(t) => policy.with_threshold(t),
            None => policy,
        }
    }
}

fn parse_threshold(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("threshold must be between 0 and 1, got {value}"))
    }
}

/// Logs go to stderr; stdout is reserved for the result.
pub fn init_logging() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("matcher=warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
