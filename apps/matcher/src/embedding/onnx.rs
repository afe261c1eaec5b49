//! ONNX sentence-transformer embedder.
//!
//! Runs a sentence-transformer export (`all-MiniLM-L6-v2`, `all-mpnet-base-v2`, ...)
//! on ONNX Runtime:
//! - HuggingFace tokenizer, truncated to the model's max sequence length
//! - attention-masked mean pooling over token embeddings
//! - optional L2 normalisation
//!
//! The output dimension is read from the model at load time.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use ndarray::{Array2, ArrayView2, Axis};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use tokenizers::{Encoding, Tokenizer, TruncationParams};
use tracing::{debug, info};

use super::{Embedder, Embedding};
use crate::similarity::l2_normalize;

/// Embedding model backed by an ONNX Runtime session.
///
/// Cloning is cheap; clones share the session and the tokenizer.
#[derive(Clone)]
pub struct OnnxEmbedder {
    /// `Session::run` needs `&mut`, so the session sits behind a mutex.
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
    dimension: usize,
    max_length: usize,
    /// BERT-style exports take `token_type_ids`; MPNet exports don't.
    uses_token_type_ids: bool,
    normalize: bool,
}

impl std::fmt::Debug for OnnxEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbedder")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("max_length", &self.max_length)
            .field("normalize", &self.normalize)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbedder {
    /// Loads `model.onnx` and `tokenizer.json` and probes the output dimension.
    ///
    /// # Errors
    /// Fails if either file is missing or invalid, or if the model does not
    /// produce token embeddings shaped `[batch, seq_len, hidden]`.
    pub fn load(
        model_name: impl Into<String>,
        model_path: &Path,
        tokenizer_path: &Path,
        max_length: usize,
    ) -> Result<Self> {
        let model_name = model_name.into();

        if !model_path.exists() {
            bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))?;

        let input_names: Vec<_> = session.inputs.iter().map(|i| i.name.as_str()).collect();
        debug!("Model inputs: {:?}", input_names);
        let uses_token_type_ids = input_names.contains(&"token_type_ids");

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
        // Batches are padded by hand in `run`.
        tokenizer.with_padding(None);

        let mut embedder = Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            dimension: 0,
            max_length,
            uses_token_type_ids,
            normalize: false,
        };

        let probe = embedder.run(&["validation test"])?;
        embedder.dimension = probe.first().map(Vec::len).unwrap_or(0);
        if embedder.dimension == 0 {
            bail!("Model {} produced an empty embedding", embedder.model_name);
        }

        info!(
            model = %embedder.model_name,
            dimension = embedder.dimension,
            max_length,
            "ONNX embedding model loaded"
        );
        Ok(embedder)
    }

    /// L2-normalise every embedding this model returns.
    pub fn normalized(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    fn encode(&self, texts: &[&str]) -> Result<Vec<Encoding>> {
        texts
            .iter()
            .map(|text| {
                self.tokenizer
                    .encode(*text, true)
                    .map_err(|e| anyhow!("Tokenization failed: {}", e))
            })
            .collect()
    }

    /// Tokenizes, pads to the longest sequence, runs the model and mean-pools.
    fn run(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self.encode(texts)?;
        let (input_ids, attention_mask) = pad_batch(&encodings);
        let token_type_ids = Array2::<i64>::zeros(input_ids.raw_dim());

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("ONNX session lock poisoned"))?;

        let outputs = if self.uses_token_type_ids {
            session.run(ort::inputs![
                "input_ids" => Value::from_array(input_ids)?,
                "attention_mask" => Value::from_array(attention_mask.clone())?,
                "token_type_ids" => Value::from_array(token_type_ids)?
            ])?
        } else {
            session.run(ort::inputs![
                "input_ids" => Value::from_array(input_ids)?,
                "attention_mask" => Value::from_array(attention_mask.clone())?
            ])?
        };

        // Index 0 rather than a name: exports disagree on the output name.
        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;
        let shape = output.shape().to_vec();
        if shape.len() != 3 {
            bail!(
                "Model outputs unexpected dimensions: {:?} (expected [batch, seq_len, hidden])",
                shape
            );
        }

        let mut embeddings = Vec::with_capacity(texts.len());
        for (batch_idx, mask) in attention_mask.outer_iter().enumerate() {
            let tokens = output
                .index_axis(Axis(0), batch_idx)
                .into_dimensionality::<ndarray::Ix2>()
                .context("Unexpected token embedding shape")?;
            let mut pooled = mean_pool(tokens, mask.as_slice().unwrap_or(&[]));
            if self.normalize {
                l2_normalize(&mut pooled);
            }
            embeddings.push(pooled);
        }

        Ok(embeddings)
    }
}

impl Embedder for OnnxEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding> {
        self.run(&[text])?
            .pop()
            .ok_or_else(|| anyhow!("Model returned no embedding"))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        self.run(texts)
    }

    fn dimensions(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Right-pads ids and masks with zeros to the longest encoding.
fn pad_batch(encodings: &[Encoding]) -> (Array2<i64>, Array2<i64>) {
    let max_len = encodings
        .iter()
        .map(|e| e.get_ids().len())
        .max()
        .unwrap_or(0);

    let mut ids = Array2::<i64>::zeros((encodings.len(), max_len));
    let mut mask = Array2::<i64>::zeros((encodings.len(), max_len));
    for (row, encoding) in encodings.iter().enumerate() {
        for (col, (&id, &m)) in encoding
            .get_ids()
            .iter()
            .zip(encoding.get_attention_mask())
            .enumerate()
        {
            ids[[row, col]] = id as i64;
            mask[[row, col]] = m as i64;
        }
    }
    (ids, mask)
}

/// Average of the token embeddings whose mask is set.
fn mean_pool(tokens: ArrayView2<f32>, mask: &[i64]) -> Embedding {
    let hidden = tokens.shape()[1];
    let mut pooled = vec![0.0f32; hidden];
    let mut count = 0.0f32;

    for (row, &m) in tokens.outer_iter().zip(mask) {
        if m == 0 {
            continue;
        }
        count += 1.0;
        for (acc, v) in pooled.iter_mut().zip(row.iter()) {
            *acc += v;
        }
    }

    let count = count.max(1e-9);
    pooled.iter_mut().for_each(|v| *v /= count);
    pooled
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_mean_pool_skips_padding() {
        let tokens = array![[1.0f32, 2.0], [3.0, 4.0], [100.0, 100.0]];
        let pooled = mean_pool(tokens.view(), &[1, 1, 0]);
        assert_eq!(pooled, vec![2.0, 3.0]);
    }

    #[test]
    fn test_mean_pool_all_masked_is_zero() {
        let tokens = array![[5.0f32, 5.0]];
        assert_eq!(mean_pool(tokens.view(), &[0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_missing_model_file_fails() {
        let err = OnnxEmbedder::load(
            "all-MiniLM-L6-v2",
            Path::new("/nope/model.onnx"),
            Path::new("/nope/tokenizer.json"),
            256,
        )
        .unwrap_err();
        assert!(err.to_string().contains("ONNX model file not found"));
    }

    const MODEL_DIR: &str = "/workspace/models/all-MiniLM-L6-v2-onnx";

    fn load_minilm() -> OnnxEmbedder {
        OnnxEmbedder::load(
            "all-MiniLM-L6-v2",
            &Path::new(MODEL_DIR).join("model.onnx"),
            &Path::new(MODEL_DIR).join("tokenizer.json"),
            256,
        )
        .unwrap()
    }

    #[test]
    #[ignore] // Only run if model files are downloaded
    fn test_minilm_dimension_and_batch() {
        let model = load_minilm();
        assert_eq!(model.dimensions(), 384);

        let batch = model.embed_batch(&["short", "a somewhat longer sentence"]).unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|e| e.len() == 384));
    }

    #[test]
    #[ignore] // Only run if model files are downloaded
    fn test_batch_matches_single_embedding() {
        let model = load_minilm();
        let single = model.embed("a somewhat longer sentence").unwrap();
        let batch = model.embed_batch(&["short", "a somewhat longer sentence"]).unwrap();
        for (a, b) in single.iter().zip(&batch[1]) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    #[ignore] // Only run if model files are downloaded
    fn test_normalized_embeddings_have_unit_norm() {
        let model = load_minilm().normalized(true);
        let e = model.embed("Rust backend engineer").unwrap();
        let norm: f32 = e.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }
}
