pub mod onnx;

use anyhow::Result;

pub use onnx::OnnxEmbedder;

pub type Embedding = Vec<f32>;

pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Embedding>;
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
    fn dimensions(&self) -> usize;
    fn model_name(&self) -> &str;
}
