//! Embedding generation for dictionary retrieval.
//!
//! The dictionary index embeds every corpus entry once at startup and
//! embeds free-text queries at lookup time, both through this trait.

mod openai;

pub use openai::OpenAIEmbedder;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, preserving input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Embedder;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Deterministic embedder mapping known strings to fixed vectors.
    /// Unknown text gets the fallback vector.
    pub struct StaticEmbedder {
        vectors: HashMap<String, Vec<f32>>,
        fallback: Vec<f32>,
    }

    impl StaticEmbedder {
        pub fn new(vectors: HashMap<String, Vec<f32>>, fallback: Vec<f32>) -> Self {
            Self { vectors, fallback }
        }
    }

    #[async_trait]
    impl Embedder for StaticEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(self
                .vectors
                .get(text)
                .cloned()
                .unwrap_or_else(|| self.fallback.clone()))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            self.fallback.len()
        }
    }
}
