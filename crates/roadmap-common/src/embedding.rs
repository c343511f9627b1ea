/// Embedding wrapper around fastembed.
///
/// `TextEmbedding` from fastembed is synchronous and CPU-bound. All model work goes
/// through `tokio::task::spawn_blocking`. The model is loaded lazily on the first embed
/// call and shared read-only afterwards; concurrent first callers race on a
/// `tokio::sync::OnceCell`, so exactly one of them performs the load.
///
/// The all-MiniLM-L6-v2 model takes raw text, no task prefixes.
use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use crate::error::CommonError;

/// Anything that turns texts into fixed-length vectors.
///
/// Implementations must use one embedding function for every call within a process so
/// that vectors stay comparable.
pub trait TextEmbedder: Send + Sync {
    /// Embed each text, returning one vector per input in input order.
    fn embed(
        &self,
        texts: Vec<String>,
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, CommonError>> + Send;
}

/// Lazily-initialized fastembed model.
pub struct Embedder {
    kind: fastembed::EmbeddingModel,
    model: OnceCell<Arc<fastembed::TextEmbedding>>,
}

impl Embedder {
    /// Create an embedder for all-MiniLM-L6-v2 without loading it.
    ///
    /// The model is downloaded (~90MB) and loaded on the first call to `embed`.
    pub fn new() -> Self {
        Self::with_model(fastembed::EmbeddingModel::AllMiniLML6V2)
    }

    pub fn with_model(kind: fastembed::EmbeddingModel) -> Self {
        Self {
            kind,
            model: OnceCell::new(),
        }
    }

    /// Whether the model has been loaded yet.
    pub fn is_initialized(&self) -> bool {
        self.model.initialized()
    }

    async fn model(&self) -> Result<Arc<fastembed::TextEmbedding>, CommonError> {
        let model = self
            .model
            .get_or_try_init(|| async {
                info!(model = ?self.kind, "loading embedding model (may download on first run)");
                let kind = self.kind.clone();
                let model = tokio::task::spawn_blocking(move || {
                    let options =
                        fastembed::InitOptions::new(kind).with_show_download_progress(false);
                    fastembed::TextEmbedding::try_new(options)
                })
                .await
                .map_err(|e| CommonError::Embedding(format!("spawn_blocking join error: {e}")))?
                .map_err(|e| CommonError::Embedding(format!("model initialization failed: {e}")))?;
                info!("embedding model ready");
                Ok::<_, CommonError>(Arc::new(model))
            })
            .await?;
        Ok(Arc::clone(model))
    }
}

impl Default for Embedder {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEmbedder for Embedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, CommonError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let expected = texts.len();
        let model = self.model().await?;
        let vectors = tokio::task::spawn_blocking(move || model.embed(texts, None))
            .await
            .map_err(|e| CommonError::Embedding(format!("spawn_blocking join error: {e}")))?
            .map_err(|e| CommonError::Embedding(format!("embedding failed: {e}")))?;

        if vectors.len() != expected {
            return Err(CommonError::Embedding(format!(
                "embedding count mismatch: expected {expected}, got {}",
                vectors.len()
            )));
        }
        Ok(vectors)
    }
}

/// Cosine similarity of two vectors, in [-1, 1].
///
/// Returns 0.0 when either vector has zero magnitude or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0) as f32
}
