//! trexa-embed
//!
//! Text → vector encoding for the index. [`EmbeddingAdapter`] applies the
//! asymmetric `query: ` / `passage: ` role prefixes the E5 family was trained
//! with and splits passages into word chunks before batching them through an
//! [`Embedder`]. Vectors are mean-pooled over real tokens and L2-normalized.

mod device;
mod e5;
mod fake;
mod pool;
mod tokenize;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, ensure, Result};
use hf_hub::api::sync::Api;
use tracing::{debug, info};
use trexa_core::chunking::chunk_text;
use trexa_core::config::{expand_path, EmbeddingSettings};
use trexa_core::traits::Embedder;
use trexa_core::types::Chunk;

pub use device::select_device;
pub use e5::{E5Embedder, ModelFiles};
pub use fake::FakeEmbedder;
pub use pool::masked_mean_l2;
pub use tokenize::{tokenize_batch_on_device, TokenBatch};

pub const QUERY_PREFIX: &str = "query: ";
pub const PASSAGE_PREFIX: &str = "passage: ";

/// Output dimension of e5-small-v2; also the fake embedder's width.
pub const E5_SMALL_DIM: usize = 384;

/// Role-aware front end over an [`Embedder`].
pub struct EmbeddingAdapter {
    model: Box<dyn Embedder>,
    batch_size: usize,
}

impl EmbeddingAdapter {
    pub fn new(model: Box<dyn Embedder>, batch_size: usize) -> Self {
        Self { model, batch_size: batch_size.max(1) }
    }

    pub fn dim(&self) -> usize {
        self.model.dim()
    }

    /// One normalized vector for a search query.
    pub fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let input = vec![format!("{QUERY_PREFIX}{text}")];
        let mut out = self.model.embed_batch(&input)?;
        ensure!(out.len() == 1, "encoder returned {} vectors for one query", out.len());
        Ok(out.remove(0))
    }

    /// Split `document_text` into `chunk_size`-word chunks and embed each as a passage.
    pub fn embed_passage_chunks(&self, document_text: &str, chunk_size: usize) -> Result<Vec<Vec<f32>>> {
        self.embed_chunks(&chunk_text(document_text, chunk_size))
    }

    /// Embed already-split chunks in chunk order.
    ///
    /// The vector count is whatever the encoder produced; callers compare it
    /// with the chunk count.
    pub fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let passages: Vec<String> = chunks.iter().map(|c| format!("{PASSAGE_PREFIX}{}", c.text)).collect();
        self.embed_passages(&passages)
    }

    /// Batch prefixed passages through the model, preserving input order.
    fn embed_passages(&self, passages: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(passages.len());
        for batch in passages.chunks(self.batch_size) {
            vectors.extend(self.model.embed_batch(batch)?);
        }
        debug!(passages = passages.len(), "embedded passages");
        Ok(vectors)
    }
}

fn fake_requested(settings: &EmbeddingSettings) -> bool {
    settings.use_fake
        || std::env::var("APP_USE_FAKE_EMBEDDINGS")
            .ok()
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Build the configured embedder: the fake one when requested, otherwise E5.
///
/// # Errors
/// Fails when no model checkout can be found or downloaded, or it does not load.
pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    if fake_requested(settings) {
        info!("Using FakeEmbedder (dim {})", E5_SMALL_DIM);
        return Ok(Box::new(FakeEmbedder::new(E5_SMALL_DIM)));
    }
    let files = resolve_model_files(settings)?;
    Ok(Box::new(E5Embedder::load(&files, settings.max_len)?))
}

/// Convenience: [`get_default_embedder`] wrapped in an [`EmbeddingAdapter`].
pub fn default_adapter(settings: &EmbeddingSettings) -> Result<EmbeddingAdapter> {
    Ok(EmbeddingAdapter::new(get_default_embedder(settings)?, settings.batch_size))
}

/// Find model files: configured dir, `APP_MODEL_DIR`, `MODEL_DIR`, the
/// conventional `models/<name>` checkouts, then the Hugging Face cache.
pub fn resolve_model_files(settings: &EmbeddingSettings) -> Result<ModelFiles> {
    if let Some(dir) = resolve_model_dir(settings) {
        return ModelFiles::in_dir(&dir);
    }
    info!("No local model directory; fetching {} from the Hugging Face hub", settings.model_id);
    download_model(&settings.model_id)
}

fn resolve_model_dir(settings: &EmbeddingSettings) -> Option<PathBuf> {
    let configured = settings.model_dir.as_deref().map(expand_path);
    let from_env = ["APP_MODEL_DIR", "MODEL_DIR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(PathBuf::from);
    let name = settings.model_id.rsplit('/').next().unwrap_or(&settings.model_id);
    let conventional = [Path::new("models").join(name), Path::new("../models").join(name)];

    let found = configured.into_iter().chain(from_env).chain(conventional).find(|p| p.exists());
    if let Some(p) = &found {
        info!("Using model dir: {}", p.display());
    }
    found
}

fn download_model(model_id: &str) -> Result<ModelFiles> {
    let api = Api::new().map_err(|e| anyhow!("Failed to create HF API: {e}"))?;
    let repo = api.model(model_id.to_string());
    let fetch = |name: &str| repo.get(name).map_err(|e| anyhow!("Failed to download {name}: {e}"));
    let tokenizer = fetch("tokenizer.json")?;
    let config = fetch("config.json")?;
    let weights = fetch("model.safetensors").or_else(|_| fetch("pytorch_model.bin"))?;
    Ok(ModelFiles { tokenizer, config, weights })
}
