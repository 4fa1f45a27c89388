//! E5 sentence encoder (BERT architecture) running on candle.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, ensure, Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};
use trexa_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::{configure_truncation, tokenize_batch_on_device};

/// Files making up a local model checkout.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    pub tokenizer: PathBuf,
    pub config: PathBuf,
    pub weights: PathBuf,
}

impl ModelFiles {
    /// Locate files inside `dir`, preferring safetensors over a pickle checkpoint.
    pub fn in_dir(dir: &Path) -> Result<Self> {
        let tokenizer = dir.join("tokenizer.json");
        let config = dir.join("config.json");
        ensure!(tokenizer.exists(), "missing {}", tokenizer.display());
        ensure!(config.exists(), "missing {}", config.display());
        let weights = ["model.safetensors", "pytorch_model.bin"]
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())
            .ok_or_else(|| anyhow!("no model weights found in {}", dir.display()))?;
        Ok(Self { tokenizer, config, weights })
    }
}

pub struct E5Embedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
    pad_id: u32,
}

impl E5Embedder {
    pub fn load(files: &ModelFiles, max_len: usize) -> Result<Self> {
        let device = select_device();
        info!("Loading E5 tokenizer from {}", files.tokenizer.display());
        let mut tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", files.tokenizer.display(), e))?;

        let raw = std::fs::read_to_string(&files.config)
            .with_context(|| format!("reading {}", files.config.display()))?;
        let config: BertConfig = serde_json::from_str(&raw).context("parsing model config")?;
        let shape = ConfigShape::from_json(&raw)?;
        let max_len = max_len.min(shape.max_position_embeddings);
        configure_truncation(&mut tokenizer, max_len)?;

        info!("Loading E5 weights from {}", files.weights.display());
        let vb = if files.weights.extension().is_some_and(|e| e == "safetensors") {
            let bytes = std::fs::read(&files.weights)?;
            VarBuilder::from_buffered_safetensors(bytes, DType::F32, &device)?
        } else {
            let weights = candle_core::pickle::read_all(&files.weights)?;
            let weights_map: std::collections::HashMap<String, Tensor> = weights.into_iter().collect();
            VarBuilder::from_tensors(weights_map, DType::F32, &device)
        };
        let model = BertModel::load(vb, &config).context("building BERT model")?;
        info!(dim = shape.hidden_size, max_len, "E5 model loaded");

        Ok(Self { model, tokenizer, device, dim: shape.hidden_size, max_len, pad_id: shape.pad_token_id })
    }
}

/// The handful of `config.json` fields the encoder needs outside the model.
struct ConfigShape {
    hidden_size: usize,
    max_position_embeddings: usize,
    pad_token_id: u32,
}

impl ConfigShape {
    fn from_json(raw: &str) -> Result<Self> {
        let v: serde_json::Value = serde_json::from_str(raw)?;
        let field = |name: &str| v.get(name).and_then(serde_json::Value::as_u64);
        let hidden_size = field("hidden_size").ok_or_else(|| anyhow!("config.json has no hidden_size"))?;
        Ok(Self {
            hidden_size: usize::try_from(hidden_size)?,
            max_position_embeddings: field("max_position_embeddings")
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(512),
            pad_token_id: field("pad_token_id").and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        })
    }
}

impl Embedder for E5Embedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        self.max_len
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let start = Instant::now();
        let batch = tokenize_batch_on_device(&self.tokenizer, texts, self.pad_id, &self.device)?;
        let token_type_ids = batch.input_ids.zeros_like()?;
        let hidden = self
            .model
            .forward(&batch.input_ids, &token_type_ids, Some(&batch.attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &batch.attention_mask)?;
        let vectors: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_dtype(DType::F32)?.to_vec2()?;
        ensure!(vectors.len() == texts.len(), "encoder returned {} vectors for {} inputs", vectors.len(), texts.len());

        let elapsed = start.elapsed();
        debug!(batch = texts.len(), ms = elapsed.as_millis(), "encoded batch");
        if elapsed.as_secs() >= 10 {
            warn!(batch = texts.len(), "slow embedding batch: {:?}", elapsed);
        }
        Ok(vectors)
    }
}
