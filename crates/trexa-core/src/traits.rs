use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChunkMatch, IndexRecord, MetadataFilter};

/// A text encoder producing fixed-size, L2-normalized vectors.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    /// Encode `texts` in one batch; output order matches input order.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Persistent store of index records with cosine nearest-neighbour search.
///
/// Implementations own their lifecycle: `initialize` is idempotent and every
/// data operation fails with `Error::NotInitialized` before it.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Open or create the collection. Later calls are no-ops.
    async fn initialize(&self) -> Result<()>;

    /// Attach to a collection that already exists without creating one.
    /// Returns whether the index is ready afterwards.
    async fn open_existing(&self) -> Result<bool> {
        Ok(self.is_ready().await)
    }

    async fn is_ready(&self) -> bool;

    /// Insert or replace records keyed by chunk id. An empty slice is a no-op.
    async fn upsert(&self, records: &[IndexRecord]) -> Result<()>;

    /// Up to `top_k` nearest records in ascending cosine distance.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ChunkMatch>>;

    async fn delete_where(&self, filter: &MetadataFilter) -> Result<()>;

    /// Drop every record and leave an empty, initialized collection.
    async fn clear(&self) -> Result<()>;

    async fn count(&self) -> Result<usize>;

    /// Distinct `file_path` values currently stored.
    async fn file_paths(&self) -> Result<BTreeSet<String>>;
}
