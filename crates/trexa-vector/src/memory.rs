//! In-memory [`VectorIndex`] with brute-force cosine search.
//!
//! Nothing is persisted. Used by tests and by tools that want the pipeline
//! without a LanceDB directory.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use trexa_core::traits::VectorIndex;
use trexa_core::types::{ChunkId, ChunkMatch, IndexRecord, MetadataFilter};
use trexa_core::{Error, Result};

#[derive(Default)]
pub struct MemoryIndex {
    /// Vector width; fixed by the first upsert when not given up front.
    dim: RwLock<Option<usize>>,
    records: RwLock<Option<BTreeMap<ChunkId, IndexRecord>>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dim(dim: usize) -> Self {
        Self { dim: RwLock::new(Some(dim)), records: RwLock::default() }
    }

    pub async fn dim(&self) -> Option<usize> {
        *self.dim.read().await
    }
}

fn check_width(expected: usize, vector: &[f32], what: &str) -> Result<()> {
    if vector.len() == expected {
        Ok(())
    } else {
        Err(Error::Backend(format!("{what} has {} dimensions, index expects {expected}", vector.len())))
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 1.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn initialize(&self) -> Result<()> {
        let mut guard = self.records.write().await;
        if guard.is_none() {
            *guard = Some(BTreeMap::new());
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.records.read().await.is_some()
    }

    async fn upsert(&self, records: &[IndexRecord]) -> Result<()> {
        let mut guard = self.records.write().await;
        let map = guard.as_mut().ok_or(Error::NotInitialized)?;
        let Some(first) = records.first() else {
            return Ok(());
        };
        let mut dim = self.dim.write().await;
        let expected = *dim.get_or_insert(first.vector.len());
        for r in records {
            check_width(expected, &r.vector, &format!("vector for {}", r.id))?;
        }
        for r in records {
            map.insert(r.id.clone(), r.clone());
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ChunkMatch>> {
        let guard = self.records.read().await;
        let map = guard.as_ref().ok_or(Error::NotInitialized)?;
        if let Some(expected) = self.dim().await {
            check_width(expected, vector, "query vector")?;
        }
        let mut scored: Vec<ChunkMatch> = map
            .values()
            .map(|r| ChunkMatch {
                id: r.id.clone(),
                metadata: r.metadata.clone(),
                text: r.text.clone(),
                distance: cosine_distance(vector, &r.vector),
            })
            .collect();
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete_where(&self, filter: &MetadataFilter) -> Result<()> {
        let mut guard = self.records.write().await;
        let map = guard.as_mut().ok_or(Error::NotInitialized)?;
        map.retain(|_, r| !filter.matches(&r.metadata));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut guard = self.records.write().await;
        let map = guard.as_mut().ok_or(Error::NotInitialized)?;
        map.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let guard = self.records.read().await;
        Ok(guard.as_ref().ok_or(Error::NotInitialized)?.len())
    }

    async fn file_paths(&self) -> Result<BTreeSet<String>> {
        let guard = self.records.read().await;
        let map = guard.as_ref().ok_or(Error::NotInitialized)?;
        Ok(map.values().filter_map(|r| r.file_path().map(str::to_string)).collect())
    }
}
