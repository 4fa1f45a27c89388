use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;
use trexa_core::config::SearchSettings;
use trexa_core::traits::VectorIndex;
use trexa_core::types::{ChunkMatch, SearchResult};
use trexa_core::{Error, Result};
use trexa_embed::EmbeddingAdapter;

/// Read-only query path: nearest chunks collapsed to unique files.
pub struct SearchService {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<EmbeddingAdapter>,
    settings: SearchSettings,
}

/// Keep the first (closest) chunk of each file, up to `top_k` files.
///
/// `matches` must already be in ascending distance order.
pub fn collapse_to_files(matches: &[ChunkMatch], top_k: usize) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    let mut results = Vec::with_capacity(top_k);
    for m in matches {
        if results.len() >= top_k {
            break;
        }
        let Some(path) = m.file_path() else { continue };
        if !seen.insert(path.to_string()) {
            continue;
        }
        results.push(SearchResult {
            file_path: path.to_string(),
            file_name: m.file_name().unwrap_or_default().to_string(),
            score: 1.0 - m.distance,
        });
    }
    results
}

impl SearchService {
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<EmbeddingAdapter>, settings: SearchSettings) -> Self {
        Self { index, embedder, settings }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Up to `top_k` distinct files ranked by their best chunk.
    ///
    /// Candidates are over-fetched and the fetch doubles while duplicates
    /// leave fewer than `top_k` files, capped at `max_candidates`.
    ///
    /// # Errors
    /// `NotInitialized` before anything was indexed or opened; `Backend` when
    /// the encoder or the index fails.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        if !self.index.is_ready().await {
            return Err(Error::NotInitialized);
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let embedder = self.embedder.clone();
        let text = query.to_string();
        let vector = tokio::task::spawn_blocking(move || embedder.embed_query(&text))
            .await
            .map_err(Error::backend)?
            .map_err(Error::backend)?;

        let cap = self.settings.max_candidates.max(top_k);
        let mut fetch = top_k.saturating_mul(self.settings.overfetch.max(1)).min(cap);
        loop {
            let matches = self.index.query(&vector, fetch).await?;
            let results = collapse_to_files(&matches, top_k);
            let exhausted = matches.len() < fetch;
            if results.len() >= top_k || exhausted || fetch >= cap {
                debug!(candidates = matches.len(), files = results.len(), "search collapsed");
                return Ok(results);
            }
            fetch = fetch.saturating_mul(2).min(cap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trexa_core::types::{MetaValue, Metadata};

    fn hit(path: &str, distance: f32) -> ChunkMatch {
        let mut metadata = Metadata::new();
        metadata.insert("file_path".into(), MetaValue::from(path));
        metadata.insert("file_name".into(), MetaValue::from(path.rsplit('/').next().unwrap_or(path)));
        ChunkMatch { id: format!("{path}::0"), metadata, text: String::new(), distance }
    }

    #[test]
    fn first_hit_per_file_wins() {
        let matches = vec![hit("/a.txt", 0.1), hit("/b.txt", 0.2), hit("/a.txt", 0.25), hit("/c.txt", 0.4)];
        let results = collapse_to_files(&matches, 5);
        let paths: Vec<&str> = results.iter().map(|r| r.file_path.as_str()).collect();
        assert_eq!(paths, vec!["/a.txt", "/b.txt", "/c.txt"]);
        assert!((results[0].score - 0.9).abs() < 1e-6);
        assert_eq!(results[1].file_name, "b.txt");
    }

    #[test]
    fn stops_at_top_k_files() {
        let matches = vec![hit("/a.txt", 0.1), hit("/b.txt", 0.2), hit("/c.txt", 0.3)];
        assert_eq!(collapse_to_files(&matches, 2).len(), 2);
        assert!(collapse_to_files(&matches, 0).is_empty());
    }

    #[test]
    fn hits_without_file_path_are_ignored() {
        let orphan = ChunkMatch { id: "x".into(), metadata: Metadata::new(), text: String::new(), distance: 0.0 };
        let results = collapse_to_files(&[orphan, hit("/a.txt", 0.5)], 3);
        assert_eq!(results.len(), 1);
    }
}
