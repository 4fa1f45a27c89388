//! Per-file indexing: parse → chunk → embed → upsert, with skips at each gate.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};
use trexa_core::chunking::chunk_text;
use trexa_core::config::absolutize;
use trexa_core::traits::VectorIndex;
use trexa_core::types::{IndexRecord, IndexStatus, MetadataFilter};
use trexa_core::{Error, Result};
use trexa_embed::EmbeddingAdapter;
use trexa_parse::{is_supported, parse_file, ParseOutcome};
use walkdir::WalkDir;

/// Why a file produced no records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    EmptyText,
    ParseFailed(String),
    ChunkMismatch { chunks: usize, embeddings: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    Indexed { chunks: usize },
    Skipped(SkipReason),
}

impl IndexOutcome {
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed { .. })
    }
}

/// Tally of one `index_directory` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryReport {
    pub root: PathBuf,
    pub total_files: usize,
    pub indexed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub chunks: usize,
}

pub struct Indexer {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<EmbeddingAdapter>,
    chunk_size: usize,
}

impl Indexer {
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<EmbeddingAdapter>, chunk_size: usize) -> Self {
        Self { index, embedder, chunk_size: chunk_size.max(1) }
    }

    pub fn index(&self) -> &Arc<dyn VectorIndex> {
        &self.index
    }

    pub async fn initialize(&self) -> Result<()> {
        self.index.initialize().await
    }

    /// Attach to an index persisted by an earlier run. `Ok(false)` when
    /// nothing has been indexed yet; the collection is only created by
    /// indexing.
    pub async fn open_existing(&self) -> Result<bool> {
        self.index.open_existing().await
    }

    /// Index one document.
    ///
    /// Content problems (unreadable file, no text, count mismatch) come back
    /// as [`IndexOutcome::Skipped`].
    ///
    /// # Errors
    /// `NotInitialized` before the index is opened, `NotFound` and
    /// `UnsupportedFormat` from the parser, `Backend` when embedding or the
    /// upsert fails.
    pub async fn index_file(&self, path: &Path) -> Result<IndexOutcome> {
        if !self.index.is_ready().await {
            return Err(Error::NotInitialized);
        }
        let path = absolutize(path);
        info!("Parsing file: {}", path.display());
        let parse_path = path.clone();
        let outcome = tokio::task::spawn_blocking(move || parse_file(&parse_path))
            .await
            .map_err(Error::backend)??;

        let (text, metadata) = match outcome {
            ParseOutcome::Failed { reason, .. } => {
                warn!("Could not extract text from {}. Skipping.", path.display());
                return Ok(IndexOutcome::Skipped(SkipReason::ParseFailed(reason)));
            }
            ParseOutcome::Extracted { text, metadata } => (text, metadata),
        };
        if text.trim().is_empty() {
            warn!("No text content extracted from {}. Skipping.", path.display());
            return Ok(IndexOutcome::Skipped(SkipReason::EmptyText));
        }

        let chunks = chunk_text(&text, self.chunk_size);
        let embedder = self.embedder.clone();
        let to_embed = chunks.clone();
        let vectors = tokio::task::spawn_blocking(move || embedder.embed_chunks(&to_embed))
            .await
            .map_err(Error::backend)?
            .map_err(Error::backend)?;

        if vectors.len() != chunks.len() {
            error!(
                "Mismatch between text chunks ({}) and embeddings ({}) for {}. Skipping.",
                chunks.len(),
                vectors.len(),
                path.display()
            );
            return Ok(IndexOutcome::Skipped(SkipReason::ChunkMismatch {
                chunks: chunks.len(),
                embeddings: vectors.len(),
            }));
        }

        let records: Vec<IndexRecord> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexRecord::for_chunk(&path, chunk, vector, &metadata))
            .collect();
        let count = records.len();
        self.index.upsert(&records).await?;
        info!("Successfully indexed {} chunks for {}.", count, path.display());
        Ok(IndexOutcome::Indexed { chunks: count })
    }

    /// Supported files under `root`, recursively, in path order.
    pub fn supported_files(root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|e| e.file_type().is_file() && is_supported(e.path()))
            .map(walkdir::DirEntry::into_path)
            .collect();
        files.sort();
        files
    }

    pub async fn index_directory(&self, root: &Path) -> Result<DirectoryReport> {
        self.index_directory_with(root, |_, _| {}).await
    }

    /// Index every supported file under `root`, calling `on_file(total, path)`
    /// before each one. A failing file is logged and counted, never fatal.
    ///
    /// # Errors
    /// `NotFound` when `root` is not a directory; initialization failures.
    pub async fn index_directory_with<F>(&self, root: &Path, mut on_file: F) -> Result<DirectoryReport>
    where
        F: FnMut(usize, &Path),
    {
        self.index.initialize().await?;
        let root = absolutize(root);
        if !root.is_dir() {
            error!("Provided path '{}' is not a valid directory.", root.display());
            return Err(Error::NotFound(root));
        }

        info!("Starting to index directory: {}", root.display());
        let files = Self::supported_files(&root);
        let mut report = DirectoryReport { root: root.clone(), total_files: files.len(), ..DirectoryReport::default() };
        for file in &files {
            on_file(files.len(), file);
            match self.index_file(file).await {
                Ok(IndexOutcome::Indexed { chunks }) => {
                    report.indexed += 1;
                    report.chunks += chunks;
                }
                Ok(IndexOutcome::Skipped(_)) => report.skipped += 1,
                Err(e) => {
                    error!("Failed to index file {}: {}", file.display(), e);
                    report.failed += 1;
                }
            }
        }
        info!(
            indexed = report.indexed,
            skipped = report.skipped,
            failed = report.failed,
            chunks = report.chunks,
            "Finished indexing directory: {}",
            root.display()
        );
        Ok(report)
    }

    /// Drop a file's chunks and index it again. `Ok(None)` when the file is gone.
    pub async fn reindex_file(&self, path: &Path) -> Result<Option<IndexOutcome>> {
        let path = absolutize(path);
        if !path.is_file() {
            error!("File not found for re-indexing: {}", path.display());
            return Ok(None);
        }
        info!("Re-indexing file: {}", path.display());
        self.delete_file(&path).await?;
        self.index_file(&path).await.map(Some)
    }

    /// Remove every chunk whose `file_path` is `path`.
    pub async fn delete_file(&self, path: &Path) -> Result<()> {
        if !self.index.is_ready().await {
            error!("Cannot delete: Vector store is not initialized.");
            return Err(Error::NotInitialized);
        }
        let path = absolutize(path);
        info!("Deleting file from index: {}", path.display());
        self.index.delete_where(&MetadataFilter::file_path(&path)).await?;
        Ok(())
    }

    /// Chunk and distinct-file counts, or [`IndexStatus::UNAVAILABLE`].
    pub async fn status(&self) -> IndexStatus {
        if !self.index.is_ready().await {
            error!("Cannot get status: Vector store is not initialized.");
            return IndexStatus::UNAVAILABLE;
        }
        let counts = async {
            let chunks = self.index.count().await?;
            let files = self.index.file_paths().await?;
            Ok::<_, Error>(IndexStatus::new(chunks, files.len()))
        };
        match counts.await {
            Ok(status) => status,
            Err(e) => {
                error!("Failed to retrieve index status: {}", e);
                IndexStatus::UNAVAILABLE
            }
        }
    }

    pub async fn clear_index(&self) -> Result<()> {
        self.index.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn supported_files_are_sorted_and_filtered() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("b/inner");
        fs::create_dir_all(&nested).unwrap();
        fs::write(tmp.path().join("z.txt"), "z").unwrap();
        fs::write(tmp.path().join("a.PDF"), "a").unwrap();
        fs::write(tmp.path().join("image.png"), "x").unwrap();
        fs::write(nested.join("memo.docx"), "d").unwrap();

        let files = Indexer::supported_files(tmp.path());
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b/inner/memo.docx", "z.txt"]);
    }
}
