//! trexa-index
//!
//! The write path ([`Indexer`]: parse, chunk, embed, upsert) and the read
//! path ([`SearchService`]: embed query, nearest chunks, one hit per file)
//! over a shared [`VectorIndex`](trexa_core::traits::VectorIndex).

pub mod indexer;
pub mod search;

use std::sync::Arc;

use trexa_core::config::Settings;
use trexa_core::traits::VectorIndex;
use trexa_embed::EmbeddingAdapter;
use trexa_vector::LanceIndex;

pub use indexer::{DirectoryReport, IndexOutcome, Indexer, SkipReason};
pub use search::{collapse_to_files, SearchService};

/// Indexer and search service sharing one index and one embedder.
pub struct Pipeline {
    pub indexer: Indexer,
    pub search: SearchService,
}

impl Pipeline {
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<EmbeddingAdapter>, settings: &Settings) -> Self {
        Self {
            indexer: Indexer::new(index.clone(), embedder.clone(), settings.embedding.chunk_size),
            search: SearchService::new(index, embedder, settings.search.clone()),
        }
    }

    /// Pipeline over the configured LanceDB directory and embedding model.
    ///
    /// # Errors
    /// Fails when the embedding model cannot be loaded.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let embedder = Arc::new(trexa_embed::default_adapter(&settings.embedding)?);
        let index: Arc<dyn VectorIndex> =
            Arc::new(LanceIndex::new(&settings.index_dir(), &settings.data.table_name, embedder.dim()));
        Ok(Self::new(index, embedder, settings))
    }
}
