use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file type: '{0}'. Only .pdf, .docx, and .txt are supported")]
    UnsupportedFormat(String),

    #[error("Vector index has not been initialized")]
    NotInitialized,

    #[error("Failed to parse {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Chunk/embedding count mismatch: {chunks} chunks vs {embeddings} embeddings")]
    ChunkMismatch { chunks: usize, embeddings: usize },

    #[error("Backend failure: {0}")]
    Backend(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a storage or model error, keeping its full context chain.
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(format!("{err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
