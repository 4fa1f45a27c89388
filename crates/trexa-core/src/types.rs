//! Domain types shared by the parser, embedder, index and search layers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

pub type ChunkId = String;

/// Flat, string-keyed metadata attached to documents and index records.
pub type Metadata = BTreeMap<String, MetaValue>;

pub const FILE_PATH_KEY: &str = "file_path";
pub const FILE_NAME_KEY: &str = "file_name";
pub const CHUNK_INDEX_KEY: &str = "chunk_index";

const CHUNK_ID_SEPARATOR: &str = "::";

/// A scalar metadata value. Absent document properties are `Null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
}

impl MetaValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for MetaValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<usize> for MetaValue {
    fn from(i: usize) -> Self {
        Self::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<u64> for MetaValue {
    fn from(i: u64) -> Self {
        Self::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for MetaValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl<T: Into<MetaValue>> From<Option<T>> for MetaValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Build the stable record id `<document_path>::<chunk_index>`.
pub fn chunk_id(document_path: &str, chunk_index: usize) -> ChunkId {
    format!("{document_path}{CHUNK_ID_SEPARATOR}{chunk_index}")
}

/// Split a chunk id back into its document path and chunk index.
///
/// Paths may themselves contain `::`, so the split happens at the last one.
pub fn parse_chunk_id(id: &str) -> Option<(&str, usize)> {
    let (path, index) = id.rsplit_once(CHUNK_ID_SEPARATOR)?;
    Some((path, index.parse().ok()?))
}

/// A contiguous word-span of a document's extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

/// The unit persisted in the vector index: one per chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: ChunkId,
    pub vector: Vec<f32>,
    pub metadata: Metadata,
    pub text: String,
}

impl IndexRecord {
    /// Assemble the record for one chunk of `document_path`.
    ///
    /// The document-level metadata is copied and extended with
    /// `chunk_index`, `file_path` and `file_name`.
    pub fn for_chunk(document_path: &Path, chunk: Chunk, vector: Vec<f32>, document_meta: &Metadata) -> Self {
        let path = document_path.to_string_lossy().to_string();
        let name = document_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.clone());
        let mut metadata = document_meta.clone();
        metadata.insert(CHUNK_INDEX_KEY.to_string(), chunk.index.into());
        metadata.insert(FILE_PATH_KEY.to_string(), path.clone().into());
        metadata.insert(FILE_NAME_KEY.to_string(), name.into());
        Self { id: chunk_id(&path, chunk.index), vector, metadata, text: chunk.text }
    }

    pub fn file_path(&self) -> Option<&str> {
        self.metadata.get(FILE_PATH_KEY).and_then(MetaValue::as_str)
    }
}

/// One nearest-neighbour hit returned by a vector index.
#[derive(Debug, Clone)]
pub struct ChunkMatch {
    pub id: ChunkId,
    pub metadata: Metadata,
    pub text: String,
    /// Cosine distance, `1 - cosine_similarity`; lower is closer.
    pub distance: f32,
}

impl ChunkMatch {
    pub fn file_path(&self) -> Option<&str> {
        self.metadata.get(FILE_PATH_KEY).and_then(MetaValue::as_str)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.metadata.get(FILE_NAME_KEY).and_then(MetaValue::as_str)
    }
}

/// Equality filter over one metadata key, used for bulk deletes.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataFilter {
    pub key: String,
    pub value: MetaValue,
}

impl MetadataFilter {
    pub fn eq(key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    /// All chunks of one document.
    pub fn file_path(path: &Path) -> Self {
        Self::eq(FILE_PATH_KEY, path.to_string_lossy().to_string())
    }

    pub fn matches(&self, metadata: &Metadata) -> bool {
        metadata.get(&self.key).is_some_and(|v| *v == self.value)
    }
}

/// A ranked, de-duplicated file hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub file_path: String,
    pub file_name: String,
    /// `1 - distance` of the file's best chunk; higher is more similar.
    pub score: f32,
}

/// Counts reported by the orchestrator.
///
/// An index that is not initialized, or whose counts could not be read,
/// reports [`IndexStatus::UNAVAILABLE`] so callers can tell it apart from an
/// empty index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStatus {
    pub total_chunks: i64,
    pub total_files: i64,
}

impl IndexStatus {
    pub const UNAVAILABLE: Self = Self { total_chunks: -1, total_files: -1 };

    pub fn new(total_chunks: usize, total_files: usize) -> Self {
        Self {
            total_chunks: i64::try_from(total_chunks).unwrap_or(i64::MAX),
            total_files: i64::try_from(total_files).unwrap_or(i64::MAX),
        }
    }

    pub fn is_available(&self) -> bool {
        self.total_chunks >= 0 && self.total_files >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn chunk_id_round_trips_paths_containing_separator() {
        let id = chunk_id("/data/a::b/report.txt", 7);
        assert_eq!(id, "/data/a::b/report.txt::7");
        assert_eq!(parse_chunk_id(&id), Some(("/data/a::b/report.txt", 7)));
        assert_eq!(parse_chunk_id("no-separator"), None);
        assert_eq!(parse_chunk_id("/x.txt::abc"), None);
    }

    #[test]
    fn record_metadata_extends_document_metadata() {
        let mut doc_meta = Metadata::new();
        doc_meta.insert("pdf_author".into(), MetaValue::Null);
        doc_meta.insert("page_count".into(), 3i64.into());
        let path = PathBuf::from("/docs/notes.pdf");
        let rec = IndexRecord::for_chunk(&path, Chunk { index: 2, text: "body".into() }, vec![1.0], &doc_meta);

        assert_eq!(rec.id, "/docs/notes.pdf::2");
        assert_eq!(rec.file_path(), Some("/docs/notes.pdf"));
        assert_eq!(rec.metadata.get(FILE_NAME_KEY), Some(&MetaValue::from("notes.pdf")));
        assert_eq!(rec.metadata.get(CHUNK_INDEX_KEY), Some(&MetaValue::Int(2)));
        assert_eq!(rec.metadata.get("page_count"), Some(&MetaValue::Int(3)));
        assert!(rec.metadata.get("pdf_author").is_some_and(MetaValue::is_null));
    }

    #[test]
    fn filter_matches_exact_value_only() {
        let mut meta = Metadata::new();
        meta.insert(FILE_PATH_KEY.into(), "/a.txt".into());
        assert!(MetadataFilter::file_path(Path::new("/a.txt")).matches(&meta));
        assert!(!MetadataFilter::file_path(Path::new("/b.txt")).matches(&meta));
        assert!(!MetadataFilter::eq("missing", "x").matches(&meta));
    }

    #[test]
    fn meta_values_serialize_untagged() {
        let mut meta = Metadata::new();
        meta.insert("a".into(), MetaValue::Null);
        meta.insert("b".into(), 4i64.into());
        meta.insert("c".into(), "x".into());
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"a":null,"b":4,"c":"x"}"#);
        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn unavailable_status_differs_from_empty() {
        assert!(!IndexStatus::UNAVAILABLE.is_available());
        assert!(IndexStatus::new(0, 0).is_available());
        assert_ne!(IndexStatus::new(0, 0), IndexStatus::UNAVAILABLE);
    }
}
