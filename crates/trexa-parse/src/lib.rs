//! trexa-parse
//!
//! Extracts raw text and metadata from a single PDF, DOCX or TXT file.
//!
//! Missing files and unsupported extensions are errors. Anything that goes
//! wrong while reading the content is not: it comes back as
//! [`ParseOutcome::Failed`] carrying whatever metadata was collected first.

mod docx;
mod pdf;
mod text;

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use tracing::{debug, error};
use trexa_core::types::{MetaValue, Metadata, FILE_NAME_KEY, FILE_PATH_KEY};
use trexa_core::{Error, Result};

pub use pdf::strip_bullets;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
}

impl DocumentKind {
    /// Kind for `path` judged by its (case-insensitive) extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }
}

pub fn is_supported(path: &Path) -> bool {
    DocumentKind::from_path(path).is_some()
}

/// Result of reading one document's content.
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Extracted { text: String, metadata: Metadata },
    Failed { reason: String, metadata: Metadata },
}

impl ParseOutcome {
    /// Extracted text; a failed parse reads as empty.
    pub fn text(&self) -> &str {
        match self {
            Self::Extracted { text, .. } => text,
            Self::Failed { .. } => "",
        }
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            Self::Extracted { metadata, .. } | Self::Failed { metadata, .. } => metadata,
        }
    }

    pub fn into_parts(self) -> (String, Metadata) {
        match self {
            Self::Extracted { text, metadata } => (text, metadata),
            Self::Failed { metadata, .. } => (String::new(), metadata),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Parse `path` into text and metadata.
///
/// # Errors
/// `Error::NotFound` if `path` does not exist, `Error::UnsupportedFormat` for
/// any extension other than pdf, docx and txt.
pub fn parse_file(path: &Path) -> Result<ParseOutcome> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    let Some(kind) = DocumentKind::from_path(path) else {
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        return Err(Error::UnsupportedFormat(ext));
    };

    let mut metadata = Metadata::new();
    let extracted = file_metadata(path, &mut metadata).and_then(|()| match kind {
        DocumentKind::Pdf => pdf::extract(path, &mut metadata),
        DocumentKind::Docx => docx::extract(path, &mut metadata),
        DocumentKind::Txt => text::extract(path),
    });

    match extracted {
        Ok(text) => {
            debug!(path = %path.display(), chars = text.len(), "parsed document");
            Ok(ParseOutcome::Extracted { text, metadata })
        }
        Err(e) => {
            let reason = format!("{e:#}");
            error!("An error occurred while processing '{}': {}", path.display(), reason);
            Ok(ParseOutcome::Failed { reason, metadata })
        }
    }
}

fn file_metadata(path: &Path, metadata: &mut Metadata) -> anyhow::Result<()> {
    let abs = fs::canonicalize(path)?;
    let stat = fs::metadata(path)?;
    let name = path.file_name().map(|n| n.to_string_lossy().to_string());
    metadata.insert(FILE_NAME_KEY.to_string(), name.into());
    metadata.insert(FILE_PATH_KEY.to_string(), abs.to_string_lossy().to_string().into());
    metadata.insert("file_size_bytes".to_string(), stat.len().into());
    let modified = stat.modified().ok().map(|t| DateTime::<Local>::from(t).to_rfc3339());
    metadata.insert("last_modified".to_string(), MetaValue::from(modified));
    Ok(())
}
