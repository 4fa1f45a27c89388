//! PDF text and document-info extraction via lopdf.

use std::path::Path;

use anyhow::Context;
use lopdf::{Dictionary, Document, Object};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use trexa_core::types::{MetaValue, Metadata};

static BULLETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{2022}\u{25CF}\u{25CB}\u{25AA}]\s*").expect("valid bullet pattern"));

/// Remove bullet glyphs (•, ●, ○, ▪) and the whitespace that follows them.
pub fn strip_bullets(text: &str) -> String {
    BULLETS.replace_all(text, "").into_owned()
}

/// Fill PDF metadata first, then concatenate page text in page order.
pub(crate) fn extract(path: &Path, metadata: &mut Metadata) -> anyhow::Result<String> {
    let doc = Document::load(path).with_context(|| format!("loading PDF {}", path.display()))?;
    let pages = doc.get_pages();

    let info = info_dictionary(&doc);
    let fields: [(&str, &[u8]); 3] = [
        ("pdf_author", b"Author"),
        ("pdf_title", b"Title"),
        ("pdf_creation_date", b"CreationDate"),
    ];
    for (key, field) in fields {
        let value = info.and_then(|d| info_string(d, field));
        metadata.insert(key.to_string(), MetaValue::from(value));
    }
    metadata.insert("page_count".to_string(), pages.len().into());

    let mut text = String::new();
    for page_number in pages.keys() {
        let page_text = doc
            .extract_text(&[*page_number])
            .with_context(|| format!("extracting text of page {page_number}"))?;
        text.push_str(&page_text);
    }
    debug!(pages = pages.len(), "extracted PDF text");
    Ok(strip_bullets(&text))
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn info_string(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE when it carries a BOM, otherwise bytes
/// are read as Latin-1 (close enough to PDFDocEncoding for info fields).
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest.chunks_exact(2).map(|p| u16::from_be_bytes([p[0], p[1]])).collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullets_and_trailing_space_are_removed() {
        let text = "\u{2022} first\n\u{25CF}  second\n\u{25CB}third \u{25AA}\tfourth - kept";
        assert_eq!(strip_bullets(text), "first\nsecond\nthird fourth - kept");
    }

    #[test]
    fn utf16_info_strings_decode() {
        let bytes = [0xFE, 0xFF, 0x00, b'A', 0x00, b'd', 0x00, b'a'];
        assert_eq!(decode_pdf_string(&bytes), "Ada");
        assert_eq!(decode_pdf_string(b"D:20240101"), "D:20240101");
    }
}
