//! DOCX extraction straight from the OOXML package.
//!
//! Paragraph text comes from `word/document.xml`; author, title and creation
//! time from `docProps/core.xml` when the package has one.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::Context;
use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use trexa_core::types::{MetaValue, Metadata};
use zip::ZipArchive;

static PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:p(?:\s[^>]*)?/>|<w:p(?:\s[^>]*)?>(.*?)</w:p>").expect("valid paragraph pattern"));
static PARAGRAPH_PROPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:pPr(?:\s[^>]*)?>.*?</w:pPr>").expect("valid pPr pattern"));
static RUN_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:(tab|br|cr)(?:\s[^>]*)?/>").expect("valid run pattern")
});
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);").expect("valid entity pattern"));
static NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").expect("valid newline pattern"));
static CREATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<dc:creator(?:\s[^>]*)?>([^<]*)</dc:creator>").expect("valid creator pattern"));
static CREATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<dcterms:created(?:\s[^>]*)?>([^<]*)</dcterms:created>").expect("valid created pattern"));
static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<dc:title(?:\s[^>]*)?>([^<]*)</dc:title>").expect("valid title pattern"));

pub(crate) fn extract(path: &Path, metadata: &mut Metadata) -> anyhow::Result<String> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).with_context(|| format!("opening {} as a zip package", path.display()))?;

    let core = read_entry(&mut archive, "docProps/core.xml").ok();
    let core = core.as_deref().unwrap_or_default();
    metadata.insert("docx_author".to_string(), MetaValue::from(core_property(core, &CREATOR)));
    let created = core_property(core, &CREATED).map(|raw| match DateTime::parse_from_rfc3339(&raw) {
        Ok(ts) => ts.to_rfc3339(),
        Err(_) => raw,
    });
    metadata.insert("docx_created".to_string(), MetaValue::from(created));
    metadata.insert("docx_title".to_string(), MetaValue::from(core_property(core, &TITLE)));

    let document = read_entry(&mut archive, "word/document.xml").context("reading word/document.xml")?;
    Ok(document_text(&document))
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> anyhow::Result<String> {
    let mut entry = archive.by_name(name)?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Paragraph texts joined by newline, newline runs collapsed, trimmed.
pub(crate) fn document_text(xml: &str) -> String {
    let paragraphs: Vec<String> = PARAGRAPH
        .captures_iter(xml)
        .map(|cap| cap.get(1).map(|body| paragraph_text(body.as_str())).unwrap_or_default())
        .collect();
    let joined = paragraphs.join("\n");
    NEWLINES.replace_all(&joined, "\n").trim().to_string()
}

fn paragraph_text(body: &str) -> String {
    let body = PARAGRAPH_PROPS.replace_all(body, "");
    let mut text = String::new();
    for cap in RUN_CONTENT.captures_iter(&body) {
        if let Some(t) = cap.get(1) {
            text.push_str(&unescape(t.as_str()));
        } else if let Some(tag) = cap.get(2) {
            text.push(if tag.as_str() == "tab" { '\t' } else { '\n' });
        }
    }
    text
}

fn core_property(xml: &str, pattern: &Regex) -> Option<String> {
    pattern.captures(xml).map(|cap| unescape(&cap[1]).trim().to_string())
}

fn unescape(s: &str) -> String {
    ENTITY
        .replace_all(s, |cap: &Captures| match &cap[1] {
            "amp" => "&".to_string(),
            "lt" => "<".to_string(),
            "gt" => ">".to_string(),
            "quot" => "\"".to_string(),
            "apos" => "'".to_string(),
            num => {
                let code = match num.strip_prefix("#x") {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => num[1..].parse().ok(),
                };
                code.and_then(char::from_u32).map(String::from).unwrap_or_default()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_join_and_collapse_blank_lines() {
        let xml = r#"<w:document><w:body>
            <w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:p>
            <w:p/>
            <w:p w:rsidR="00AB"></w:p>
            <w:p><w:r><w:t>A&amp;B</w:t><w:tab/><w:t>&#x41;</w:t></w:r></w:p>
        </w:body></w:document>"#;
        assert_eq!(document_text(xml), "Hello world\nA&B\tA");
    }

    #[test]
    fn core_properties_are_read_by_tag() {
        let xml = r#"<cp:coreProperties><dc:title>Plan &quot;B&quot;</dc:title><dc:creator>Grace</dc:creator>
            <dcterms:created xsi:type="dcterms:W3CDTF">2024-03-01T10:00:00Z</dcterms:created></cp:coreProperties>"#;
        assert_eq!(core_property(xml, &TITLE).as_deref(), Some("Plan \"B\""));
        assert_eq!(core_property(xml, &CREATOR).as_deref(), Some("Grace"));
        assert_eq!(core_property(xml, &CREATED).as_deref(), Some("2024-03-01T10:00:00Z"));
        assert_eq!(core_property("<cp:coreProperties/>", &TITLE), None);
    }
}
