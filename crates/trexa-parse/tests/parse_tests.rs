use std::fs;
use std::io::Write;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;
use trexa_core::types::MetaValue;
use trexa_core::Error;
use trexa_parse::{parse_file, ParseOutcome};

fn write_docx(path: &Path, document_xml: &str, core_xml: Option<&str>) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(document_xml.as_bytes()).unwrap();
    if let Some(core) = core_xml {
        zip.start_file("docProps/core.xml", options).unwrap();
        zip.write_all(core.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn write_pdf(path: &Path, author: &str, title: &str) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![100.into(), 600.into()]),
            Operation::new("Tj", vec![Object::string_literal("Hello World")]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Author" => Object::string_literal(author),
        "Title" => Object::string_literal(title),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.save(path).unwrap();
}

#[test]
fn missing_file_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let err = parse_file(&tmp.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn unknown_extension_is_unsupported() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("doc.xyz");
    fs::write(&path, "whatever").unwrap();
    match parse_file(&path) {
        Err(Error::UnsupportedFormat(ext)) => assert_eq!(ext, ".xyz"),
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
}

#[test]
fn txt_is_read_verbatim_with_file_metadata() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("notes.txt");
    fs::write(&path, "  line one\n\nline two\t\n").unwrap();

    let outcome = parse_file(&path).unwrap();
    assert_eq!(outcome.text(), "  line one\n\nline two\t\n");
    let meta = outcome.metadata();
    assert_eq!(meta.get("file_name"), Some(&MetaValue::from("notes.txt")));
    assert_eq!(meta.get("file_size_bytes"), Some(&MetaValue::Int(22)));
    let recorded = meta.get("file_path").and_then(MetaValue::as_str).unwrap();
    assert!(Path::new(recorded).is_absolute());
    assert!(meta.get("last_modified").and_then(MetaValue::as_str).is_some());
}

#[test]
fn invalid_utf8_txt_fails_softly_and_keeps_metadata() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("binary.txt");
    fs::write(&path, [0xff, 0xfe, 0x00, 0xc3, 0x28]).unwrap();

    let outcome = parse_file(&path).unwrap();
    assert!(outcome.is_failed());
    assert_eq!(outcome.text(), "");
    assert_eq!(outcome.metadata().get("file_name"), Some(&MetaValue::from("binary.txt")));
}

#[test]
fn docx_paragraphs_and_core_properties() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("report.docx");
    let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:t>First paragraph</w:t></w:r></w:p>
<w:p/><w:p/>
<w:p><w:r><w:t>Second</w:t></w:r><w:r><w:t xml:space="preserve"> paragraph</w:t></w:r></w:p>
</w:body></w:document>"#;
    let core = r#"<cp:coreProperties><dc:title>Quarterly</dc:title><dc:creator>Ada</dc:creator>
<dcterms:created xsi:type="dcterms:W3CDTF">2023-05-04T12:00:00Z</dcterms:created></cp:coreProperties>"#;
    write_docx(&path, body, Some(core));

    let outcome = parse_file(&path).unwrap();
    assert_eq!(outcome.text(), "First paragraph\nSecond paragraph");
    let meta = outcome.metadata();
    assert_eq!(meta.get("docx_author"), Some(&MetaValue::from("Ada")));
    assert_eq!(meta.get("docx_title"), Some(&MetaValue::from("Quarterly")));
    assert_eq!(meta.get("docx_created"), Some(&MetaValue::from("2023-05-04T12:00:00+00:00")));
}

#[test]
fn docx_without_core_properties_records_nulls() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bare.docx");
    write_docx(&path, "<w:document><w:body><w:p><w:r><w:t>x</w:t></w:r></w:p></w:body></w:document>", None);

    let outcome = parse_file(&path).unwrap();
    assert_eq!(outcome.text(), "x");
    assert!(outcome.metadata().get("docx_author").is_some_and(MetaValue::is_null));
}

#[test]
fn corrupt_docx_fails_softly() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.docx");
    fs::write(&path, "not a zip archive").unwrap();

    let outcome = parse_file(&path).unwrap();
    assert!(matches!(outcome, ParseOutcome::Failed { .. }));
    assert_eq!(outcome.metadata().get("file_name"), Some(&MetaValue::from("broken.docx")));
}

#[test]
fn pdf_document_info_is_captured() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("paper.pdf");
    write_pdf(&path, "Grace Hopper", "Compilers");

    let outcome = parse_file(&path).unwrap();
    assert!(matches!(outcome, ParseOutcome::Extracted { .. }));
    let meta = outcome.metadata();
    assert_eq!(meta.get("pdf_author"), Some(&MetaValue::from("Grace Hopper")));
    assert_eq!(meta.get("pdf_title"), Some(&MetaValue::from("Compilers")));
    assert!(meta.get("pdf_creation_date").is_some_and(MetaValue::is_null));
    assert_eq!(meta.get("page_count"), Some(&MetaValue::Int(1)));
}

#[test]
fn corrupt_pdf_fails_softly() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.pdf");
    fs::write(&path, "%PDF-1.4 truncated garbage").unwrap();

    let outcome = parse_file(&path).unwrap();
    assert!(outcome.is_failed());
    assert_eq!(outcome.text(), "");
    assert!(outcome.metadata().contains_key("file_size_bytes"));
}
