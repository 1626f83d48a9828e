//! Plain-text extraction from uploaded documents.

use regex::Regex;
use std::io::{Cursor, Read};
use std::sync::LazyLock;

use crate::error::{IntegrationError, Result};

static PARAGRAPH_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</w:p>|<w:br\s*/>|<w:tab\s*/>").expect("paragraph end pattern"));

static XML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("xml tag pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(Self::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(Self::Docx)
            }
            "text/plain" => Some(Self::Txt),
            _ => None,
        }
    }
}

pub fn extract_text(format: DocumentFormat, bytes: &[u8]) -> Result<String> {
    match format {
        DocumentFormat::Txt => Ok(String::from_utf8_lossy(bytes).into_owned()),
        DocumentFormat::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| IntegrationError::Extraction(format!("pdf: {}", e))),
        DocumentFormat::Docx => extract_docx(bytes),
    }
}

/// First `max_chars` characters, trimmed
pub fn preview(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect()
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Text runs of `word/document.xml`, one line per paragraph
fn extract_docx(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| IntegrationError::Extraction(format!("docx: {}", e)))?;
    let mut document = archive
        .by_name("word/document.xml")
        .map_err(|e| IntegrationError::Extraction(format!("docx: {}", e)))?;

    let mut xml = String::new();
    document
        .read_to_string(&mut xml)
        .map_err(|e| IntegrationError::Extraction(format!("docx: {}", e)))?;

    let with_breaks = PARAGRAPH_END.replace_all(&xml, "\n");
    let text = XML_TAG.replace_all(&with_breaks, "");
    Ok(unescape_xml(text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn docx_with(document_xml: &str) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buffer);
            zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(document_xml.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn test_txt_passthrough() {
        let text = extract_text(DocumentFormat::Txt, "plain notes".as_bytes()).unwrap();
        assert_eq!(text, "plain notes");
    }

    #[test]
    fn test_docx_paragraphs() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>Rust &amp; tweets</w:t></w:r></w:p><w:p><w:r><w:t>Second</w:t></w:r></w:p></w:body></w:document>"#;
        let text = extract_text(DocumentFormat::Docx, &docx_with(xml)).unwrap();
        assert_eq!(text, "Rust & tweets\nSecond");
    }

    #[test]
    fn test_docx_rejects_garbage() {
        assert!(extract_text(DocumentFormat::Docx, b"not a zip").is_err());
    }

    #[test]
    fn test_preview_counts_chars() {
        assert_eq!(preview("  héllo world  ", 5), "héllo");
        assert_eq!(preview("short", 100), "short");
    }

    #[test]
    fn test_mime_mapping() {
        assert_eq!(DocumentFormat::from_mime("application/pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_mime("text/plain"), Some(DocumentFormat::Txt));
        assert_eq!(DocumentFormat::from_mime("image/png"), None);
    }
}
