//! Text extraction from uploaded study material (PDF, TXT, DOCX).
//!
//! Extraction runs on the uploaded bytes directly; nothing is written to
//! disk. DOCX is a ZIP archive whose `word/document.xml` carries the text in
//! `w:t` runs.

use anyhow::{Context, Result, anyhow};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Extracts plain text from an uploaded file, dispatching on the extension.
pub fn extract_text(filename: &str, content: &[u8]) -> Result<String> {
    let extension = filename
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_lowercase();

    match extension.as_str() {
        "pdf" => extract_pdf(content),
        "txt" => Ok(extract_txt(content)),
        "docx" => extract_docx(content),
        _ => Err(anyhow!(
            "Unsupported file type. Please upload PDF, TXT, or DOCX files."
        )),
    }
}

fn extract_pdf(content: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(content)
        .map_err(|e| anyhow!("Error reading PDF: {}", e))
}

/// UTF-8 with a latin-1 fallback for legacy exports.
fn extract_txt(content: &[u8]) -> String {
    match std::str::from_utf8(content) {
        Ok(text) => text.to_string(),
        Err(_) => content.iter().map(|&b| b as char).collect(),
    }
}

fn extract_docx(content: &[u8]) -> Result<String> {
    let mut archive =
        ZipArchive::new(Cursor::new(content)).map_err(|e| anyhow!("Error reading DOCX file: {}", e))?;
    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("DOCX archive is missing word/document.xml")?
        .read_to_string(&mut document_xml)
        .context("Failed to read word/document.xml")?;

    let mut reader = Reader::from_str(&document_xml);
    let mut text = String::new();
    let mut in_text_run = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(ref e)) if e.name().as_ref() == b"w:t" => in_text_run = false,
            // Paragraph boundaries become newlines.
            Ok(Event::End(ref e)) if e.name().as_ref() == b"w:p" => text.push('\n'),
            Ok(Event::Text(t)) if in_text_run => {
                text.push_str(&t.unescape().context("Invalid XML text in DOCX")?);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(anyhow!("Error reading DOCX file: {}", e)),
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::{SimpleFileOptions, ZipWriter};

    #[test]
    fn txt_decodes_utf8() {
        let text = extract_text("notes.txt", "Photosynthesis 101".as_bytes()).unwrap();
        assert_eq!(text, "Photosynthesis 101");
    }

    #[test]
    fn txt_falls_back_to_latin1() {
        let bytes = b"caf\xe9 au lait";
        let text = extract_text("menu.TXT", bytes).unwrap();
        assert_eq!(text, "café au lait");
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = extract_text("slides.pptx", b"irrelevant").unwrap_err();
        assert!(err.to_string().contains("Unsupported file type"));
    }

    #[test]
    fn docx_text_runs_are_extracted_with_paragraph_breaks() {
        let xml = r#"<?xml version="1.0"?>
            <w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
              <w:body>
                <w:p><w:r><w:t>The water cycle</w:t></w:r></w:p>
                <w:p><w:r><w:t>Evaporation &amp; condensation</w:t></w:r></w:p>
              </w:body>
            </w:document>"#;

        let mut buffer = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(&mut buffer);
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap();
        let bytes = buffer.into_inner();

        let text = extract_text("cycle.docx", &bytes).unwrap();
        assert_eq!(text, "The water cycle\nEvaporation & condensation\n");
    }

    #[test]
    fn corrupt_docx_is_an_error() {
        let err = extract_text("broken.docx", b"not a zip").unwrap_err();
        assert!(err.to_string().contains("Error reading DOCX file"));
    }
}
