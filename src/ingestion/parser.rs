//! Multi-format text extraction

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::types::FileFormat;

/// A document with its text extracted
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Detected format
    pub format: FileFormat,
    /// Extracted plain text
    pub content: String,
    /// SHA-256 of the extracted text
    pub content_hash: String,
}

/// Multi-format file parser
pub struct FileParser;

impl FileParser {
    /// Detect the format of `filename`, failing for anything outside the
    /// supported set
    pub fn detect_format(filename: &str) -> Result<FileFormat> {
        FileFormat::from_filename(filename).ok_or_else(|| {
            Error::UnsupportedFormat(format!(
                "'{}' is not a supported format (expected one of: {})",
                filename,
                FileFormat::supported_extensions().join(", ")
            ))
        })
    }

    /// Extract plain text from an uploaded file
    pub fn parse(filename: &str, data: &[u8]) -> Result<ExtractedDocument> {
        let format = Self::detect_format(filename)?;

        let content = match format {
            FileFormat::Pdf => Self::extract_pdf(filename, data)?,
            FileFormat::Docx => Self::extract_docx(filename, data)?,
            FileFormat::Pptx => Self::extract_pptx(filename, data)?,
            FileFormat::Txt => Self::extract_txt(data),
            FileFormat::Csv => Self::extract_csv(filename, data)?,
            FileFormat::Html => Self::extract_html(data),
        };

        Ok(ExtractedDocument {
            format,
            content_hash: hash_content(&content),
            content,
        })
    }

    /// Extract text from a PDF
    fn extract_pdf(filename: &str, data: &[u8]) -> Result<String> {
        let raw = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::extraction(filename, e.to_string()))?;

        // Strip null bytes and collapse the blank-heavy layout output
        let content = raw
            .replace('\0', "")
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        if content.is_empty() {
            return Err(Error::extraction(
                filename,
                "no text content could be extracted (image-based or empty PDF)",
            ));
        }

        Ok(content)
    }

    /// Extract text from a DOCX by walking paragraph runs
    fn extract_docx(filename: &str, data: &[u8]) -> Result<String> {
        let doc = docx_rs::read_docx(data).map_err(|e| Error::extraction(filename, e.to_string()))?;

        let mut content = String::new();
        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
                for child in paragraph.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(text) = child {
                                content.push_str(&text.text);
                            }
                        }
                    }
                }
                content.push('\n');
            }
        }

        Ok(content)
    }

    /// Extract text from a PPTX: slides live at `ppt/slides/slideN.xml`
    /// inside the archive, with text in `<a:t>` elements
    fn extract_pptx(filename: &str, data: &[u8]) -> Result<String> {
        use std::io::Read;

        let cursor = std::io::Cursor::new(data);
        let mut archive =
            zip::ZipArchive::new(cursor).map_err(|e| Error::extraction(filename, e.to_string()))?;

        let mut slide_names: Vec<String> = archive
            .file_names()
            .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
            .map(|s| s.to_string())
            .collect();

        slide_names.sort_by_key(|name| {
            name.trim_start_matches("ppt/slides/slide")
                .trim_end_matches(".xml")
                .parse::<u32>()
                .unwrap_or(0)
        });

        let mut content = String::new();
        for slide_name in slide_names {
            let mut xml = String::new();
            let mut file = archive
                .by_name(&slide_name)
                .map_err(|e| Error::extraction(filename, e.to_string()))?;
            if file.read_to_string(&mut xml).is_err() {
                continue;
            }

            let slide_text = Self::slide_text_from_xml(&xml);
            if !slide_text.is_empty() {
                content.push_str(&slide_text);
                content.push('\n');
            }
        }

        Ok(content)
    }

    /// Pull the `<a:t>` text runs out of one slide's XML
    fn slide_text_from_xml(xml: &str) -> String {
        use quick_xml::events::Event;
        use quick_xml::Reader;

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut parts: Vec<String> = Vec::new();
        let mut in_text_element = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => {
                    in_text_element = true;
                }
                Ok(Event::Text(e)) if in_text_element => {
                    if let Ok(text) = e.unescape() {
                        parts.push(text.into_owned());
                    }
                }
                Ok(Event::End(e)) if e.local_name().as_ref() == b"t" => {
                    in_text_element = false;
                }
                Ok(Event::Eof) | Err(_) => break,
                _ => {}
            }
        }

        parts.join(" ")
    }

    /// Extract text from a plain text file
    fn extract_txt(data: &[u8]) -> String {
        String::from_utf8_lossy(data).into_owned()
    }

    /// Flatten a CSV into readable rows, header first
    fn extract_csv(filename: &str, data: &[u8]) -> Result<String> {
        let mut reader = csv::Reader::from_reader(data);
        let mut content = String::new();

        if let Ok(headers) = reader.headers() {
            content.push_str(&headers.iter().collect::<Vec<_>>().join(" | "));
            content.push('\n');
        }

        for record in reader.records() {
            let record = record.map_err(|e| Error::extraction(filename, e.to_string()))?;
            content.push_str(&record.iter().collect::<Vec<_>>().join(" | "));
            content.push('\n');
        }

        Ok(content)
    }

    /// Extract the visible text of an HTML document
    fn extract_html(data: &[u8]) -> String {
        let html = String::from_utf8_lossy(data);
        let document = scraper::Html::parse_document(&html);

        let body_selector = scraper::Selector::parse("body").expect("static selector");
        let mut content = String::new();

        let root = document.select(&body_selector).next();
        let texts: Vec<&str> = match root {
            Some(body) => body.text().collect(),
            None => document.root_element().text().collect(),
        };

        for text in texts {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                if !content.is_empty() {
                    content.push(' ');
                }
                content.push_str(trimmed);
            }
        }

        content
    }
}

/// Hash extracted content for deduplication and integrity
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension_rejected() {
        let err = FileParser::parse("malware.exe", b"MZ").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
        assert!(err.to_string().contains("malware.exe"));
    }

    #[test]
    fn test_txt_extraction() {
        let parsed = FileParser::parse("notes.txt", b"hello world\n").unwrap();
        assert_eq!(parsed.format, FileFormat::Txt);
        assert_eq!(parsed.content, "hello world\n");
        assert_eq!(parsed.content_hash.len(), 64);
    }

    #[test]
    fn test_csv_extraction_keeps_header_and_rows() {
        let data = b"name,age\nalice,30\nbob,25\n";
        let parsed = FileParser::parse("people.csv", data).unwrap();
        assert_eq!(parsed.format, FileFormat::Csv);
        assert!(parsed.content.starts_with("name | age\n"));
        assert!(parsed.content.contains("alice | 30"));
        assert!(parsed.content.contains("bob | 25"));
    }

    #[test]
    fn test_html_extraction_strips_markup() {
        let data = b"<html><head><title>t</title></head><body><h1>Title</h1><p>Some <b>bold</b> text.</p></body></html>";
        let parsed = FileParser::parse("page.html", data).unwrap();
        assert_eq!(parsed.format, FileFormat::Html);
        assert!(parsed.content.contains("Title"));
        assert!(parsed.content.contains("Some bold text."));
        assert!(!parsed.content.contains("<p>"));
    }

    #[test]
    fn test_same_content_same_hash() {
        let a = FileParser::parse("a.txt", b"identical").unwrap();
        let b = FileParser::parse("b.txt", b"identical").unwrap();
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[test]
    fn test_corrupt_pdf_is_extraction_error() {
        let err = FileParser::parse("broken.pdf", b"not a pdf at all").unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }

    #[test]
    fn test_corrupt_pptx_is_extraction_error() {
        let err = FileParser::parse("deck.pptx", b"not a zip archive").unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
    }
}
