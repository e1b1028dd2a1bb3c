//! Document and chunk types with provenance for citations

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Supported upload formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Microsoft PowerPoint presentation (.pptx)
    Pptx,
    /// Plain text file
    Txt,
    /// CSV file
    Csv,
    /// HTML document
    Html,
}

impl FileFormat {
    /// Detect the format from a filename, falling back to the guessed MIME
    /// type when the extension alone is not conclusive.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        if let Some(format) = ext.as_deref().and_then(Self::from_extension) {
            return Some(format);
        }

        let mime = mime_guess::from_path(filename).first()?;
        Self::from_mime(mime.essence_str())
    }

    /// Detect the format from a bare extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "pptx" => Some(Self::Pptx),
            "txt" | "text" => Some(Self::Txt),
            "csv" => Some(Self::Csv),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    /// Detect the format from a MIME essence string
    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(Self::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(Self::Docx)
            }
            "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
                Some(Self::Pptx)
            }
            "text/plain" => Some(Self::Txt),
            "text/csv" => Some(Self::Csv),
            "text/html" => Some(Self::Html),
            _ => None,
        }
    }

    /// Extension used for saved uploads
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Pptx => "pptx",
            Self::Txt => "txt",
            Self::Csv => "csv",
            Self::Html => "html",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Pptx => "PowerPoint (.pptx)",
            Self::Txt => "Text File",
            Self::Csv => "CSV",
            Self::Html => "HTML",
        }
    }

    /// Extensions accepted by the upload endpoint, for error messages
    pub fn supported_extensions() -> &'static [&'static str] {
        &["pdf", "docx", "pptx", "txt", "csv", "html"]
    }
}

/// A document that has been uploaded and ingested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Original filename as uploaded
    pub filename: String,
    /// Detected format
    pub format: FileFormat,
    /// SHA-256 of the extracted text
    pub content_hash: String,
    /// Extracted full text
    pub text: String,
    /// Upload size in bytes
    pub file_size: u64,
    /// Number of chunks created from this document
    pub total_chunks: u32,
    /// Upload timestamp
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    /// Create a new document record
    pub fn new(
        filename: String,
        format: FileFormat,
        content_hash: String,
        text: String,
        file_size: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            format,
            content_hash,
            text,
            file_size,
            total_chunks: 0,
            uploaded_at: chrono::Utc::now(),
        }
    }
}

/// Structured metadata carried with every chunk
///
/// Known fields cover citation needs; `extra` is the open-ended mapping for
/// source-format specifics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// Original filename, used in citations
    pub filename: String,
    /// Source format
    pub format: FileFormat,
    /// Chunk index within the document
    pub chunk_index: u32,
    /// Character offset range in the extracted text
    pub char_start: usize,
    pub char_end: usize,
    /// Open-ended extension map
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

/// A chunk of text from a document, the unit of retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Globally unique chunk ID embedding document provenance
    /// (`"{document_id}:{chunk_index}"`)
    pub id: String,
    /// Parent document ID
    pub document_id: Uuid,
    /// Text content
    pub content: String,
    /// Chunk index within the document (0-based, sequential)
    pub chunk_index: u32,
    /// Character offsets into the extracted document text
    pub char_start: usize,
    pub char_end: usize,
    /// Citation metadata
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Chunk ID for a (document, index) pair
    pub fn id_for(document_id: &Uuid, chunk_index: u32) -> String {
        format!("{}:{}", document_id, chunk_index)
    }

    /// Create a new chunk belonging to `doc`
    pub fn new(
        doc: &Document,
        content: String,
        chunk_index: u32,
        char_start: usize,
        char_end: usize,
    ) -> Self {
        Self {
            id: Self::id_for(&doc.id, chunk_index),
            document_id: doc.id,
            content,
            chunk_index,
            char_start,
            char_end,
            metadata: ChunkMetadata {
                filename: doc.filename.clone(),
                format: doc.format,
                chunk_index,
                char_start,
                char_end,
                extra: HashMap::new(),
            },
        }
    }
}
