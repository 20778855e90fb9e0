//! Document text extraction for uploaded CVs and job descriptions.
//!
//! PDF goes through `pdf-extract`, DOCX through the `docx-rs` reader (one line
//! per paragraph). Every other upload is decoded as UTF-8 with invalid bytes
//! dropped.

use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Could not read PDF '{file_name}': {reason}")]
    Pdf { file_name: String, reason: String },

    #[error("Could not read DOCX '{file_name}': {reason}")]
    Docx { file_name: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Classifies by file extension, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => DocumentKind::Pdf,
            "docx" | "doc" => DocumentKind::Docx,
            _ => DocumentKind::PlainText,
        }
    }
}

/// Extracts the text content of an uploaded document.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, DocumentError> {
    let kind = DocumentKind::from_file_name(file_name);
    debug!("Extracting {:?} text from '{}' ({} bytes)", kind, file_name, bytes.len());

    match kind {
        DocumentKind::Pdf => {
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| DocumentError::Pdf {
                file_name: file_name.to_string(),
                reason: e.to_string(),
            })
        }
        DocumentKind::Docx => extract_docx_text(bytes).map_err(|reason| DocumentError::Docx {
            file_name: file_name.to_string(),
            reason,
        }),
        DocumentKind::PlainText => Ok(decode_utf8_lossy_dropping(bytes)),
    }
}

fn extract_docx_text(bytes: &[u8]) -> Result<String, String> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| e.to_string())?;

    let lines: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(
                paragraph
                    .children
                    .iter()
                    .filter_map(|pc| match pc {
                        ParagraphChild::Run(run) => Some(run_text(run)),
                        _ => None,
                    })
                    .collect::<String>(),
            ),
            _ => None,
        })
        .collect();

    Ok(lines.join("\n"))
}

fn run_text(run: &docx_rs::Run) -> String {
    run.children
        .iter()
        .filter_map(|rc| match rc {
            RunChild::Text(text) => Some(text.text.as_str()),
            RunChild::Tab(_) => Some("\t"),
            _ => None,
        })
        .collect()
}

/// UTF-8 decoding that skips invalid byte sequences instead of replacing them.
pub fn decode_utf8_lossy_dropping(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}
