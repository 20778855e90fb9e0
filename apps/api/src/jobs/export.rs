//! Document export for generated CVs and cover letters.
//!
//! DOCX: one paragraph per input line. PDF: A4, Helvetica, naive fixed-width
//! wrapping at 95 characters per line. No typographic layout is attempted.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use thiserror::Error;
use tracing::debug;

/// Characters per PDF line before a hard wrap.
pub const PDF_WRAP_CHARS: usize = 95;

// ────────────────────────────────────────────────────────────────────────────
// Page geometry (points). A4 = 595 × 842.
// ────────────────────────────────────────────────────────────────────────────

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const FONT_SIZE: i64 = 10;
const LEADING: i64 = 12;
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("DOCX export failed: {0}")]
    Docx(String),

    #[error("PDF export failed: {0}")]
    Pdf(String),
}

/// Output formats offered for download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Docx,
    Pdf,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn render(self, text: &str) -> Result<Vec<u8>, ExportError> {
        match self {
            ExportFormat::Docx => render_docx(text),
            ExportFormat::Pdf => render_pdf(text),
        }
    }
}

/// Renders `text` as a DOCX document, one paragraph per line.
pub fn render_docx(text: &str) -> Result<Vec<u8>, ExportError> {
    let docx = text.lines().fold(Docx::new(), |docx, line| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)))
    });

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;

    let bytes = buf.into_inner();
    debug!("Rendered DOCX: {} bytes", bytes.len());
    Ok(bytes)
}

/// Splits every line into chunks of at most `width` characters.
/// Empty lines survive as empty strings.
pub fn wrap_fixed_width(text: &str, width: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    for line in text.lines() {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            wrapped.push(String::new());
            continue;
        }
        wrapped.extend(chars.chunks(width).map(|chunk| chunk.iter().collect::<String>()));
    }
    wrapped
}

/// Renders `text` as a PDF, starting a new page whenever the current one is full.
pub fn render_pdf(text: &str) -> Result<Vec<u8>, ExportError> {
    let lines = wrap_fixed_width(text, PDF_WRAP_CHARS);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let pages: Vec<&[String]> = if lines.is_empty() {
        vec![&lines[..]]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page_lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
            Operation::new("TL", vec![LEADING.into()]),
            Operation::new("Td", vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN).into()]),
        ];
        for line in page_lines {
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_win_ansi(line))],
            ));
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations }
            .encode()
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    debug!("Rendered PDF: {} pages, {} bytes", page_count, bytes.len());
    Ok(bytes)
}

/// Single-byte encoding for the base-14 font. Latin-1 maps directly, the
/// typographic block at 0x80..=0x9F goes through `win_ansi_high`, anything
/// else becomes '?'.
fn encode_win_ansi(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| match u32::from(c) {
            0x80..=0x9f => b'?',
            cp @ 0..=0xff => cp as u8,
            _ => win_ansi_high(c).unwrap_or(b'?'),
        })
        .collect()
}

fn win_ansi_high(c: char) -> Option<u8> {
    let byte = match c {
        '\u{20ac}' => 0x80, // €
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85, // …
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91, // ‘
        '\u{2019}' => 0x92, // ’
        '\u{201c}' => 0x93, // “
        '\u{201d}' => 0x94, // ”
        '\u{2022}' => 0x95, // •
        '\u{2013}' => 0x96, // –
        '\u{2014}' => 0x97, // —
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99, // ™
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => return None,
    };
    Some(byte)
}
