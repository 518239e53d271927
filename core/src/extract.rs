//! Text extraction from files
//!
//! Every supported extension maps to a [`Format`]. Text-like formats are
//! decoded as UTF-8 with a Latin-1 fallback; PDFs go through `pdf-extract`.

use std::path::Path;

use crate::{DocError, Result};

/// Source format of a document. `Markdown`, `Html` and `Json` currently
/// decode exactly like `PlainText`: markup is kept, so HTML tag names count
/// as words. Only `Pdf` goes through a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    PlainText,
    Markdown,
    Html,
    Json,
    Pdf,
}

/// Known extensions and their formats. Anything else that is configured as
/// supported is treated as plain text.
const FORMATS: &[(&str, Format)] = &[
    ("txt", Format::PlainText),
    ("md", Format::Markdown),
    ("markdown", Format::Markdown),
    ("html", Format::Html),
    ("htm", Format::Html),
    ("json", Format::Json),
    ("pdf", Format::Pdf),
];

impl Format {
    /// Look up the format for a lower-cased extension without the dot.
    pub fn from_extension(ext: &str) -> Self {
        FORMATS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, f)| *f)
            .unwrap_or(Format::PlainText)
    }

    pub fn extract(self, bytes: &[u8]) -> Result<String> {
        match self {
            Format::PlainText | Format::Markdown | Format::Html | Format::Json => {
                Ok(decode_text(bytes))
            }
            Format::Pdf => extract_pdf(bytes),
        }
    }
}

/// Read a file and extract its text according to `format`.
pub fn extract_file(path: &Path, format: Format) -> Result<String> {
    let bytes = std::fs::read(path)?;
    format.extract(&bytes)
}

fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1 maps every byte to the code point of the same value.
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(DocError::Extraction(e.to_string())),
        Err(_) => Err(DocError::Extraction("PDF parser panicked".into())),
    }
}
