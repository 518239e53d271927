//! docdex-core: in-memory document index, ranking and snippets over a
//! directory of text, markdown, PDF, HTML and JSON files.

pub mod config;
pub mod extract;
pub mod index;
pub mod rank;
pub mod service;
pub mod snippet;
pub mod tokenizer;

pub use config::IndexConfig;
pub use index::{DocId, DocumentIndex, DocumentRecord, ExtractionStatus, IndexStats, Posting};
pub use rank::{MatchType, SearchResult};
pub use service::{DocService, DocSummary, SearchResults};

#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0} is outside the document root")]
    Forbidden(String),

    #[error("Index is not ready yet")]
    NotReady,

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Invalid document root: {}", .0.display())]
    InvalidRoot(std::path::PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DocError>;
