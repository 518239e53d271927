//! Query façade: list, read, summarize and search over an installed index.
//!
//! Every path handed in by a caller goes through the containment check before
//! anything touches the index or the disk.

use parking_lot::RwLock;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{IndexConfig, DEFAULT_MAX_RESULTS};
use crate::index::{DocumentIndex, DocumentRecord, ExtractionStatus, IndexStats};
use crate::rank::{rank, SearchResult};
use crate::snippet::extract_snippet;
use crate::tokenizer::query_terms;
use crate::{DocError, Result};

/// Listing entry: a record's metadata without its text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocSummary {
    pub relative_path: String,
    pub name: String,
    pub size_bytes: u64,
    pub extension: String,
    pub word_count: u32,
    pub status: ExtractionStatus,
}

impl From<&DocumentRecord> for DocSummary {
    fn from(d: &DocumentRecord) -> Self {
        Self {
            relative_path: d.relative_path.clone(),
            name: d.name.clone(),
            size_bytes: d.size_bytes,
            extension: d.extension.clone(),
            word_count: d.word_count,
            status: d.status.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    /// Matches before the result cap was applied.
    pub total_hits: usize,
    pub results: Vec<SearchResult>,
}

pub struct DocService {
    config: IndexConfig,
    index: RwLock<Option<Arc<DocumentIndex>>>,
}

impl DocService {
    /// A service with no index yet; queries fail with `NotReady` until
    /// [`DocService::install`] is called.
    pub fn new(config: IndexConfig) -> Self {
        Self { config, index: RwLock::new(None) }
    }

    pub fn with_index(config: IndexConfig, index: DocumentIndex) -> Self {
        let service = Self::new(config);
        service.install(index);
        service
    }

    /// Build the index for `config.root` and return a ready service.
    pub fn build(config: IndexConfig) -> Result<Self> {
        let index = DocumentIndex::build(&config)?;
        Ok(Self::with_index(config, index))
    }

    pub fn config(&self) -> &IndexConfig { &self.config }

    /// Swap in a fully built index. Readers holding the previous one keep it
    /// until they finish.
    pub fn install(&self, index: DocumentIndex) {
        let stats = index.stats();
        *self.index.write() = Some(Arc::new(index));
        info!(num_docs = stats.num_docs, num_terms = stats.num_terms, "index installed");
    }

    /// Rebuild from the configured root and install the result.
    pub fn rebuild(&self) -> Result<IndexStats> {
        let index = DocumentIndex::build(&self.config)?;
        let stats = index.stats();
        self.install(index);
        Ok(stats)
    }

    pub fn is_ready(&self) -> bool { self.index.read().is_some() }

    pub fn stats(&self) -> Result<IndexStats> {
        Ok(self.current()?.stats())
    }

    fn current(&self) -> Result<Arc<DocumentIndex>> {
        self.index.read().clone().ok_or(DocError::NotReady)
    }

    pub fn list(&self) -> Result<Vec<DocSummary>> {
        let index = self.current()?;
        Ok(index.documents().iter().map(DocSummary::from).collect())
    }

    /// Full extracted text of an indexed document.
    pub fn read(&self, relative_path: &str) -> Result<String> {
        let index = self.current()?;
        let key = contained_key(index.root(), relative_path)?;
        Ok(index.record(&key)?.text.clone())
    }

    /// First `max_lines` lines of a document.
    pub fn summarize(&self, relative_path: &str, max_lines: usize) -> Result<String> {
        let text = self.read(relative_path)?;
        Ok(text.lines().take(max_lines).collect::<Vec<_>>().join("\n"))
    }

    /// Ranked results for `query`, capped at `limit` (default 10), each with a
    /// snippet around the first matching query term.
    pub fn search(&self, query: &str, limit: Option<usize>) -> Result<SearchResults> {
        let index = self.current()?;
        let hits = rank(&index, query);
        let total_hits = hits.len();
        let terms = query_terms(query);
        let radius = self.config.snippet_radius;

        let results = hits
            .into_iter()
            .take(limit.unwrap_or(DEFAULT_MAX_RESULTS))
            .filter_map(|hit| {
                let doc = index.doc(hit.doc_id)?;
                Some(SearchResult {
                    relative_path: doc.relative_path.clone(),
                    score: hit.score,
                    snippet: extract_snippet(&doc.text, &terms, radius),
                    match_type: hit.match_type,
                })
            })
            .collect();
        debug!(query, total_hits, "search");
        Ok(SearchResults { total_hits, results })
    }
}

/// Validate `relative_path` against `root` and return its index key.
///
/// Rejects absolute paths and any `..` segment without touching the disk, then
/// resolves symlinks of an existing target and requires the canonical root as
/// prefix.
fn contained_key(root: &Path, relative_path: &str) -> Result<String> {
    let forbidden = || DocError::Forbidden(relative_path.to_string());

    if relative_path.starts_with(std::path::is_separator)
        || Path::new(relative_path)
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    {
        return Err(forbidden());
    }

    let mut segments = Vec::new();
    // `\` is an ordinary file name character outside Windows.
    for seg in relative_path.split(std::path::is_separator) {
        match seg {
            "" | "." => continue,
            ".." => return Err(forbidden()),
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        return Err(DocError::NotFound(relative_path.to_string()));
    }

    let abs: PathBuf = segments.iter().fold(root.to_path_buf(), |p, s| p.join(s));
    if abs.symlink_metadata().is_ok() {
        let canonical = abs
            .canonicalize()
            .map_err(|_| DocError::NotFound(relative_path.to_string()))?;
        if !canonical.starts_with(root.canonicalize()?) {
            return Err(forbidden());
        }
    }

    Ok(segments.join("/"))
}
