use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{extension_of, IndexConfig};
use crate::extract::{extract_file, Format};
use crate::tokenizer::tokenize;
use crate::{DocError, Result};

pub type DocId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ExtractionStatus {
    Ok,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentRecord {
    /// Path relative to the index root, `/`-separated.
    pub relative_path: String,
    pub name: String,
    pub size_bytes: u64,
    /// Lower-cased, without the leading dot.
    pub extension: String,
    /// Total token occurrences, not distinct terms.
    pub word_count: u32,
    #[serde(skip)]
    pub text: String,
    pub status: ExtractionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub num_docs: usize,
    pub num_terms: usize,
    pub failed: usize,
}

/// Immutable inverted index over every supported file under a root.
#[derive(Debug, Default)]
pub struct DocumentIndex {
    root: PathBuf,
    docs: Vec<DocumentRecord>, // sorted by relative_path; position is the DocId
    doc_id_map: HashMap<String, DocId>,
    postings: HashMap<String, Vec<Posting>>, // postings sorted by doc_id
}

impl DocumentIndex {
    /// Walk `config.root`, extract every supported file and index it.
    ///
    /// Unreadable entries are skipped and failed extractions are kept as
    /// empty documents, so only an invalid root is an error.
    pub fn build(config: &IndexConfig) -> Result<Self> {
        let root = &config.root;
        if !root.is_dir() {
            return Err(DocError::InvalidRoot(root.clone()));
        }
        info!(root = %root.display(), "building document index");

        let mut builder = IndexBuilder::new(root);
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !config.supports(entry.path()) {
                continue;
            }
            let Some(rel) = relative_key(root, entry.path()) else { continue };
            let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
            let format = Format::from_extension(&extension_of(entry.path()).unwrap_or_default());

            let (text, status) = match extract_file(entry.path(), format) {
                Ok(text) => (text, ExtractionStatus::Ok),
                Err(err) => {
                    warn!(path = %rel, error = %err, "extraction failed, indexing as empty");
                    (String::new(), ExtractionStatus::Failed(err.to_string()))
                }
            };
            debug!(path = %rel, "indexed");
            builder.add_document(&rel, size_bytes, text, status);
        }

        let index = builder.finish();
        let stats = index.stats();
        info!(num_docs = stats.num_docs, num_terms = stats.num_terms, failed = stats.failed, "index build complete");
        Ok(index)
    }

    pub fn root(&self) -> &Path { &self.root }

    /// All records ordered by relative path.
    pub fn documents(&self) -> &[DocumentRecord] { &self.docs }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    /// Postings for a normalized term; empty if the term is unknown.
    pub fn term(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn doc(&self, doc_id: DocId) -> Option<&DocumentRecord> {
        self.docs.get(doc_id as usize)
    }

    pub fn record(&self, relative_path: &str) -> Result<&DocumentRecord> {
        self.doc_id_map
            .get(relative_path)
            .and_then(|id| self.doc(*id))
            .ok_or_else(|| DocError::NotFound(relative_path.to_string()))
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            num_docs: self.docs.len(),
            num_terms: self.postings.len(),
            failed: self.docs.iter().filter(|d| d.status != ExtractionStatus::Ok).count(),
        }
    }
}

/// Accumulates documents and produces a [`DocumentIndex`] in one pass.
pub struct IndexBuilder {
    root: PathBuf,
    pending: BTreeMap<String, (DocumentRecord, Vec<String>)>,
}

impl IndexBuilder {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf(), pending: BTreeMap::new() }
    }

    /// Add (or replace) a document. `text` is ignored unless `status` is `Ok`.
    pub fn add_document(&mut self, relative_path: &str, size_bytes: u64, text: String, status: ExtractionStatus) {
        let text = if status == ExtractionStatus::Ok { text } else { String::new() };
        let tokens = tokenize(&text);
        let path = Path::new(relative_path);
        let record = DocumentRecord {
            relative_path: relative_path.to_string(),
            name: relative_path.rsplit('/').next().unwrap_or(relative_path).to_string(),
            size_bytes,
            extension: extension_of(path).unwrap_or_default(),
            word_count: saturating_count(tokens.len()),
            text,
            status,
        };
        self.pending.insert(relative_path.to_string(), (record, tokens));
    }

    /// Shorthand for an in-memory document that extracted cleanly.
    pub fn add_text(&mut self, relative_path: &str, text: &str) {
        self.add_document(relative_path, text.len() as u64, text.to_string(), ExtractionStatus::Ok);
    }

    pub fn finish(self) -> DocumentIndex {
        let mut docs = Vec::with_capacity(self.pending.len());
        let mut doc_id_map = HashMap::with_capacity(self.pending.len());
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();

        for (doc_id, (path, (record, tokens))) in self.pending.into_iter().enumerate() {
            let Ok(doc_id) = DocId::try_from(doc_id) else {
                warn!(path = %path, "document id space exhausted, skipping");
                continue;
            };
            let mut tf_counts: HashMap<String, u32> = HashMap::new();
            for term in tokens {
                *tf_counts.entry(term).or_insert(0) += 1;
            }
            for (term, count) in tf_counts {
                postings.entry(term).or_default().push(Posting { doc_id, count });
            }
            doc_id_map.insert(path, doc_id);
            docs.push(record);
        }

        DocumentIndex { root: self.root, docs, doc_id_map, postings }
    }
}

/// Counts past `u32::MAX` stick at the maximum.
fn saturating_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// `/`-joined path of `path` relative to `root`.
fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() { None } else { Some(parts.join("/")) }
}
