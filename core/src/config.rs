//! Index configuration: document root, supported extensions, snippet radius.

use std::path::{Path, PathBuf};

/// Extensions indexed when nothing else is configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["txt", "md", "pdf", "html", "json"];

/// Characters kept on each side of a match when building a snippet.
pub const SNIPPET_RADIUS: usize = 150;

/// Result cap used when the caller does not pass one.
pub const DEFAULT_MAX_RESULTS: usize = 10;

#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub root: PathBuf,
    /// Lower-cased, without the leading dot.
    pub extensions: Vec<String>,
    pub snippet_radius: usize,
}

impl IndexConfig {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            snippet_radius: SNIPPET_RADIUS,
        }
    }

    /// Add extra extensions on top of the defaults. Accepts `.rst` or `rst`.
    pub fn with_extensions<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extra {
            let ext = normalize_extension(ext.as_ref());
            if !ext.is_empty() && !self.extensions.contains(&ext) {
                self.extensions.push(ext);
            }
        }
        self
    }

    pub fn with_snippet_radius(mut self, radius: usize) -> Self {
        self.snippet_radius = radius;
        self
    }

    pub fn supports(&self, path: &Path) -> bool {
        match extension_of(path) {
            Some(ext) => self.extensions.iter().any(|e| *e == ext),
            None => false,
        }
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Lower-cased extension of a path, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}
