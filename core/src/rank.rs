//! Term-frequency ranking with filename matches.
//!
//! Content score of a document is the sum, over the distinct query terms, of
//! `occurrences / word_count`. Every document whose relative path contains the
//! raw query (case-insensitive) also gets a separate filename hit with a fixed
//! score. Hits are ordered by score descending, filename before content on
//! ties, then by path.

use serde::Serialize;
use std::collections::HashMap;

use crate::index::{DocId, DocumentIndex};
use crate::tokenizer::query_terms;

/// Score of a filename hit: the largest ratio a single term can reach.
pub const FILENAME_MATCH_SCORE: f32 = 1.0;

/// Declaration order is the tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Filename,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub doc_id: DocId,
    pub score: f32,
    pub match_type: MatchType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub relative_path: String,
    pub score: f32,
    pub snippet: String,
    pub match_type: MatchType,
}

/// Rank every matching document for `query`. Uncapped; an empty or blank
/// query matches nothing.
pub fn rank(index: &DocumentIndex, query: &str) -> Vec<Hit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut scores: HashMap<DocId, f32> = HashMap::new();
    for term in query_terms(query) {
        for p in index.term(&term) {
            let Some(doc) = index.doc(p.doc_id) else { continue };
            if doc.word_count == 0 {
                continue;
            }
            *scores.entry(p.doc_id).or_insert(0.0) += p.count as f32 / doc.word_count as f32;
        }
    }

    let mut hits: Vec<Hit> = scores
        .into_iter()
        .map(|(doc_id, score)| Hit { doc_id, score, match_type: MatchType::Content })
        .collect();

    for (doc_id, doc) in index.documents().iter().enumerate() {
        if doc.relative_path.to_lowercase().contains(&needle) {
            let Ok(doc_id) = DocId::try_from(doc_id) else { break };
            hits.push(Hit { doc_id, score: FILENAME_MATCH_SCORE, match_type: MatchType::Filename });
        }
    }

    // Doc ids are assigned in relative-path order, so comparing ids compares paths.
    hits.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.match_type.cmp(&b.match_type))
            .then(a.doc_id.cmp(&b.doc_id))
    });
    hits
}
