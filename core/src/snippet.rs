//! Fixed-radius excerpts around the first match of a term.

use regex::RegexBuilder;

/// Excerpt of `text` around the earliest case-insensitive occurrence of any of
/// `terms`, keeping up to `radius` characters on each side. Partial words at
/// the edges are dropped when a whitespace boundary allows it. Returns an
/// empty string when no term occurs in the text.
pub fn extract_snippet(text: &str, terms: &[String], radius: usize) -> String {
    let Some((m_start, m_end)) = first_match(text, terms) else {
        return String::new();
    };

    let mut start = text[..m_start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(m_start);
    let mut end = text[m_end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| m_end + i)
        .unwrap_or(text.len());

    if cuts_word_before(text, start) {
        if let Some(i) = text[start..m_start].find(char::is_whitespace) {
            start += i;
        }
    }
    if cuts_word_after(text, end) {
        if let Some(i) = text[m_end..end].rfind(char::is_whitespace) {
            end = m_end + i;
        }
    }

    text[start..end].trim().to_string()
}

/// Byte range of the earliest match among `terms`.
fn first_match(text: &str, terms: &[String]) -> Option<(usize, usize)> {
    terms
        .iter()
        .filter(|t| !t.trim().is_empty())
        .filter_map(|t| {
            RegexBuilder::new(&regex::escape(t))
                .case_insensitive(true)
                .build()
                .ok()?
                .find(text)
                .map(|m| (m.start(), m.end()))
        })
        .min()
}

fn cuts_word_before(text: &str, start: usize) -> bool {
    text[..start].chars().next_back().is_some_and(|c| !c.is_whitespace())
}

fn cuts_word_after(text: &str, end: usize) -> bool {
    text[end..].chars().next().is_some_and(|c| !c.is_whitespace())
}
