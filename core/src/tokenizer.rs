use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[\p{L}\p{N}]+").expect("valid regex");
}

/// Tokenize text into lower-cased alphanumeric terms, in document order.
/// Repeated words are kept: the length of the result is the word count.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    RE.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
}

/// Distinct terms of a query, first occurrence wins.
pub fn query_terms(query: &str) -> Vec<String> {
    let mut terms = tokenize(query);
    let mut seen = std::collections::HashSet::new();
    terms.retain(|t| seen.insert(t.clone()));
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Router(config)# ip route 10.0.0.0");
        assert_eq!(t, vec!["router", "config", "ip", "route", "10", "0", "0", "0"]);
    }

    #[test]
    fn query_terms_dedup() {
        assert_eq!(query_terms("BGP bgp ospf"), vec!["bgp", "ospf"]);
        assert!(query_terms("  ,;  ").is_empty());
    }
}
