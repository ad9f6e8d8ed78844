//! Literal text-span search.
//!
//! Matching is case-sensitive and whitespace-literal, and only the first
//! occurrence counts. Repeated boilerplate elsewhere in a document is never
//! touched, and nothing fuzzy is attempted when the text has drifted.

use serde::{Deserialize, Serialize};

/// A byte range in a document's plain-text projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Finds the first occurrence of `needle` in `haystack`.
///
/// An empty needle never matches.
pub fn locate(haystack: &str, needle: &str) -> Option<TextSpan> {
    if needle.is_empty() {
        return None;
    }
    haystack.find(needle).map(|start| TextSpan {
        start,
        end: start + needle.len(),
    })
}

/// Replaces the first occurrence of `needle`, or returns `None` if absent.
pub fn replace_first(haystack: &str, needle: &str, replacement: &str) -> Option<String> {
    let span = locate(haystack, needle)?;
    let mut out = String::with_capacity(haystack.len() - span.len() + replacement.len());
    out.push_str(&haystack[..span.start]);
    out.push_str(replacement);
    out.push_str(&haystack[span.end..]);
    Some(out)
}

/// Whether `candidate` is the entire `document`, ignoring surrounding whitespace.
pub fn is_whole_document(document: &str, candidate: &str) -> bool {
    let candidate = candidate.trim();
    !candidate.is_empty() && candidate == document.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_first_occurrence_only() {
        let span = locate("the seller and the seller", "the seller").unwrap();
        assert_eq!(span, TextSpan { start: 0, end: 10 });
    }

    #[test]
    fn test_locate_is_case_and_whitespace_sensitive() {
        assert!(locate("Hello World", "world").is_none());
        assert!(locate("Hello  world", "Hello world").is_none());
    }

    #[test]
    fn test_empty_needle_never_matches() {
        assert!(locate("anything", "").is_none());
    }

    #[test]
    fn test_replace_first_leaves_later_occurrences() {
        let out = replace_first("a-b-a", "a", "x").unwrap();
        assert_eq!(out, "x-b-a");
        assert!(replace_first("a-b-a", "z", "x").is_none());
    }

    #[test]
    fn test_is_whole_document_trims_both_sides() {
        assert!(is_whole_document("  Full text\n", "Full text"));
        assert!(!is_whole_document("Full text", "Full"));
        assert!(!is_whole_document("   ", "  "));
    }
}
