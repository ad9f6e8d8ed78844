//! Applying AI text suggestions to a live document.

use serde::{Deserialize, Serialize};

use super::buffer::{HtmlBuffer, RichTextBuffer};
use super::locator::{self, TextSpan};

/// Category the AI collaborator attaches to a suggestion. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Clarity,
    Legal,
    Grammar,
    #[serde(other)]
    Other,
}

/// One `{original, suggested}` pair as produced by the AI collaborator.
///
/// An empty `original` means "insert `suggested`"; an `original` equal to the
/// whole document means "rewrite the document".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    #[serde(default)]
    pub original: String,
    pub suggested: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SuggestionKind>,
}

impl Suggestion {
    pub fn replace(original: impl Into<String>, suggested: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            suggested: suggested.into(),
            explanation: None,
            kind: None,
        }
    }

    pub fn insert(suggested: impl Into<String>) -> Self {
        Self::replace(String::new(), suggested)
    }
}

/// What happened when a suggestion was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum SuggestionOutcome {
    /// Pure insertion at a plain-text offset.
    Inserted { at: usize },
    /// The whole body was rewritten.
    ReplacedWhole,
    /// The first occurrence of the original text was replaced.
    ReplacedSpan { span: TextSpan },
    /// The original text is no longer in the document; nothing changed.
    NotFound,
}

impl SuggestionOutcome {
    pub fn changed_body(&self) -> bool {
        !matches!(self, Self::NotFound)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Applies `suggestion` to `buffer`.
///
/// `cursor` is a plain-text offset used for insertions; without one the text
/// goes to the end of the document.
pub fn apply_suggestion<B>(
    buffer: &mut B,
    suggestion: &Suggestion,
    cursor: Option<usize>,
) -> SuggestionOutcome
where
    B: RichTextBuffer + ?Sized,
{
    if suggestion.original.is_empty() {
        let cursor = cursor.unwrap_or_else(|| buffer.end_offset());
        let at = buffer.insert_at(cursor, &suggestion.suggested);
        return SuggestionOutcome::Inserted { at };
    }

    let plain = buffer.plain_text();
    if locator::is_whole_document(buffer.raw(), &suggestion.original)
        || locator::is_whole_document(&plain, &suggestion.original)
    {
        buffer.replace_all(&suggestion.suggested);
        return SuggestionOutcome::ReplacedWhole;
    }

    match locator::locate(&plain, &suggestion.original) {
        Some(span) => {
            buffer.replace_span(span, &suggestion.suggested);
            SuggestionOutcome::ReplacedSpan { span }
        }
        None => {
            tracing::debug!(
                original_len = suggestion.original.len(),
                "suggestion text not found in document"
            );
            SuggestionOutcome::NotFound
        }
    }
}

/// Applies `suggestion` to an HTML body, returning the new body and the outcome.
pub fn apply_to_body(
    body: &str,
    suggestion: &Suggestion,
    cursor: Option<usize>,
) -> (String, SuggestionOutcome) {
    let mut buffer = HtmlBuffer::new(body);
    let outcome = apply_suggestion(&mut buffer, suggestion, cursor);
    (buffer.into_inner(), outcome)
}
