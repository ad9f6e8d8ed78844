//! Rich-text editing primitives used by the session.
//!
//! - `buffer`: the [`RichTextBuffer`] capability and the HTML implementation
//! - `locator`: literal first-occurrence span search
//! - `suggestion`: applying `{original, suggested}` pairs to a buffer

pub(crate) mod html;

mod buffer;
mod locator;
mod suggestion;

pub use buffer::{HtmlBuffer, Projection, RichTextBuffer};
pub use html::escape_text;
pub use locator::{TextSpan, is_whole_document, locate, replace_first};
pub use suggestion::{
    Suggestion, SuggestionKind, SuggestionOutcome, apply_suggestion, apply_to_body,
};
