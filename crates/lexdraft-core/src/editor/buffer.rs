//! Rich-text buffer capability and its HTML implementation.
//!
//! The suggestion applier never touches markup directly. It works against
//! [`RichTextBuffer`], whose offsets are byte offsets into the buffer's
//! plain-text projection, the same text the AI collaborator saw.

use std::ops::Range;

use super::html::{self, Token};
use super::locator::TextSpan;

/// The operations a rich-text engine has to offer for suggestions to be applied.
pub trait RichTextBuffer {
    /// The document's plain-text projection.
    fn plain_text(&self) -> String;

    /// The raw stored representation (markup included).
    fn raw(&self) -> &str;

    /// Replaces the plain-text `span` with `text`.
    fn replace_span(&mut self, span: TextSpan, text: &str);

    /// Inserts `text` at a plain-text offset and returns the offset actually
    /// used. Offsets past the end, or inside a character, are clamped.
    fn insert_at(&mut self, offset: usize, text: &str) -> usize;

    /// Replaces the whole document with `content`, stored verbatim.
    fn replace_all(&mut self, content: &str);

    /// Where text goes when the caller has no cursor: the end of the last block.
    fn end_offset(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    plain: Range<usize>,
    source: Range<usize>,
    /// Text copied byte-for-byte from the source. Other segments (entities,
    /// tag-produced newlines) map as a unit.
    verbatim: bool,
    /// Produced by a closing block tag rather than by content.
    block_break: bool,
}

/// Plain-text projection of an HTML body with a map back to source offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    text: String,
    segments: Vec<Segment>,
    source_len: usize,
}

impl Projection {
    pub fn of(source: &str) -> Self {
        let mut projection = Projection {
            text: String::with_capacity(source.len()),
            segments: Vec::new(),
            source_len: source.len(),
        };
        // A <br> immediately followed by its block's end yields a single break.
        let mut pending_br = false;

        for lexeme in html::tokenize(source) {
            match lexeme.token {
                Token::Text(text) => {
                    pending_br = false;
                    projection.push(text, lexeme.range, true, false);
                }
                Token::Entity(ch) => {
                    pending_br = false;
                    let mut buf = [0u8; 4];
                    projection.push(ch.encode_utf8(&mut buf), lexeme.range, false, false);
                }
                Token::Open(name) if html::is_line_break(name) => {
                    projection.push("\n", lexeme.range, false, false);
                    pending_br = true;
                }
                Token::Close(name) if html::is_block_tag(name) => {
                    if !pending_br {
                        projection.push("\n", lexeme.range, false, true);
                    }
                    pending_br = false;
                }
                Token::Open(_) | Token::Close(_) | Token::Comment => {}
            }
        }
        projection
    }

    fn push(&mut self, text: &str, source: Range<usize>, verbatim: bool, block_break: bool) {
        if text.is_empty() {
            return;
        }
        let start = self.text.len();
        self.text.push_str(text);
        self.segments.push(Segment {
            plain: start..self.text.len(),
            source,
            verbatim,
            block_break,
        });
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn segment_containing(&self, offset: usize) -> Option<&Segment> {
        let idx = self.segments.partition_point(|s| s.plain.end <= offset);
        self.segments.get(idx).filter(|s| s.plain.start <= offset)
    }

    /// Source offset where the plain character at `offset` begins.
    pub fn source_start(&self, offset: usize) -> usize {
        match self.segment_containing(offset) {
            Some(seg) if seg.verbatim => seg.source.start + (offset - seg.plain.start),
            Some(seg) => seg.source.start,
            None => self.source_len,
        }
    }

    /// Source offset just past the plain character ending at `offset`.
    pub fn source_end(&self, offset: usize) -> usize {
        if offset == 0 {
            return self.source_start(0);
        }
        match self.segment_containing(offset - 1) {
            Some(seg) if seg.verbatim => seg.source.start + (offset - seg.plain.start),
            Some(seg) => seg.source.end,
            None => self.source_len,
        }
    }

    /// Offset before the trailing block break, if the text ends with one.
    pub fn end_offset(&self) -> usize {
        match self.segments.last() {
            Some(seg) if seg.block_break => seg.plain.start,
            _ => self.text.len(),
        }
    }

    /// Clamps `offset` into the text, backing off to a char boundary.
    pub fn clamp(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

/// HTML body held as a string, as the editor engine stores it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlBuffer {
    html: String,
}

impl HtmlBuffer {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn into_inner(self) -> String {
        self.html
    }

    pub fn projection(&self) -> Projection {
        Projection::of(&self.html)
    }

    /// Replaces `source` with escaped `text`, keeping any tags inside it so the
    /// markup stays balanced.
    fn splice(&mut self, source: Range<usize>, text: &str) {
        let mut replacement = html::escape_text(text);
        let replaced = &self.html[source.clone()];
        for lexeme in html::tokenize(replaced) {
            if lexeme.is_markup() {
                replacement.push_str(&replaced[lexeme.range]);
            }
        }
        self.html.replace_range(source, &replacement);
    }
}

impl RichTextBuffer for HtmlBuffer {
    fn plain_text(&self) -> String {
        self.projection().text
    }

    fn raw(&self) -> &str {
        &self.html
    }

    fn replace_span(&mut self, span: TextSpan, text: &str) {
        let projection = self.projection();
        let start = projection.clamp(span.start);
        let end = projection.clamp(span.end).max(start);
        let source_start = projection.source_start(start);
        let source_end = projection.source_end(end).max(source_start);
        self.splice(source_start..source_end, text);
    }

    fn insert_at(&mut self, offset: usize, text: &str) -> usize {
        let projection = self.projection();
        let offset = projection.clamp(offset);
        let at = projection.source_start(offset);
        self.html.insert_str(at, &html::escape_text(text));
        offset
    }

    fn replace_all(&mut self, content: &str) {
        self.html = content.to_string();
    }

    fn end_offset(&self) -> usize {
        self.projection().end_offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_of_paragraphs() {
        let projection = Projection::of("<p>Hello <b>world</b></p><p>Second</p>");
        assert_eq!(projection.text(), "Hello world\nSecond\n");
    }

    #[test]
    fn test_projection_decodes_entities() {
        let projection = Projection::of("<p>Smith &amp; Sons</p>");
        assert_eq!(projection.text(), "Smith & Sons\n");
        // '&' maps to the whole entity in the source.
        let amp = projection.text().find('&').unwrap();
        assert_eq!(projection.source_start(amp), "<p>Smith ".len());
        assert_eq!(projection.source_end(amp + 1), "<p>Smith &amp;".len());
    }

    #[test]
    fn test_projection_br_then_block_end_is_single_break() {
        assert_eq!(Projection::of("<p><br></p><p>x</p>").text(), "\nx\n");
        assert_eq!(Projection::of("<p>a<br>b</p>").text(), "a\nb\n");
    }

    #[test]
    fn test_plain_text_body_is_identity() {
        let projection = Projection::of("Hello world");
        assert_eq!(projection.text(), "Hello world");
        assert_eq!(projection.source_start(6), 6);
        assert_eq!(projection.source_end(11), 11);
        assert_eq!(projection.end_offset(), 11);
    }

    #[test]
    fn test_end_offset_is_inside_last_block() {
        let mut buffer = HtmlBuffer::new("<p>Terms</p>");
        let end = buffer.end_offset();
        buffer.insert_at(end, " apply.");
        assert_eq!(buffer.raw(), "<p>Terms apply.</p>");
    }

    #[test]
    fn test_replace_span_preserves_surrounding_markup() {
        let mut buffer = HtmlBuffer::new("<p>Hello <b>world</b>!</p>");
        buffer.replace_span(TextSpan { start: 6, end: 11 }, "there");
        assert_eq!(buffer.raw(), "<p>Hello <b>there</b>!</p>");
    }

    #[test]
    fn test_replace_span_across_tags_keeps_markup_balanced() {
        let mut buffer = HtmlBuffer::new("<p>Hello <b>big</b> world</p>");
        let span = TextSpan { start: 6, end: 15 }; // "big world"
        buffer.replace_span(span, "vast planet");
        assert_eq!(buffer.raw(), "<p>Hello <b>vast planet</b></p>");
        assert_eq!(buffer.plain_text(), "Hello vast planet\n");
    }

    #[test]
    fn test_inserted_text_is_escaped() {
        let mut buffer = HtmlBuffer::new("<p>x</p>");
        buffer.insert_at(0, "a < b & ");
        assert_eq!(buffer.raw(), "<p>a &lt; b &amp; x</p>");
        assert_eq!(buffer.plain_text(), "a < b & x\n");
    }

    #[test]
    fn test_insert_offset_is_clamped() {
        let mut buffer = HtmlBuffer::new("abc");
        assert_eq!(buffer.insert_at(99, "!"), 3);
        assert_eq!(buffer.raw(), "abc!");

        let mut buffer = HtmlBuffer::new("é");
        assert_eq!(buffer.insert_at(1, "x"), 0);
        assert_eq!(buffer.raw(), "xé");
    }

    #[test]
    fn test_clamp_backs_off_to_char_boundary() {
        let projection = Projection::of("é");
        assert_eq!(projection.clamp(1), 0);
    }
}
