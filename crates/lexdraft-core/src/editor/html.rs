//! Minimal, lenient markup lexer for editor bodies.
//!
//! Bodies are the HTML the rich-text engine produces (`<p>`, `<h2>`, `<br>`,
//! inline formatting, entities). This lexer only needs to tell text, entities
//! and tags apart while keeping byte ranges into the source, so it never
//! fails: anything that does not look like markup is text.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)<!--.*?-->|<(/?)([A-Za-z][A-Za-z0-9]*)\b[^>]*>|&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]*);",
    )
    .expect("markup pattern is valid")
});

/// Elements whose end produces a line break in the plain-text projection.
const BLOCK_TAGS: &[&str] = &[
    "p",
    "div",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "blockquote",
    "pre",
    "tr",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Text(&'a str),
    Entity(char),
    Open(&'a str),
    Close(&'a str),
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Lexeme<'a> {
    pub token: Token<'a>,
    pub range: Range<usize>,
}

impl Lexeme<'_> {
    pub fn is_markup(&self) -> bool {
        matches!(self.token, Token::Open(_) | Token::Close(_) | Token::Comment)
    }
}

pub(crate) fn is_block_tag(name: &str) -> bool {
    BLOCK_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

pub(crate) fn is_line_break(name: &str) -> bool {
    name.eq_ignore_ascii_case("br")
}

/// Heading level for `h1`..`h6`.
pub(crate) fn heading_level(name: &str) -> Option<u8> {
    let bytes = name.as_bytes();
    if bytes.len() == 2 && (bytes[0] == b'h' || bytes[0] == b'H') {
        match bytes[1] {
            b'1'..=b'6' => Some(bytes[1] - b'0'),
            _ => None,
        }
    } else {
        None
    }
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(numeric) = name.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

/// Splits `source` into lexemes covering every byte, in order.
pub(crate) fn tokenize(source: &str) -> Vec<Lexeme<'_>> {
    let mut lexemes = Vec::new();
    let mut cursor = 0;

    for caps in MARKUP.captures_iter(source) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() > cursor {
            lexemes.push(Lexeme {
                token: Token::Text(&source[cursor..whole.start()]),
                range: cursor..whole.start(),
            });
        }

        let token = if let Some(name) = caps.get(2) {
            let closing = caps.get(1).is_some_and(|slash| !slash.as_str().is_empty());
            if closing {
                Token::Close(name.as_str())
            } else {
                Token::Open(name.as_str())
            }
        } else if let Some(entity) = caps.get(3) {
            match decode_entity(entity.as_str()) {
                Some(ch) => Token::Entity(ch),
                None => Token::Text(whole.as_str()),
            }
        } else {
            Token::Comment
        };

        lexemes.push(Lexeme {
            token,
            range: whole.range(),
        });
        cursor = whole.end();
    }

    if cursor < source.len() {
        lexemes.push(Lexeme {
            token: Token::Text(&source[cursor..]),
            range: cursor..source.len(),
        });
    }
    lexemes
}

/// Escapes text for insertion into markup.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token<'_>> {
        tokenize(source).into_iter().map(|l| l.token).collect()
    }

    #[test]
    fn test_tokenize_tags_text_and_entities() {
        assert_eq!(
            tokens("<p class=\"x\">A &amp; B</p>"),
            vec![
                Token::Open("p"),
                Token::Text("A "),
                Token::Entity('&'),
                Token::Text(" B"),
                Token::Close("p"),
            ]
        );
    }

    #[test]
    fn test_lexemes_cover_source() {
        let source = "<h1>Intro</h1><!-- note --><p>x &lt; y<br/></p>";
        let lexemes = tokenize(source);
        let mut expected_start = 0;
        for lexeme in &lexemes {
            assert_eq!(lexeme.range.start, expected_start);
            expected_start = lexeme.range.end;
        }
        assert_eq!(expected_start, source.len());
        assert!(lexemes.iter().any(|l| l.token == Token::Comment));
        assert!(lexemes.iter().any(|l| l.token == Token::Open("br")));
    }

    #[test]
    fn test_bare_angle_bracket_is_text() {
        assert_eq!(tokens("a < b"), vec![Token::Text("a < b")]);
    }

    #[test]
    fn test_unknown_entity_is_literal() {
        assert_eq!(
            tokens("&bogus; &#169;"),
            vec![Token::Text("&bogus;"), Token::Text(" "), Token::Entity('©')]
        );
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("H6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("hr"), None);
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    }
}
