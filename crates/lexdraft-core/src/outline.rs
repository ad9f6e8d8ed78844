//! Heading outline of a document body.

use serde::{Deserialize, Serialize};

use crate::editor::html::{self, Token};

/// One heading in the outline. `anchor` is `heading-<n>`, `n` counting every
/// heading element in the body, empty ones included, so anchors stay in step
/// with the editor's heading ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: u8,
    pub text: String,
    pub anchor: String,
}

/// Extracts `h1`..`h6` headings from `body` in document order.
///
/// Heading text is whitespace-collapsed; headings without text are skipped.
pub fn extract(body: &str) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    let mut current: Option<(u8, String)> = None;
    let mut seen = 0usize;

    for lexeme in html::tokenize(body) {
        let Some((level, text)) = current.as_mut() else {
            if let Token::Open(name) = lexeme.token {
                current = html::heading_level(name).map(|level| (level, String::new()));
            }
            continue;
        };
        match lexeme.token {
            Token::Text(fragment) => text.push_str(fragment),
            Token::Entity(ch) => text.push(ch),
            Token::Open(name) if html::is_line_break(name) => text.push(' '),
            Token::Close(name) if html::heading_level(name).is_some() => {
                let level = *level;
                let text = collapse_whitespace(text);
                let anchor = format!("heading-{seen}");
                current = None;
                seen += 1;
                if !text.is_empty() {
                    entries.push(OutlineEntry {
                        level,
                        text,
                        anchor,
                    });
                }
            }
            _ => {}
        }
    }
    entries
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_headings_in_order() {
        let outline = extract("<h1>Intro</h1><p>x</p><h2>Background</h2>");
        assert_eq!(
            outline,
            vec![
                OutlineEntry {
                    level: 1,
                    text: "Intro".into(),
                    anchor: "heading-0".into(),
                },
                OutlineEntry {
                    level: 2,
                    text: "Background".into(),
                    anchor: "heading-1".into(),
                },
            ]
        );
    }

    #[test]
    fn test_no_headings() {
        assert!(extract("<p>Only a paragraph</p>").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_heading_text_is_decoded_and_collapsed() {
        let outline = extract("<h3>  Terms &amp;\n  <em>Conditions</em> </h3>");
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].level, 3);
        assert_eq!(outline[0].text, "Terms & Conditions");
    }

    #[test]
    fn test_empty_headings_are_skipped_but_keep_their_anchor_slot() {
        let outline = extract("<h1> </h1><h2><br></h2><h2>Scope</h2><h3>Term</h3>");
        let anchors: Vec<_> = outline.iter().map(|e| e.anchor.as_str()).collect();
        assert_eq!(outline.len(), 2);
        assert_eq!(anchors, vec!["heading-2", "heading-3"]);
    }
}
