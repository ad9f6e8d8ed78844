use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use lexdraft_core::editor::{self, Suggestion, SuggestionOutcome};

use super::read_document;

pub struct ApplyArgs {
    pub file: PathBuf,
    pub original: String,
    pub suggested: String,
    pub cursor: Option<usize>,
    pub in_place: bool,
}

/// Applies the suggestion. A suggestion that no longer matches is reported
/// as a warning and leaves the document untouched.
pub fn run(args: &ApplyArgs, out: &mut impl Write) -> Result<SuggestionOutcome> {
    let body = read_document(&args.file)?;
    let suggestion = Suggestion::replace(args.original.as_str(), args.suggested.as_str());
    let (updated, outcome) = editor::apply_to_body(&body, &suggestion, args.cursor);

    if outcome.is_conflict() {
        tracing::warn!("Original text not found in {}; nothing changed", args.file.display());
        eprintln!("warning: original text not found; document left unchanged");
    }

    if args.in_place {
        if outcome.changed_body() {
            std::fs::write(&args.file, &updated)
                .with_context(|| format!("Failed to write {}", args.file.display()))?;
        }
    } else {
        out.write_all(updated.as_bytes())?;
        if !updated.ends_with('\n') {
            writeln!(out)?;
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(file: PathBuf, original: &str, suggested: &str, in_place: bool) -> ApplyArgs {
        ApplyArgs {
            file,
            original: original.to_string(),
            suggested: suggested.to_string(),
            cursor: None,
            in_place,
        }
    }

    #[test]
    fn test_prints_updated_document() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("doc.html");
        std::fs::write(&file, "<p>Hello world</p>").unwrap();

        let mut out = Vec::new();
        let outcome = run(&args(file.clone(), "world", "there", false), &mut out).unwrap();

        assert!(outcome.changed_body());
        assert_eq!(String::from_utf8(out).unwrap(), "<p>Hello there</p>\n");
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "<p>Hello world</p>");
    }

    #[test]
    fn test_in_place_rewrites_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("doc.html");
        std::fs::write(&file, "<p>The buyer will pay.</p>").unwrap();

        let mut out = Vec::new();
        run(&args(file.clone(), "will", "shall", true), &mut out).unwrap();

        assert!(out.is_empty());
        assert_eq!(
            std::fs::read_to_string(&file).unwrap(),
            "<p>The buyer shall pay.</p>"
        );
    }

    #[test]
    fn test_conflict_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("doc.html");
        std::fs::write(&file, "<p>Hello</p>").unwrap();

        let mut out = Vec::new();
        let outcome = run(&args(file.clone(), "absent", "x", true), &mut out).unwrap();

        assert!(outcome.is_conflict());
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "<p>Hello</p>");
    }
}
