use std::io::Write;
use std::path::Path;

use anyhow::Result;
use lexdraft_core::editor::{self, HtmlBuffer, RichTextBuffer};

use super::read_document;

pub fn run(file: &Path, text: &str, out: &mut impl Write) -> Result<()> {
    let plain = HtmlBuffer::new(read_document(file)?).plain_text();
    match editor::locate(&plain, text) {
        Some(span) => writeln!(out, "{}..{}", span.start, span.end)?,
        None => writeln!(out, "not found")?,
    }
    Ok(())
}
