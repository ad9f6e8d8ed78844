use std::io::Write;
use std::path::Path;

use anyhow::Result;
use lexdraft_core::outline;

use super::read_document;

pub fn run(file: &Path, json: bool, out: &mut impl Write) -> Result<()> {
    let entries = outline::extract(&read_document(file)?);

    if json {
        serde_json::to_writer_pretty(&mut *out, &entries)?;
        writeln!(out)?;
        return Ok(());
    }

    for entry in &entries {
        let indent = "  ".repeat(usize::from(entry.level.saturating_sub(1)));
        writeln!(out, "{indent}{} (#{})", entry.text, entry.anchor)?;
    }
    Ok(())
}
