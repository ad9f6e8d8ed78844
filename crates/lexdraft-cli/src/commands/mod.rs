pub mod apply;
pub mod find;
pub mod outline;
pub mod recent;

use std::path::Path;

use anyhow::{Context, Result};

pub(crate) fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
