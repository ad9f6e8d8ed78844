//! Path management for lexdraft's on-disk state.
//!
//! ```text
//! ~/.config/lexdraft/
//! ├── config.toml              # [editor] settings
//! └── recent_documents.toml    # most-recently-used documents
//! ```

use std::path::PathBuf;

use lexdraft_core::LexdraftError;
use thiserror::Error;

const APP_DIR: &str = "lexdraft";

#[derive(Debug, Error)]
pub enum PathError {
    #[error("Cannot determine the user configuration directory")]
    ConfigDirNotFound,
}

impl From<PathError> for LexdraftError {
    fn from(err: PathError) -> Self {
        LexdraftError::config(err.to_string())
    }
}

/// Files managed under the lexdraft config directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceType {
    Config,
    RecentDocuments,
}

impl ServiceType {
    fn file_name(self) -> &'static str {
        match self {
            ServiceType::Config => "config.toml",
            ServiceType::RecentDocuments => "recent_documents.toml",
        }
    }
}

/// Resolves lexdraft paths, optionally under an explicit base directory.
#[derive(Debug, Clone, Default)]
pub struct LexdraftPaths {
    base_dir: Option<PathBuf>,
}

impl LexdraftPaths {
    /// `base_dir` replaces the platform config directory (tests, `--config-dir`).
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base_dir {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn get_path(&self, service: ServiceType) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(service.file_name()))
    }
}
