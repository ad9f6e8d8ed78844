//! Configuration service.
//!
//! Loads the `[editor]` table from `config.toml` under the lexdraft config
//! directory and caches it until [`ConfigService::invalidate_cache`].

use std::sync::{Arc, RwLock};

use lexdraft_core::config::{ConfigRoot, EditorConfig};
use lexdraft_core::error::Result;

use crate::paths::{LexdraftPaths, ServiceType};
use crate::storage::AtomicTomlFile;

const EDITOR_TABLE: &str = "editor";

#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: LexdraftPaths,
    config: Arc<RwLock<Option<EditorConfig>>>,
}

impl ConfigService {
    /// Nothing is read until the first [`ConfigService::get_config`].
    pub fn new(paths: LexdraftPaths) -> Self {
        Self {
            paths,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns the editor configuration, loading it on first use.
    ///
    /// A missing file yields defaults; an unreadable one yields defaults and a
    /// warning.
    pub fn get_config(&self) -> EditorConfig {
        if let Some(cached) = self
            .config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
        {
            return cached.clone();
        }

        let loaded = match self.load_config() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load editor config, using defaults: {}", e);
                EditorConfig::default()
            }
        };

        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(loaded.clone());
        loaded
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) {
        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    /// Writes `config` as the `[editor]` table of `config.toml` and refreshes
    /// the cache. Other tables in the file are kept as they are.
    pub fn save_config(&self, config: &EditorConfig) -> Result<()> {
        let editor = toml::Value::try_from(config)?;
        let file: AtomicTomlFile<toml::Table> =
            AtomicTomlFile::new(self.paths.get_path(ServiceType::Config)?);
        file.update(toml::Table::new(), |root| {
            root.insert(EDITOR_TABLE.to_string(), editor);
        })?;
        *self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(config.clone());
        Ok(())
    }

    fn load_config(&self) -> Result<EditorConfig> {
        let root = self.file()?.load()?.unwrap_or_default();
        tracing::debug!(config = ?root.editor, "Loaded editor config");
        Ok(root.editor)
    }

    fn file(&self) -> Result<AtomicTomlFile<ConfigRoot>> {
        Ok(AtomicTomlFile::new(
            self.paths.get_path(ServiceType::Config)?,
        ))
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new(LexdraftPaths::default())
    }
}
