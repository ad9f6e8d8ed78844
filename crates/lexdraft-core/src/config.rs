//! Editor configuration, read from the `[editor]` table of `config.toml`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::document::DEFAULT_UNTITLED_TITLE;
use crate::recent::DEFAULT_RECENT_LIMIT;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigRoot {
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub autosave_enabled: bool,
    pub autosave_interval_secs: u64,
    pub recent_documents_limit: usize,
    pub untitled_title: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_enabled: true,
            autosave_interval_secs: 60,
            recent_documents_limit: DEFAULT_RECENT_LIMIT,
            untitled_title: DEFAULT_UNTITLED_TITLE.to_string(),
        }
    }
}

impl EditorConfig {
    /// Autosave period, never shorter than one second.
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let root: ConfigRoot = toml::from_str("[editor]\nautosave_interval_secs = 15\n").unwrap();
        assert_eq!(root.editor.autosave_interval(), Duration::from_secs(15));
        assert!(root.editor.autosave_enabled);
        assert_eq!(root.editor.recent_documents_limit, 10);
        assert_eq!(root.editor.untitled_title, "Untitled Document");
    }

    #[test]
    fn test_empty_file_is_default() {
        let root: ConfigRoot = toml::from_str("").unwrap();
        assert_eq!(root.editor, EditorConfig::default());
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = EditorConfig {
            autosave_interval_secs: 0,
            ..EditorConfig::default()
        };
        assert_eq!(config.autosave_interval(), Duration::from_secs(1));
    }
}
