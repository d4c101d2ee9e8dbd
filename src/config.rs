//! Snippet engine configuration persistence
//!
//! Stores user preferences in `~/.config/token-snippets/config.yaml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::snippet::{load_snippet_map, SnippetDefinition};
use crate::sync::SyncMode;

/// Snippet engine configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetConfig {
    /// When reference groups are synchronized (`realtime` or `on_jump`)
    #[serde(default)]
    pub sync_mode: SyncMode,

    /// Indent continuation lines of multi-line snippets to the insertion line
    #[serde(default = "default_indent_multiline")]
    pub indent_multiline: bool,

    /// VSCode-style snippet JSON files to load
    #[serde(default)]
    pub snippet_files: Vec<PathBuf>,
}

fn default_indent_multiline() -> bool {
    true
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            sync_mode: SyncMode::default(),
            indent_multiline: default_indent_multiline(),
            snippet_files: Vec::new(),
        }
    }
}

impl SnippetConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from a specific file, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Load every configured snippet file. Unreadable or malformed files are
    /// logged and skipped.
    pub fn load_snippets(&self) -> Vec<SnippetDefinition> {
        let mut snippets = Vec::new();
        for path in &self.snippet_files {
            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Failed to read snippets at {}: {}", path.display(), e);
                    continue;
                }
            };
            match load_snippet_map(&content) {
                Ok(defs) => {
                    tracing::debug!(count = defs.len(), "Loaded snippets from {}", path.display());
                    snippets.extend(defs);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse snippets at {}: {}", path.display(), e);
                }
            }
        }
        snippets
    }
}
