//! Snippet engine state for one editor surface

use std::collections::HashMap;

use crate::config::SnippetConfig;
use crate::navigation::SnippetController;
use crate::prefix_index::PrefixIndex;
use crate::snippet::SnippetDefinition;

/// Everything the update loop needs besides the surface itself
#[derive(Debug, Clone)]
pub struct SnippetModel {
    pub config: SnippetConfig,
    pub index: PrefixIndex,
    pub controller: SnippetController,
    /// Values for `$NAME` variables (e.g. `TM_FILENAME`)
    pub variables: HashMap<String, String>,
}

impl SnippetModel {
    pub fn new(config: SnippetConfig) -> Self {
        Self {
            controller: SnippetController::new(&config),
            config,
            index: PrefixIndex::default(),
            variables: HashMap::new(),
        }
    }

    /// Create a model and load the snippet files named in `config` plus any in
    /// the user snippets directory
    pub fn load(config: SnippetConfig) -> Self {
        let mut model = Self::new(config);
        let mut files = crate::config_paths::snippet_files();
        files.extend(model.config.snippet_files.iter().cloned());

        let sources = SnippetConfig {
            snippet_files: files,
            ..model.config.clone()
        };
        model.set_snippets(sources.load_snippets());
        model
    }

    pub fn with_snippets(mut self, snippets: impl IntoIterator<Item = SnippetDefinition>) -> Self {
        self.set_snippets(snippets);
        self
    }

    /// Replace the registered snippets and rebuild the prefix index
    pub fn set_snippets(&mut self, snippets: impl IntoIterator<Item = SnippetDefinition>) {
        self.index = PrefixIndex::build(snippets);
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }
}

impl Default for SnippetModel {
    fn default() -> Self {
        Self::new(SnippetConfig::default())
    }
}
