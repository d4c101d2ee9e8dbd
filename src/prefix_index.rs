//! Prefix trie for snippet lookup.
//!
//! The index is rebuilt wholesale whenever the registered snippet set changes.
//! Nodes live in a flat arena addressed by index.

use std::collections::HashMap;

use crate::snippet::SnippetDefinition;

/// Length bounds (in chars) over all registered prefixes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefixBounds {
    pub min: usize,
    pub max: usize,
}

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: HashMap<char, usize>,
    /// Index into `PrefixIndex::snippets` when a prefix ends here
    terminal: Option<usize>,
}

/// Character trie over snippet prefixes with longest-match lookup.
#[derive(Debug, Clone)]
pub struct PrefixIndex {
    nodes: Vec<TrieNode>,
    snippets: Vec<SnippetDefinition>,
    bounds: PrefixBounds,
    prefix_count: usize,
}

impl PrefixIndex {
    /// Build the index. On duplicate prefixes the last snippet wins.
    pub fn build(snippets: impl IntoIterator<Item = SnippetDefinition>) -> Self {
        let mut index = Self {
            nodes: vec![TrieNode::default()],
            snippets: Vec::new(),
            bounds: PrefixBounds::default(),
            prefix_count: 0,
        };

        let mut min = usize::MAX;
        let mut max = 0;

        for snippet in snippets {
            let len = snippet.prefix.chars().count();
            if len == 0 {
                tracing::debug!("Skipping snippet with empty prefix");
                continue;
            }
            min = min.min(len);
            max = max.max(len);

            let slot = index.snippets.len();
            let node = index.insert_path(&snippet.prefix);
            match index.nodes[node].terminal.replace(slot) {
                Some(_) => {
                    tracing::debug!(prefix = %snippet.prefix, "Duplicate prefix, last one wins")
                }
                None => index.prefix_count += 1,
            }
            index.snippets.push(snippet);
        }

        if index.prefix_count > 0 {
            index.bounds = PrefixBounds { min, max };
        }

        tracing::debug!(
            prefixes = index.prefix_count,
            nodes = index.nodes.len(),
            min = index.bounds.min,
            max = index.bounds.max,
            "Built prefix index"
        );

        index
    }

    /// Walk (creating as needed) the node path for `prefix`, returning the last node.
    fn insert_path(&mut self, prefix: &str) -> usize {
        let mut node = 0;
        for ch in prefix.chars() {
            node = match self.nodes[node].children.get(&ch) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[node].children.insert(ch, child);
                    child
                }
            };
        }
        node
    }

    fn find(&self, chars: &[char]) -> Option<&SnippetDefinition> {
        let mut node = 0;
        for ch in chars {
            node = *self.nodes[node].children.get(ch)?;
        }
        self.nodes[node].terminal.map(|slot| &self.snippets[slot])
    }

    /// Find the snippet whose prefix is the longest suffix of `text_before_cursor`.
    ///
    /// Tries suffix lengths from the longest registered prefix down to the
    /// shortest, so `logerr` wins over `log` for text ending in `logerr`.
    pub fn lookup(&self, text_before_cursor: &str) -> Option<&SnippetDefinition> {
        if self.prefix_count == 0 {
            return None;
        }

        let PrefixBounds { min, max } = self.bounds;
        let mut tail: Vec<char> = text_before_cursor.chars().rev().take(max).collect();
        tail.reverse();

        if tail.len() < min {
            return None;
        }

        (min..=tail.len())
            .rev()
            .find_map(|len| self.find(&tail[tail.len() - len..]))
    }

    /// Exact-prefix lookup
    pub fn get(&self, prefix: &str) -> Option<&SnippetDefinition> {
        let chars: Vec<char> = prefix.chars().collect();
        self.find(&chars)
    }

    pub fn bounds(&self) -> PrefixBounds {
        self.bounds
    }

    /// Number of distinct registered prefixes
    pub fn len(&self) -> usize {
        self.prefix_count
    }

    pub fn is_empty(&self) -> bool {
        self.prefix_count == 0
    }
}

impl Default for PrefixIndex {
    fn default() -> Self {
        Self::build(Vec::new())
    }
}

/// Build a prefix index over `snippets`
pub fn build_index(snippets: impl IntoIterator<Item = SnippetDefinition>) -> PrefixIndex {
    PrefixIndex::build(snippets)
}

/// Longest registered prefix that ends `text_before_cursor`, if any
pub fn lookup<'a>(index: &'a PrefixIndex, text_before_cursor: &str) -> Option<&'a SnippetDefinition> {
    index.lookup(text_before_cursor)
}

/// Min/max prefix lengths; `{0, 0}` for an empty index
pub fn get_prefix_bounds(index: &PrefixIndex) -> PrefixBounds {
    index.bounds()
}
