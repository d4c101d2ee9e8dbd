//! Snippet template parsing.
//!
//! Converts a VSCode-style snippet body into plain text plus typed tab stops and
//! variable references. Offsets are character offsets into the *produced* text.
//!
//! Supported forms:
//! - `$N`, `${N}`, `${N:default}` (defaults may nest placeholders and variables)
//! - `${N|one,two,three|}` (choice list, first choice is inserted)
//! - `$NAME`, `${NAME}`, `${NAME:default}` with NAME matching `[A-Za-z0-9_]+`
//! - `\$`, `\{`, `\}`, `\\` escapes
//!
//! Parsing never fails: a `$` that does not start a valid form is emitted literally.

mod parser;
mod variables;

use serde::Serialize;

pub use parser::{instantiate, parse, TemplateParser};
pub use variables::{NoVariables, VariableResolver};

/// Identifies a set of tab stops sharing one index within a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupId(pub u32);

/// Whether a tab stop stands alone or mirrors other occurrences of its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "group", rename_all = "snake_case")]
pub enum StopKind {
    /// The index occurs exactly once
    Standard,
    /// The index occurs more than once; all occurrences share the group
    Reference(GroupId),
}

impl StopKind {
    pub fn group(&self) -> Option<GroupId> {
        match self {
            StopKind::Standard => None,
            StopKind::Reference(group) => Some(*group),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, StopKind::Reference(_))
    }
}

/// A navigable position or range in the produced text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabStop {
    pub index: u32,
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(flatten)]
    pub kind: StopKind,
}

impl TabStop {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A variable reference in the produced text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub name: String,
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// Result of parsing one snippet body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTemplate {
    pub text: String,
    /// Sorted by (index, start); always contains exactly one index-0 stop
    pub tab_stops: Vec<TabStop>,
    pub variables: Vec<Variable>,
}

impl ParsedTemplate {
    /// Produced text length in characters
    pub fn len_chars(&self) -> usize {
        self.text.chars().count()
    }

    /// All stops with the given index, in document order
    pub fn stops_with_index(&self, index: u32) -> impl Iterator<Item = &TabStop> {
        self.tab_stops.iter().filter(move |s| s.index == index)
    }

    /// The terminal stop
    pub fn exit_stop(&self) -> Option<&TabStop> {
        self.stops_with_index(0).next()
    }

    /// Smallest index greater than zero, i.e. the first stop navigation selects
    pub fn first_index(&self) -> Option<u32> {
        self.tab_stops
            .iter()
            .map(|s| s.index)
            .filter(|&i| i > 0)
            .min()
    }

    pub fn has_variables(&self) -> bool {
        !self.variables.is_empty()
    }
}
