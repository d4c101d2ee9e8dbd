//! Snippet definitions and their on-disk source records.

use serde::Deserialize;
use std::cell::OnceCell;
use std::collections::BTreeMap;

use crate::template::{self, ParsedTemplate, VariableResolver};

/// A snippet body as written in a snippet file: one string, or lines joined by `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SnippetBody {
    Text(String),
    Lines(Vec<String>),
}

impl SnippetBody {
    pub fn into_text(self) -> String {
        match self {
            SnippetBody::Text(text) => text,
            SnippetBody::Lines(lines) => lines.join("\n"),
        }
    }
}

/// One entry of a VSCode-style snippet file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SnippetSource {
    pub prefix: String,
    pub body: SnippetBody,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub hidden: bool,
}

/// A registered snippet. The parsed template is computed on first use.
#[derive(Debug, Clone)]
pub struct SnippetDefinition {
    pub prefix: String,
    pub body: String,
    pub description: Option<String>,
    pub priority: i32,
    /// Hidden snippets still expand by prefix but are not offered in pickers
    pub hidden: bool,
    parsed: OnceCell<ParsedTemplate>,
}

impl SnippetDefinition {
    pub fn new(prefix: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            body: body.into(),
            description: None,
            priority: 0,
            hidden: false,
            parsed: OnceCell::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// The parsed body, memoized on this definition
    pub fn parsed(&self) -> &ParsedTemplate {
        self.parsed.get_or_init(|| template::parse(&self.body))
    }

    /// Template ready for insertion with resolved variables and indentation.
    ///
    /// Reuses the memoized parse when neither can change the result.
    pub fn instantiate(&self, resolver: &dyn VariableResolver, indent: &str) -> ParsedTemplate {
        let parsed = self.parsed();
        let indent_matters = !indent.is_empty() && parsed.text.contains('\n');
        if !parsed.has_variables() && !indent_matters {
            return parsed.clone();
        }
        template::instantiate(&self.body, resolver, indent)
    }
}

impl From<SnippetSource> for SnippetDefinition {
    fn from(source: SnippetSource) -> Self {
        Self {
            prefix: source.prefix,
            body: source.body.into_text(),
            description: source.description,
            priority: source.priority,
            hidden: source.hidden,
            parsed: OnceCell::new(),
        }
    }
}

/// Parse a VSCode-style snippet file: a JSON object of `name -> SnippetSource`.
///
/// Definitions are returned in name order so later names win duplicate prefixes
/// deterministically.
pub fn load_snippet_map(json: &str) -> Result<Vec<SnippetDefinition>, serde_json::Error> {
    let map: BTreeMap<String, SnippetSource> = serde_json::from_str(json)?;
    Ok(map.into_values().map(SnippetDefinition::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::NoVariables;
    use std::collections::HashMap;

    #[test]
    fn test_body_lines_joined_with_newline() {
        let json = r#"{
            "For loop": {
                "prefix": "for",
                "body": ["for ${1:item} in ${2:iter} {", "\t$0", "}"],
                "description": "Rust for loop"
            },
            "Print": { "prefix": "pr", "body": "println!(\"$1\");", "hidden": true }
        }"#;

        let defs = load_snippet_map(json).unwrap();
        assert_eq!(defs.len(), 2);

        let for_loop = defs.iter().find(|d| d.prefix == "for").unwrap();
        assert_eq!(for_loop.body, "for ${1:item} in ${2:iter} {\n\t$0\n}");
        assert_eq!(for_loop.description.as_deref(), Some("Rust for loop"));
        assert!(!for_loop.hidden);

        let print = defs.iter().find(|d| d.prefix == "pr").unwrap();
        assert!(print.hidden);
        assert_eq!(print.priority, 0);
    }

    #[test]
    fn test_invalid_snippet_file() {
        assert!(load_snippet_map(r#"{ "x": { "body": "no prefix" } }"#).is_err());
        assert!(load_snippet_map("not json").is_err());
    }

    #[test]
    fn test_parsed_is_memoized() {
        let def = SnippetDefinition::new("fn", "fn $1() {}");
        let first: *const ParsedTemplate = def.parsed();
        let second: *const ParsedTemplate = def.parsed();
        assert_eq!(first, second);
        assert_eq!(def.parsed().text, "fn () {}");
    }

    #[test]
    fn test_instantiate_with_indent_and_variables() {
        let def = SnippetDefinition::new("impl", "impl $TYPE {\n$0\n}");
        let mut vars = HashMap::new();
        vars.insert("TYPE".to_string(), "Foo".to_string());

        let parsed = def.instantiate(&vars, "  ");
        assert_eq!(parsed.text, "impl Foo {\n  \n  }");

        // Plain bodies reuse the memoized parse
        let plain = SnippetDefinition::new("x", "just $1");
        assert_eq!(plain.instantiate(&NoVariables, "    "), *plain.parsed());
    }
}
