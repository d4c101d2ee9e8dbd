//! Fail-soft recursive parser for snippet bodies.

use std::collections::{BTreeMap, HashSet};

use super::variables::{NoVariables, VariableResolver};
use super::{GroupId, ParsedTemplate, StopKind, TabStop, Variable};

/// Parse a snippet body without resolving variables or adding indentation.
///
/// Deterministic and total: malformed fragments degrade to literal text.
pub fn parse(body: &str) -> ParsedTemplate {
    TemplateParser::new(body).parse()
}

/// Parse a snippet body for insertion: variables are resolved through
/// `resolver` and every produced newline is followed by `indent`.
pub fn instantiate(body: &str, resolver: &dyn VariableResolver, indent: &str) -> ParsedTemplate {
    TemplateParser::new(body)
        .with_resolver(resolver)
        .with_indent(indent)
        .parse()
}

/// Deepest `${...}` nesting parsed as structure; deeper forms stay literal.
const MAX_NESTING: usize = 32;

/// Tab stop as collected during parsing, before grouping.
#[derive(Debug, Clone)]
struct RawStop {
    index: u32,
    start: usize,
    end: usize,
    choices: Option<Vec<String>>,
}

/// Parser state that can be rolled back when a `$` form turns out malformed.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    pos: usize,
    text_bytes: usize,
    len: usize,
    stops: usize,
    variables: usize,
}

/// Configurable snippet body parser.
pub struct TemplateParser<'a> {
    chars: Vec<char>,
    pos: usize,
    /// Produced text
    text: String,
    /// Produced text length in chars
    len: usize,
    stops: Vec<RawStop>,
    variables: Vec<Variable>,
    resolver: &'a dyn VariableResolver,
    indent: &'a str,
    /// Current `${...}` nesting depth
    depth: usize,
    /// Positions of `$`s already known to be malformed
    failed: HashSet<usize>,
}

impl<'a> TemplateParser<'a> {
    pub fn new(body: &str) -> Self {
        Self {
            chars: body.chars().collect(),
            pos: 0,
            text: String::with_capacity(body.len()),
            len: 0,
            stops: Vec::new(),
            variables: Vec::new(),
            resolver: &NoVariables,
            indent: "",
            depth: 0,
            failed: HashSet::new(),
        }
    }

    pub fn with_resolver(mut self, resolver: &'a dyn VariableResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Indentation appended after every produced newline
    pub fn with_indent(mut self, indent: &'a str) -> Self {
        self.indent = indent;
        self
    }

    pub fn parse(mut self) -> ParsedTemplate {
        self.parse_sequence(None);
        self.finish()
    }

    // =========================================================================
    // Output helpers
    // =========================================================================

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn emit(&mut self, ch: char) {
        self.text.push(ch);
        self.len += 1;
        if ch == '\n' && !self.indent.is_empty() {
            self.text.push_str(self.indent);
            self.len += self.indent.chars().count();
        }
    }

    fn emit_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.emit(ch);
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            text_bytes: self.text.len(),
            len: self.len,
            stops: self.stops.len(),
            variables: self.variables.len(),
        }
    }

    fn restore(&mut self, cp: Checkpoint) {
        self.pos = cp.pos;
        self.text.truncate(cp.text_bytes);
        self.len = cp.len;
        self.stops.truncate(cp.stops);
        self.variables.truncate(cp.variables);
    }

    // =========================================================================
    // Grammar
    // =========================================================================

    /// Consume input until `terminator` (unescaped, at this nesting level) or EOF.
    ///
    /// Returns true when the terminator was found and consumed. At top level
    /// (`terminator == None`) reaching EOF is success.
    fn parse_sequence(&mut self, terminator: Option<char>) -> bool {
        loop {
            let Some(ch) = self.peek() else {
                return terminator.is_none();
            };

            if Some(ch) == terminator {
                self.pos += 1;
                return true;
            }

            match ch {
                '\\' => self.parse_escape(),
                '$' => self.parse_dollar(),
                _ => {
                    self.emit(ch);
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_escape(&mut self) {
        match self.chars.get(self.pos + 1).copied() {
            Some(escaped @ ('$' | '{' | '}' | '\\')) => {
                self.emit(escaped);
                self.pos += 2;
            }
            _ => {
                self.emit('\\');
                self.pos += 1;
            }
        }
    }

    /// Whether a `$` form parses depends only on the input after it, so a
    /// failure is remembered and never retried after rolling back an
    /// enclosing form. Failures at the nesting cap itself are not remembered.
    fn parse_dollar(&mut self) {
        let cp = self.checkpoint();
        if self.failed.contains(&cp.pos) {
            self.emit('$');
            self.pos += 1;
            return;
        }

        self.pos += 1;
        if !self.parse_dollar_body() {
            self.restore(cp);
            if self.depth < MAX_NESTING {
                self.failed.insert(cp.pos);
            }
            self.emit('$');
            self.pos = cp.pos + 1;
        }
    }

    /// Parse what follows a `$`. Returns false for malformed input; the caller
    /// rolls back everything produced since the `$`.
    fn parse_dollar_body(&mut self) -> bool {
        match self.peek() {
            Some(ch) if ch.is_ascii_digit() => match self.read_index() {
                Some(index) => {
                    self.push_stop(index, self.len, None);
                    true
                }
                None => false,
            },
            Some(ch) if is_name_char(ch) => {
                let name = self.read_name();
                self.push_variable(name);
                true
            }
            Some('{') if self.depth < MAX_NESTING => {
                self.pos += 1;
                self.depth += 1;
                let parsed = self.parse_braced();
                self.depth -= 1;
                parsed
            }
            _ => false,
        }
    }

    /// Parse the inside of `${...}` after the opening brace.
    fn parse_braced(&mut self) -> bool {
        match self.peek() {
            Some(ch) if ch.is_ascii_digit() => {
                let Some(index) = self.read_index() else {
                    return false;
                };
                let start = self.len;
                match self.peek() {
                    Some('}') => {
                        self.pos += 1;
                        self.push_stop(index, start, None);
                        true
                    }
                    Some(':') => {
                        self.pos += 1;
                        if !self.parse_sequence(Some('}')) {
                            return false;
                        }
                        self.push_stop(index, start, None);
                        true
                    }
                    Some('|') => {
                        self.pos += 1;
                        let Some(choices) = self.read_choices() else {
                            return false;
                        };
                        self.emit_str(&choices[0]);
                        self.push_stop(index, start, Some(choices));
                        true
                    }
                    _ => false,
                }
            }
            Some(ch) if is_name_char(ch) => {
                let name = self.read_name();
                match self.peek() {
                    Some('}') => {
                        self.pos += 1;
                        self.push_variable(name);
                        true
                    }
                    Some(':') => {
                        self.pos += 1;
                        let before_default = self.checkpoint();
                        if !self.parse_sequence(Some('}')) {
                            return false;
                        }
                        self.resolve_variable(name, before_default);
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Digits at the cursor as a tab-stop index; None on overflow.
    fn read_index(&mut self) -> Option<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits.parse().ok()
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_name_char) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Read `a,b,c|}` after the opening pipe. Commas and pipes may be escaped.
    fn read_choices(&mut self) -> Option<Vec<String>> {
        let mut choices = Vec::new();
        let mut current = String::new();

        loop {
            let ch = self.peek()?;
            self.pos += 1;
            match ch {
                '\\' => match self.peek() {
                    Some(escaped @ (',' | '|' | '\\' | '$' | '}')) => {
                        current.push(escaped);
                        self.pos += 1;
                    }
                    _ => current.push('\\'),
                },
                ',' => choices.push(std::mem::take(&mut current)),
                '|' => {
                    choices.push(std::mem::take(&mut current));
                    break;
                }
                _ => current.push(ch),
            }
        }

        if self.peek() != Some('}') {
            return None;
        }
        self.pos += 1;

        // `${1||}` has no choices at all
        if choices.len() == 1 && choices[0].is_empty() {
            return None;
        }
        Some(choices)
    }

    fn push_stop(&mut self, index: u32, start: usize, choices: Option<Vec<String>>) {
        self.stops.push(RawStop {
            index,
            start,
            end: self.len,
            choices,
        });
    }

    /// Variable without a default: the resolved value, or nothing.
    fn push_variable(&mut self, name: String) {
        let start = self.len;
        if let Some(value) = self.resolver.resolve(&name) {
            self.emit_str(&value);
        }
        self.variables.push(Variable {
            name,
            start,
            end: self.len,
            default_value: None,
        });
    }

    /// Variable whose default has already been produced since `before_default`.
    /// A resolved value replaces the default text, along with any stops and
    /// variables parsed inside it.
    fn resolve_variable(&mut self, name: String, before_default: Checkpoint) {
        let start = before_default.len;
        let default = self.text[before_default.text_bytes..].to_string();
        if let Some(value) = self.resolver.resolve(&name) {
            let pos = self.pos;
            self.restore(before_default);
            self.pos = pos;
            self.emit_str(&value);
        }
        self.variables.push(Variable {
            name,
            start,
            end: self.len,
            default_value: Some(default),
        });
    }

    // =========================================================================
    // Post-processing
    // =========================================================================

    fn finish(self) -> ParsedTemplate {
        let len = self.len;
        let mut raw = self.stops;
        raw.sort_by_key(|s| (s.index, s.start));

        // Only the first exit stop counts; later `$0`s contribute text only
        let mut seen_exit = false;
        raw.retain(|s| {
            if s.index != 0 {
                return true;
            }
            let keep = !seen_exit;
            seen_exit = true;
            keep
        });

        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for stop in &raw {
            *counts.entry(stop.index).or_default() += 1;
        }

        let mut groups: BTreeMap<u32, GroupId> = BTreeMap::new();
        for (index, count) in &counts {
            if *count > 1 {
                let id = GroupId(groups.len() as u32);
                groups.insert(*index, id);
            }
        }

        let mut tab_stops: Vec<TabStop> = raw
            .into_iter()
            .map(|s| TabStop {
                index: s.index,
                start: s.start,
                end: s.end,
                choices: s.choices,
                kind: groups
                    .get(&s.index)
                    .map_or(StopKind::Standard, |g| StopKind::Reference(*g)),
            })
            .collect();

        if !seen_exit {
            tab_stops.push(TabStop {
                index: 0,
                start: len,
                end: len,
                choices: None,
                kind: StopKind::Standard,
            });
        }

        tab_stops.sort_by_key(|s| (s.index, s.start));

        ParsedTemplate {
            text: self.text,
            tab_stops,
            variables: self.variables,
        }
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
