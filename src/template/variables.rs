//! Variable resolution for snippet instantiation.

use std::collections::HashMap;

/// Supplies values for `$NAME` variables when a snippet is instantiated.
///
/// Returning `None` keeps the variable's default text (or nothing).
pub trait VariableResolver {
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Resolver that knows no variables. Used for plain parsing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariables;

impl VariableResolver for NoVariables {
    fn resolve(&self, _name: &str) -> Option<String> {
        None
    }
}

impl VariableResolver for HashMap<String, String> {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<F> VariableResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, name: &str) -> Option<String> {
        self(name)
    }
}
