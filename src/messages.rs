//! Message types for the Elm-style architecture
//!
//! All snippet state changes flow through these message types.

use crate::editable::ChangeSet;

/// Snippet engine messages
#[derive(Debug, Clone)]
pub enum SnippetMsg {
    /// Expand the registered prefix ending at the cursor (Tab)
    Expand,
    /// Insert the snippet registered under this prefix over the selection
    Insert(String),
    /// Move to the next tab stop (Tab while a session is active)
    JumpNext,
    /// Move to the previous tab stop (Shift+Tab)
    JumpPrev,
    /// Replace the current stop with its next choice
    CycleChoice,
    /// Leave every active snippet session (Escape)
    ForceExit,
    /// The host applied a change to the document
    Changed(ChangeSet),
    /// Scheduling tick requested by `Cmd::ScheduleTick`
    Tick,
}

impl SnippetMsg {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            SnippetMsg::Expand => "expand",
            SnippetMsg::Insert(_) => "insert",
            SnippetMsg::JumpNext => "jump-next",
            SnippetMsg::JumpPrev => "jump-prev",
            SnippetMsg::CycleChoice => "cycle-choice",
            SnippetMsg::ForceExit => "force-exit",
            SnippetMsg::Changed(_) => "changed",
            SnippetMsg::Tick => "tick",
        }
    }
}
