//! The closed set of session stack transitions.
//!
//! Every change to the [`SessionStack`](super::SessionStack) is one of these
//! effects, applied through [`SessionStack::apply`](super::SessionStack::apply).

use super::stop::LiveStop;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    /// Start a new (possibly nested) expansion
    Push {
        current_index: u32,
        stops: Vec<LiveStop>,
    },
    /// Finish the innermost expansion
    Pop,
    /// Move the innermost expansion to another tab-stop index
    UpdateIndex(u32),
    /// Swap in new stop offsets for the entry at `depth` (0 = outermost)
    Replace { depth: usize, stops: Vec<LiveStop> },
    /// Drop every expansion
    ClearAll,
}

impl SessionEffect {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            SessionEffect::Push { .. } => "push",
            SessionEffect::Pop => "pop",
            SessionEffect::UpdateIndex(_) => "update-index",
            SessionEffect::Replace { .. } => "replace",
            SessionEffect::ClearAll => "clear-all",
        }
    }
}
