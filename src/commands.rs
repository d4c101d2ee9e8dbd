//! Command types for the Elm-style architecture
//!
//! Commands represent side effects the host performs after an update.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Document text or selection changed
    Redraw,
    /// Deliver `SnippetMsg::Tick` on the next scheduling tick, after the
    /// current host update has finished
    ScheduleTick,
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Create a batch of commands
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        Cmd::Batch(cmds)
    }

    /// Check if this command requires a redraw
    pub fn needs_redraw(&self) -> bool {
        match self {
            Cmd::Redraw => true,
            Cmd::ScheduleTick => false,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.needs_redraw()),
        }
    }

    /// Check if the host must deliver a tick
    pub fn needs_tick(&self) -> bool {
        match self {
            Cmd::Redraw => false,
            Cmd::ScheduleTick => true,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.needs_tick()),
        }
    }
}
