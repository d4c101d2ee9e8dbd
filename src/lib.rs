//! Snippet engine - Elm-style snippet expansion for text editors
//!
//! This crate provides template parsing, prefix lookup, nested tab-stop
//! sessions with position remapping, reference synchronization, and a
//! navigation controller driving any [`editable::EditorSurface`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod editable;
pub mod messages;
pub mod model;
pub mod navigation;
pub mod prefix_index;
pub mod session;
pub mod snippet;
pub mod sync;
pub mod template;
pub mod tracing;
pub mod update;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::SnippetConfig;
pub use messages::SnippetMsg;
pub use model::SnippetModel;
pub use navigation::{NavReason, Navigation, SnippetController};
pub use prefix_index::{build_index, get_prefix_bounds, lookup, PrefixBounds, PrefixIndex};
pub use snippet::{SnippetDefinition, SnippetSource};
pub use sync::{SyncMode, SyncOutcome};
pub use template::{parse, ParsedTemplate, StopKind, TabStop};
