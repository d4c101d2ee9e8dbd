//! Host surface abstraction for the snippet engine.
//!
//! The snippet engine never owns the document. It talks to the host editor through
//! a small contract:
//!
//! - [`EditorSurface`]: read ranges, get/set the selection, convert positions, and
//!   apply an atomic [`EditBatch`]
//! - [`ChangeSet`]: the change descriptor returned for every batch, used to remap
//!   tab-stop offsets with [`Assoc`] (sticky-before / sticky-after) semantics
//! - [`EditTag`]: marks which transactions the engine issued itself
//! - [`RopeSurface`]: a `ropey::Rope` implementation for tests, benches, and the CLI
//!
//! # Example
//!
//! ```ignore
//! use token_snippets::editable::{EditorSurface, RopeSurface};
//!
//! let mut surface = RopeSurface::from_text("hello");
//! let change = surface.type_text("!")?;
//!
//! assert_eq!(surface.text(), "hello!");
//! assert_eq!(change.delta(), 1);
//! ```

mod change;
mod position;
mod selection;
mod surface;

pub use change::{Assoc, ChangeSet, EditBatch, EditTag, TextEdit};
pub use position::Position;
pub use selection::OffsetSelection;
pub use surface::{EditorSurface, RopeSurface};
