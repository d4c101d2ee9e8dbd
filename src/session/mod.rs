//! Session stack and position remapper.
//!
//! Each inserted snippet pushes a [`SessionEntry`] holding its live tab stops in
//! absolute document offsets. Entries nest: a snippet expanded inside another
//! snippet's stop pushes on top of it. All mutation goes through
//! [`SessionEffect`]s so every transition is attributable and testable.

mod effect;
mod remap;
mod stack;
mod stop;

pub use effect::SessionEffect;
pub use remap::{remap_effects, remap_stack, remap_stops};
pub use stack::{SessionEntry, SessionId, SessionStack};
pub use stop::{normalize_stops, LiveStop};
