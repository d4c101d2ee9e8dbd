//! Snippet navigation controller.
//!
//! Ties the session stack to the host surface: inserting snippets, moving
//! between tab stops, cycling choices, and triggering reference sync either
//! from edit observation (realtime) or when navigation leaves a stop.

use std::ops::Range;

use crate::config::SnippetConfig;
use crate::editable::{ChangeSet, EditBatch, EditTag, EditorSurface, OffsetSelection, TextEdit};
use crate::prefix_index::PrefixIndex;
use crate::session::{remap_stack, LiveStop, SessionEffect, SessionId, SessionStack};
use crate::snippet::SnippetDefinition;
use crate::sync::{SyncEngine, SyncMode, SyncOutcome};
use crate::template::{ParsedTemplate, VariableResolver};

/// Why a navigation request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavReason {
    NoActiveSession,
    /// No further stop and no exit stop to wrap to
    NoMoreStops,
    NoPreviousStop,
    /// The current stop has no choice list
    NoChoices,
    SurfaceUnavailable,
}

/// Result of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// A stop with this index is now selected
    Moved { index: u32 },
    /// The session (and any enclosing sessions it fell through to) finished
    Exited,
    Unavailable(NavReason),
}

impl Navigation {
    pub fn succeeded(&self) -> bool {
        !matches!(self, Navigation::Unavailable(_))
    }

    pub fn reason(&self) -> Option<NavReason> {
        match self {
            Navigation::Unavailable(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Owns the session stack and the sync engine for one editor surface.
#[derive(Debug, Clone)]
pub struct SnippetController {
    stack: SessionStack,
    sync: SyncEngine,
    mode: SyncMode,
    indent_multiline: bool,
}

impl Default for SnippetController {
    fn default() -> Self {
        Self::new(&SnippetConfig::default())
    }
}

impl SnippetController {
    pub fn new(config: &SnippetConfig) -> Self {
        Self {
            stack: SessionStack::new(),
            sync: SyncEngine::new(),
            mode: config.sync_mode,
            indent_multiline: config.indent_multiline,
        }
    }

    pub fn with_mode(mode: SyncMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub fn stack(&self) -> &SessionStack {
        &self.stack
    }

    pub fn sync_engine(&self) -> &SyncEngine {
        &self.sync
    }

    pub fn is_active(&self) -> bool {
        !self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The stop the user is working in, for host hints
    pub fn current_stop<S: EditorSurface + ?Sized>(&self, surface: &S) -> Option<&LiveStop> {
        self.stack.top()?.current_stop(surface.selection())
    }

    /// True while a sync continuation still needs scheduling ticks
    pub fn needs_tick(&self) -> bool {
        self.sync.in_flight()
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Push a session for `template` inserted at `base`. The entry starts at
    /// its exit (index 0) until a stop is selected.
    pub fn push_session(&mut self, base: usize, template: &ParsedTemplate) -> SessionId {
        let stops = template
            .tab_stops
            .iter()
            .map(|stop| LiveStop::from_tab_stop(stop, base))
            .collect();
        self.stack.push(0, stops)
    }

    /// Replace the snippet prefix before the cursor with its expansion.
    /// Returns None when no registered prefix ends at the cursor.
    pub fn expand_at_cursor<S: EditorSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        index: &PrefixIndex,
        resolver: &dyn VariableResolver,
    ) -> Option<Navigation> {
        let selection = surface.selection();
        if !selection.is_empty() || index.is_empty() {
            return None;
        }

        let cursor = selection.head;
        let window = cursor.saturating_sub(index.bounds().max)..cursor;
        let before = surface.slice(window);
        let snippet = index.lookup(&before)?;
        let prefix_len = snippet.prefix.chars().count();

        tracing::debug!(prefix = %snippet.prefix, cursor, "expanding snippet");
        Some(self.insert_snippet(surface, snippet, cursor - prefix_len..cursor, resolver))
    }

    /// Insert `snippet` over `replace` and select its first stop
    pub fn insert_snippet<S: EditorSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        snippet: &SnippetDefinition,
        replace: Range<usize>,
        resolver: &dyn VariableResolver,
    ) -> Navigation {
        let indent = if self.indent_multiline {
            leading_indent(&surface.line_prefix(replace.start))
        } else {
            String::new()
        };
        let template = snippet.instantiate(resolver, &indent);
        self.insert_template(surface, &template, replace)
    }

    /// Insert an already-instantiated template over `replace`
    pub fn insert_template<S: EditorSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        template: &ParsedTemplate,
        replace: Range<usize>,
    ) -> Navigation {
        let base = replace.start;
        let batch = EditBatch::single(
            TextEdit::replace(replace, template.text.clone()),
            EditTag::Expansion,
        );
        let change = match surface.apply(batch) {
            Ok(change) => change,
            Err(err) => {
                tracing::warn!("Snippet insertion failed: {:#}", err);
                return Navigation::Unavailable(NavReason::SurfaceUnavailable);
            }
        };

        remap_stack(&mut self.stack, &change, surface.len_chars());
        let id = self.push_session(base, template);
        tracing::debug!(
            session = id.0,
            depth = self.stack.len(),
            stops = template.tab_stops.len(),
            "snippet inserted"
        );

        match template.first_index() {
            Some(index) => {
                self.select(surface, index);
                Navigation::Moved { index }
            }
            None => {
                // Nothing to visit: park the cursor at the exit and finish
                self.select(surface, 0);
                self.stack.apply(SessionEffect::Pop);
                Navigation::Exited
            }
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Move to the next stop, wrapping to the exit stop and falling through
    /// into enclosing sessions as inner ones finish.
    pub fn jump_next<S: EditorSurface + ?Sized>(&mut self, surface: &mut S) -> Navigation {
        if self.stack.is_empty() {
            return Navigation::Unavailable(NavReason::NoActiveSession);
        }

        let mut result = Navigation::Exited;
        while let Some(top) = self.stack.top() {
            let current = top.current_index();
            let target = if current == 0 {
                None
            } else {
                current
                    .checked_add(1)
                    .filter(|&next| top.has_index(next))
                    .or_else(|| top.has_index(0).then_some(0))
            };

            match target {
                Some(0) => {
                    self.flush_reference(surface);
                    let exit = self
                        .stack
                        .top()
                        .and_then(|top| top.first_stop(0))
                        .map(LiveStop::range)
                        .unwrap_or_default();
                    if surface.selection().spans(exit) {
                        tracing::debug!("exit stop already reached");
                        self.stack.apply(SessionEffect::Pop);
                        result = Navigation::Exited;
                        continue;
                    }
                    self.select(surface, 0);
                    return Navigation::Moved { index: 0 };
                }
                Some(index) => {
                    self.flush_reference(surface);
                    self.select(surface, index);
                    return Navigation::Moved { index };
                }
                None if current == 0 => {
                    self.stack.apply(SessionEffect::Pop);
                    result = Navigation::Exited;
                }
                None => {
                    self.flush_reference(surface);
                    self.stack.apply(SessionEffect::Pop);
                    result = Navigation::Unavailable(NavReason::NoMoreStops);
                }
            }
        }

        result
    }

    /// Move to the previous stop, index `i - 1` only. Never wraps, and never
    /// targets the exit: from stop 1 there is no previous stop.
    pub fn jump_prev<S: EditorSurface + ?Sized>(&mut self, surface: &mut S) -> Navigation {
        let Some(top) = self.stack.top() else {
            return Navigation::Unavailable(NavReason::NoActiveSession);
        };

        let target = top
            .current_index()
            .checked_sub(1)
            .filter(|&prev| prev > 0 && top.has_index(prev));
        let Some(index) = target else {
            return Navigation::Unavailable(NavReason::NoPreviousStop);
        };

        self.flush_reference(surface);
        self.select(surface, index);
        Navigation::Moved { index }
    }

    /// Replace the current stop's text with the next entry of its choice list
    pub fn cycle_choice<S: EditorSurface + ?Sized>(&mut self, surface: &mut S) -> Navigation {
        let Some(top) = self.stack.top() else {
            return Navigation::Unavailable(NavReason::NoActiveSession);
        };
        let Some(stop) = top.current_stop(surface.selection()) else {
            return Navigation::Unavailable(NavReason::NoChoices);
        };
        let Some(choices) = stop.choices.as_ref().filter(|c| !c.is_empty()) else {
            return Navigation::Unavailable(NavReason::NoChoices);
        };

        let live = surface.slice(stop.range());
        let next = choices
            .iter()
            .position(|choice| *choice == live)
            .map_or(0, |i| (i + 1) % choices.len());
        let choice = choices[next].clone();
        let (range, index, is_reference) = (stop.range(), stop.index, stop.is_reference());

        let batch = EditBatch::single(TextEdit::replace(range.clone(), choice.clone()), EditTag::Choice);
        let change = match surface.apply(batch) {
            Ok(change) => change,
            Err(err) => {
                tracing::warn!("Choice replacement failed: {:#}", err);
                return Navigation::Unavailable(NavReason::SurfaceUnavailable);
            }
        };
        remap_stack(&mut self.stack, &change, surface.len_chars());

        let chosen = range.start..range.start + choice.chars().count();
        if let Some(entry) = self.stack.top() {
            let depth = self.stack.len() - 1;
            let mut stops = entry.stops().to_vec();
            if let Some(stop) = stops
                .iter_mut()
                .find(|s| s.index == index && s.start == chosen.start)
            {
                stop.end = chosen.end;
            }
            self.stack.apply(SessionEffect::Replace { depth, stops });
        }
        surface.set_selection(OffsetSelection::range(chosen));

        tracing::debug!(index, choice = %choice, "choice cycled");
        if is_reference && self.mode == SyncMode::Realtime {
            self.sync.request(&self.stack);
        }
        Navigation::Moved { index }
    }

    /// Drop every session. Safe to call at any time.
    pub fn force_exit(&mut self) -> Navigation {
        let was_active = self.is_active();
        self.stack.apply(SessionEffect::ClearAll);
        self.sync.cancel();

        if was_active {
            Navigation::Exited
        } else {
            Navigation::Unavailable(NavReason::NoActiveSession)
        }
    }

    // =========================================================================
    // Edit observation and sync
    // =========================================================================

    /// Feed a host change notification. Remaps every session entry and, in
    /// realtime mode, schedules a sync when the edit landed in a reference stop.
    pub fn observe<S: EditorSurface + ?Sized>(
        &mut self,
        surface: &S,
        change: &ChangeSet,
    ) -> Option<SyncOutcome> {
        if self.stack.is_empty() || change.is_empty() {
            return None;
        }
        if change.tag().is_engine_owned() {
            tracing::trace!(tag = ?change.tag(), "Ignoring engine-owned change");
            return None;
        }

        remap_stack(&mut self.stack, change, surface.len_chars());

        if self.mode != SyncMode::Realtime {
            return None;
        }
        let selection = surface.selection();
        let stop = self.stack.top()?.current_stop(selection)?;
        if !stop.is_reference() || !selection.is_within(stop.range()) {
            return None;
        }
        Some(self.sync.request(&self.stack))
    }

    /// Run the deferred sync continuation
    pub fn tick<S: EditorSurface + ?Sized>(&mut self, surface: &mut S) -> Option<SyncOutcome> {
        self.sync.tick(surface, &mut self.stack)
    }

    /// Synchronize the current reference stop right away
    pub fn sync_now<S: EditorSurface + ?Sized>(&mut self, surface: &mut S) -> SyncOutcome {
        self.sync.sync_now(surface, &mut self.stack)
    }

    fn flush_reference<S: EditorSurface + ?Sized>(&mut self, surface: &mut S) {
        let on_reference = self
            .current_stop(surface)
            .is_some_and(|stop| stop.is_reference());
        if on_reference {
            let outcome = self.sync.flush(surface, &mut self.stack);
            tracing::trace!(?outcome, "sync before leaving stop");
        }
    }

    fn select<S: EditorSurface + ?Sized>(&mut self, surface: &mut S, index: u32) {
        if let Some(stop) = self.stack.top().and_then(|top| top.first_stop(index)) {
            surface.set_selection(OffsetSelection::range(stop.range()));
        }
        self.stack.apply(SessionEffect::UpdateIndex(index));
    }
}

/// Leading whitespace of a line prefix
fn leading_indent(line_prefix: &str) -> String {
    line_prefix
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}
