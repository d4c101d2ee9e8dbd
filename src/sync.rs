//! Reference synchronization.
//!
//! When a reference stop is edited, its text is copied to every other stop of
//! the same group in one atomic, `Sync`-tagged transaction, and the session
//! offsets are recomputed from the applied edits.
//!
//! Deferred syncs go through a one-shot continuation:
//!
//! ```text
//! Idle --request--> Scheduled --tick--> Settling --tick--> Idle
//! ```
//!
//! Requests arriving while not `Idle` are dropped, not queued.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::editable::{ChangeSet, EditBatch, EditTag, EditorSurface, TextEdit};
use crate::session::{remap_stops, LiveStop, SessionEffect, SessionId, SessionStack};

/// When reference groups are synchronized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// After every qualifying edit inside the active reference stop
    Realtime,
    /// Once, when navigation leaves the stop
    #[default]
    OnJump,
}

/// Why a sync did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoSession,
    /// The current stop is not part of a reference group
    NotReference,
    NoLinkedStops,
    /// Another sync has not cleared yet
    InFlight,
    /// Every member already holds the authoritative text
    UpToDate,
    /// A deferred sync whose operation or session was superseded
    Stale,
    SurfaceUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Applied { op_id: u64, replaced: usize },
    Scheduled { op_id: u64 },
    Skipped(SkipReason),
}

impl SyncOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, SyncOutcome::Applied { .. })
    }
}

/// A computed synchronization for the innermost session entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    /// Depth of the entry being synchronized
    pub depth: usize,
    /// Authoritative range in pre-sync coordinates
    pub authoritative: Range<usize>,
    pub text: String,
    /// Replacements, highest offset first
    pub edits: Vec<TextEdit>,
    /// The entry's stops in post-sync coordinates
    pub stops: Vec<LiveStop>,
}

/// Compute the sync for the stop the selection is in, without touching the document
pub fn plan_sync<S: EditorSurface + ?Sized>(
    stack: &SessionStack,
    surface: &S,
) -> Result<SyncPlan, SkipReason> {
    let entry = stack.top().ok_or(SkipReason::NoSession)?;
    let depth = stack.len() - 1;
    let selection = surface.selection();
    let stops = entry.stops();

    let current = entry
        .current_position(selection)
        .ok_or(SkipReason::NotReference)?;
    let stop = &stops[current];
    if !stop.is_reference() {
        return Err(SkipReason::NotReference);
    }
    if stop.linked.is_empty() {
        return Err(SkipReason::NoLinkedStops);
    }

    // Typing past the nominal end is tolerated, but the range never extends
    // before the stop's start or into the next member of the group.
    let doc_len = surface.len_chars();
    let next_member = stop
        .linked
        .iter()
        .map(|&i| stops[i].start)
        .filter(|&start| start >= stop.end)
        .min()
        .unwrap_or(doc_len);
    let auth_start = stop.start.min(doc_len);
    let auth_end = stop
        .end
        .max(selection.end())
        .min(next_member)
        .min(doc_len)
        .max(auth_start);
    let authoritative = auth_start..auth_end;
    let text = surface.slice(authoritative.clone());
    let auth_len = auth_end - auth_start;

    let mut replaced: Vec<usize> = Vec::new();
    let mut edits: Vec<(usize, TextEdit)> = Vec::new();
    for &member in &stop.linked {
        let range = stops[member].range();
        if overlaps(&range, &authoritative) {
            tracing::debug!(?range, "Skipping group member inside authoritative range");
            continue;
        }
        if surface.slice(range.clone()) != text {
            replaced.push(member);
            edits.push((member, TextEdit::replace(range, text.clone())));
        }
    }

    let shift = |pos: usize, position: usize| -> usize {
        let delta: isize = edits
            .iter()
            .filter(|(member, edit)| edit.from < pos || (edit.from == pos && *member < position))
            .map(|(_, edit)| edit.delta())
            .sum();
        (pos as isize + delta).max(0) as usize
    };

    let new_stops = stops
        .iter()
        .enumerate()
        .map(|(position, s)| {
            let start = shift(s.start, position);
            let end = if position == current || replaced.contains(&position) {
                start + auth_len
            } else {
                shift(s.end, position).max(start)
            };
            LiveStop {
                start,
                end,
                ..s.clone()
            }
        })
        .collect();

    edits.sort_by(|a, b| b.1.from.cmp(&a.1.from));

    Ok(SyncPlan {
        depth,
        authoritative,
        text,
        edits: edits.into_iter().map(|(_, edit)| edit).collect(),
        stops: new_stops,
    })
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    if a.start == a.end {
        return b.start < a.start && a.start < b.end;
    }
    a.start < b.end && b.start < a.end
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingSync {
    op_id: u64,
    session: SessionId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Scheduled(PendingSync),
    /// A sync transaction was dispatched and has not cleared yet
    Settling {
        op_id: u64,
    },
}

/// Guarded executor for reference synchronization.
#[derive(Debug, Clone, Default)]
pub struct SyncEngine {
    phase: Phase,
    latest_op_id: u64,
}

impl SyncEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// True from dispatch until the settling tick
    pub fn in_flight(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// The most recently issued operation id
    pub fn latest_op_id(&self) -> u64 {
        self.latest_op_id
    }

    fn issue(&mut self) -> u64 {
        self.latest_op_id += 1;
        self.latest_op_id
    }

    /// Schedule a sync for the next tick. Dropped when one is already in flight.
    pub fn request(&mut self, stack: &SessionStack) -> SyncOutcome {
        if self.in_flight() {
            tracing::trace!("Dropping sync request, previous sync in flight");
            return SyncOutcome::Skipped(SkipReason::InFlight);
        }
        let Some(top) = stack.top() else {
            return SyncOutcome::Skipped(SkipReason::NoSession);
        };

        let op_id = self.issue();
        self.phase = Phase::Scheduled(PendingSync {
            op_id,
            session: top.id(),
        });
        tracing::debug!(op_id, "sync scheduled");
        SyncOutcome::Scheduled { op_id }
    }

    /// Synchronize immediately. A no-op while another sync is in flight.
    pub fn sync_now<S: EditorSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        stack: &mut SessionStack,
    ) -> SyncOutcome {
        if self.in_flight() {
            tracing::trace!("Skipping sync, previous sync in flight");
            return SyncOutcome::Skipped(SkipReason::InFlight);
        }
        let op_id = self.issue();
        self.run(op_id, surface, stack)
    }

    /// Settle any outstanding sync and synchronize immediately.
    ///
    /// Used before navigation leaves a reference stop, where no host update is
    /// in progress.
    pub fn flush<S: EditorSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        stack: &mut SessionStack,
    ) -> SyncOutcome {
        match self.phase {
            Phase::Scheduled(pending) if self.is_current(pending, stack) => {
                self.run(pending.op_id, surface, stack)
            }
            _ => {
                self.phase = Phase::Idle;
                self.sync_now(surface, stack)
            }
        }
    }

    /// Advance the deferred continuation by one scheduling tick.
    /// Returns the outcome when a scheduled sync ran or was cancelled.
    pub fn tick<S: EditorSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        stack: &mut SessionStack,
    ) -> Option<SyncOutcome> {
        match self.phase {
            Phase::Idle => None,
            Phase::Scheduled(pending) => {
                if !self.is_current(pending, stack) {
                    tracing::debug!(op_id = pending.op_id, "Cancelling stale sync");
                    self.phase = Phase::Idle;
                    return Some(SyncOutcome::Skipped(SkipReason::Stale));
                }
                let outcome = self.run(pending.op_id, surface, stack);
                // A skipped sync dispatched nothing, so there is nothing to settle
                if !outcome.is_applied() {
                    self.phase = Phase::Idle;
                }
                Some(outcome)
            }
            Phase::Settling { op_id } => {
                tracing::trace!(op_id, "sync settled");
                self.phase = Phase::Idle;
                None
            }
        }
    }

    /// Abandon any pending sync. Its continuation will find itself stale.
    pub fn cancel(&mut self) {
        self.issue();
        self.phase = Phase::Idle;
    }

    fn is_current(&self, pending: PendingSync, stack: &SessionStack) -> bool {
        pending.op_id == self.latest_op_id && stack.top().map(|e| e.id()) == Some(pending.session)
    }

    fn run<S: EditorSurface + ?Sized>(
        &mut self,
        op_id: u64,
        surface: &mut S,
        stack: &mut SessionStack,
    ) -> SyncOutcome {
        self.phase = Phase::Idle;

        let plan = match plan_sync(stack, surface) {
            Ok(plan) => plan,
            Err(reason) => {
                tracing::trace!(op_id, ?reason, "sync skipped");
                return SyncOutcome::Skipped(reason);
            }
        };

        let top_changed = plan
            .stops
            .iter()
            .zip(stack.top().map(|e| e.stops()).unwrap_or_default())
            .any(|(new, old)| new.range() != old.range());

        if plan.edits.is_empty() {
            if top_changed {
                stack.apply(SessionEffect::Replace {
                    depth: plan.depth,
                    stops: plan.stops,
                });
            }
            return SyncOutcome::Skipped(SkipReason::UpToDate);
        }

        let replaced = plan.edits.len();
        let change = match surface.apply(EditBatch::new(plan.edits, EditTag::Sync(op_id))) {
            Ok(change) => change,
            Err(err) => {
                tracing::warn!(op_id, "Reference sync failed: {:#}", err);
                return SyncOutcome::Skipped(SkipReason::SurfaceUnavailable);
            }
        };

        self.remap_outer(stack, plan.depth, &change, surface.len_chars());
        stack.apply(SessionEffect::Replace {
            depth: plan.depth,
            stops: plan.stops,
        });
        self.phase = Phase::Settling { op_id };

        tracing::debug!(op_id, replaced, text = %plan.text, "reference group synchronized");
        SyncOutcome::Applied { op_id, replaced }
    }

    fn remap_outer(&self, stack: &mut SessionStack, depth: usize, change: &ChangeSet, doc_len: usize) {
        let effects: Vec<SessionEffect> = stack.entries()[..depth]
            .iter()
            .enumerate()
            .map(|(d, entry)| SessionEffect::Replace {
                depth: d,
                stops: remap_stops(entry.stops(), entry.current_index(), change, doc_len),
            })
            .collect();
        for effect in effects {
            stack.apply(effect);
        }
    }
}
