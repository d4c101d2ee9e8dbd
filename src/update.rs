//! Update function for the Elm-style architecture
//!
//! All snippet state transitions flow through [`update`].

use crate::commands::Cmd;
use crate::editable::EditorSurface;
use crate::messages::SnippetMsg;
use crate::model::SnippetModel;

/// Apply one message to the model and the surface it drives
pub fn update<S: EditorSurface + ?Sized>(
    model: &mut SnippetModel,
    surface: &mut S,
    msg: SnippetMsg,
) -> Option<Cmd> {
    let _span = tracing::debug_span!("snippet_update", msg = msg.name()).entered();

    let changed = match msg {
        SnippetMsg::Expand => model
            .controller
            .expand_at_cursor(surface, &model.index, &model.variables)
            .is_some_and(|nav| nav.succeeded()),

        SnippetMsg::Insert(prefix) => {
            let Some(snippet) = model.index.get(&prefix) else {
                tracing::debug!(prefix = %prefix, "No snippet registered for prefix");
                return None;
            };
            let range = surface.selection().as_range();
            model
                .controller
                .insert_snippet(surface, snippet, range, &model.variables)
                .succeeded()
        }

        SnippetMsg::JumpNext => model.controller.jump_next(surface).succeeded(),
        SnippetMsg::JumpPrev => model.controller.jump_prev(surface).succeeded(),
        SnippetMsg::CycleChoice => model.controller.cycle_choice(surface).succeeded(),
        SnippetMsg::ForceExit => model.controller.force_exit().succeeded(),

        SnippetMsg::Changed(change) => {
            model.controller.observe(surface, &change);
            false
        }

        SnippetMsg::Tick => model
            .controller
            .tick(surface)
            .is_some_and(|outcome| outcome.is_applied()),
    };

    let tick = model.controller.needs_tick();
    match (changed, tick) {
        (true, true) => Some(Cmd::batch(vec![Cmd::Redraw, Cmd::ScheduleTick])),
        (true, false) => Some(Cmd::Redraw),
        (false, true) => Some(Cmd::ScheduleTick),
        (false, false) => None,
    }
}
