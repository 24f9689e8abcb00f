//! Startup restore, layout reset and panel resizing

use std::time::Instant;

use boxdesk_core::prelude::*;

use crate::layout::{PanelLayout, WorkspaceSnapshot};
use crate::state::{WorkspacePhase, WorkspaceState};

use super::{persist, UpdateAction, UpdateResult};

/// Run the startup protocol.
///
/// Without a snapshot one default session is opened. Otherwise panel sizes
/// are applied, each stored session is reopened under its original id in
/// order, and the stored active id is activated if it is among them.
pub fn handle_restore(
    state: &mut WorkspaceState,
    snapshot: Option<WorkspaceSnapshot>,
    now: Instant,
) -> UpdateResult {
    let mut actions = Vec::new();

    if let Some(snapshot) = snapshot {
        state.panels = snapshot.panels();

        for tab in snapshot.open_tabs {
            match state
                .registry
                .open(&state.workspace, Some(tab.id), Some(tab.label))
            {
                Ok((_, attach)) => actions.push(UpdateAction::Send(attach)),
                Err(e) => warn!("Skipping stored tab: {}", e),
            }
        }

        if let Some(active) = snapshot.active_tab_id {
            if let Err(e) = state.registry.activate(&active) {
                debug!("Stored active tab not restored: {}", e);
            }
        }
        info!("Restored layout with {} terminal(s)", state.registry.len());
    }

    if state.registry.is_empty() {
        match state.registry.open(&state.workspace, None, None) {
            Ok((_, attach)) => actions.push(UpdateAction::Send(attach)),
            Err(e) => warn!("Failed to open default terminal: {}", e),
        }
    }

    actions.push(UpdateAction::Send(state.files.request_listing(now)));
    actions.push(persist(state));
    state.phase = WorkspacePhase::Running;

    UpdateResult::actions(actions)
}

/// Delete the stored layout and cold-start from defaults.
pub fn handle_reset(state: &mut WorkspaceState, now: Instant) -> UpdateResult {
    info!("Resetting workspace layout");
    state.registry.close_all();
    state.panels = PanelLayout::default();
    state.pending_create = None;
    state.files.reset();
    state.refresh.cancel();

    let mut result = handle_restore(state, None, now);
    result.actions.insert(0, UpdateAction::ClearLayout);
    result
}

pub fn handle_resize_sidebar(state: &mut WorkspaceState, width: u32) -> UpdateResult {
    state.panels.sidebar_width = Some(width);
    UpdateResult::action(persist(state))
}

pub fn handle_resize_editor(state: &mut WorkspaceState, height: u32) -> UpdateResult {
    state.panels.editor_height = Some(height);
    UpdateResult::action(persist(state))
}

pub fn handle_resize_end(state: &mut WorkspaceState) -> UpdateResult {
    UpdateResult::action(persist(state))
}
