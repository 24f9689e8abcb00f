//! Terminal tab handlers

use std::time::Instant;

use boxdesk_core::prelude::*;
use boxdesk_core::SessionId;

use crate::state::WorkspaceState;

use super::{persist, UpdateAction, UpdateResult};

/// Open a fresh session; it becomes active.
pub fn handle_open(state: &mut WorkspaceState) -> UpdateResult {
    match state.registry.open(&state.workspace, None, None) {
        Ok((id, attach)) => {
            info!("Opened terminal {}", id);
            UpdateResult::actions(vec![UpdateAction::Send(attach), persist(state)])
        }
        Err(e) => {
            warn!("Failed to open terminal: {}", e);
            UpdateResult::none()
        }
    }
}

pub fn handle_activate(state: &mut WorkspaceState, id: &SessionId) -> UpdateResult {
    if state.registry.active_id() == Some(id) {
        return UpdateResult::none();
    }
    match state.registry.activate(id) {
        Ok(()) => UpdateResult::action(persist(state)),
        Err(e) => {
            debug!("Ignoring activate: {}", e);
            UpdateResult::none()
        }
    }
}

pub fn handle_close(state: &mut WorkspaceState, id: &SessionId) -> UpdateResult {
    match state.registry.close(id) {
        Ok(()) => {
            info!("Closed terminal {}", id);
            UpdateResult::action(persist(state))
        }
        Err(e) => {
            debug!("Ignoring close: {}", e);
            UpdateResult::none()
        }
    }
}

/// Forward keystrokes and reschedule the file list refresh, since shell
/// commands may change the filesystem.
pub fn handle_keys(
    state: &mut WorkspaceState,
    id: &SessionId,
    data: String,
    now: Instant,
) -> UpdateResult {
    match state.registry.route_input(&state.workspace, id, data) {
        Ok(message) => {
            state.refresh.trigger(now);
            UpdateResult::action(UpdateAction::Send(message))
        }
        Err(e) => {
            debug!("Dropping keystrokes: {}", e);
            UpdateResult::none()
        }
    }
}
