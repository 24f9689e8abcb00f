//! File browser and editor handlers

use std::time::Instant;

use boxdesk_core::prelude::*;
use boxdesk_core::CreateKind;

use crate::state::WorkspaceState;

use super::{UpdateAction, UpdateResult};

pub fn handle_refresh(state: &mut WorkspaceState, now: Instant) -> UpdateResult {
    // An explicit refresh supersedes any debounced one
    state.refresh.cancel();
    UpdateResult::action(UpdateAction::Send(state.files.request_listing(now)))
}

pub fn handle_open(state: &mut WorkspaceState, path: String, now: Instant) -> UpdateResult {
    UpdateResult::action(UpdateAction::Send(state.files.open(path, now)))
}

pub fn handle_delete(state: &mut WorkspaceState, path: String, now: Instant) -> UpdateResult {
    info!("Deleting {}", path);
    UpdateResult::action(UpdateAction::Send(state.files.delete(path, now)))
}

pub fn handle_download(state: &mut WorkspaceState, path: String, now: Instant) -> UpdateResult {
    UpdateResult::action(UpdateAction::Send(state.files.download(path, now)))
}

pub fn handle_begin_create(state: &mut WorkspaceState, kind: CreateKind) -> UpdateResult {
    state.pending_create = Some(kind);
    UpdateResult::none()
}

/// Submit the inline name entry. Surrounding whitespace is trimmed and an
/// empty name cancels.
pub fn handle_submit_create(state: &mut WorkspaceState, name: &str) -> UpdateResult {
    let Some(kind) = state.pending_create.take() else {
        debug!("Ignoring create submit with no entry open");
        return UpdateResult::none();
    };

    let name = name.trim();
    if name.is_empty() {
        return UpdateResult::none();
    }

    info!("Creating {} {}", kind, name);
    UpdateResult::action(UpdateAction::Send(state.files.create(name, kind)))
}

pub fn handle_cancel_create(state: &mut WorkspaceState) -> UpdateResult {
    state.pending_create = None;
    UpdateResult::none()
}

pub fn handle_editor_changed(state: &mut WorkspaceState, content: String) -> UpdateResult {
    match state.files.on_local_edit(content) {
        Some(edit) => UpdateResult::action(UpdateAction::Send(edit)),
        None => UpdateResult::none(),
    }
}
