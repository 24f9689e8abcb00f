//! Main update function - handles state transitions (TEA pattern)

use std::time::Instant;

use crate::message::Message;
use crate::state::{WorkspacePhase, WorkspaceState};

use super::{channel, files, layout, terminal, UpdateAction, UpdateResult};

/// Process a message and update state.
///
/// `now` drives the debouncer and request timeouts so the whole state machine
/// runs without a clock of its own.
pub fn update(state: &mut WorkspaceState, message: Message, now: Instant) -> UpdateResult {
    match message {
        Message::Quit => {
            state.phase = WorkspacePhase::Quitting;
            UpdateResult::none()
        }

        Message::Channel(event) => channel::handle_channel_event(state, event, now),

        Message::Tick => handle_tick(state, now),

        // ─────────────────────────────────────────────────────────
        // Layout Messages
        // ─────────────────────────────────────────────────────────
        Message::Restore { snapshot } => layout::handle_restore(state, snapshot, now),
        Message::ResetLayout => layout::handle_reset(state, now),
        Message::ResizeSidebar { width } => layout::handle_resize_sidebar(state, width),
        Message::ResizeEditor { height } => layout::handle_resize_editor(state, height),
        Message::ResizeEnd => layout::handle_resize_end(state),

        // ─────────────────────────────────────────────────────────
        // Terminal Messages
        // ─────────────────────────────────────────────────────────
        Message::OpenTerminal => terminal::handle_open(state),
        Message::ActivateTerminal { id } => terminal::handle_activate(state, &id),
        Message::CloseTerminal { id } => terminal::handle_close(state, &id),
        Message::TerminalKeys { id, data } => terminal::handle_keys(state, &id, data, now),

        // ─────────────────────────────────────────────────────────
        // File Messages
        // ─────────────────────────────────────────────────────────
        Message::RefreshFiles => files::handle_refresh(state, now),
        Message::OpenFile { path } => files::handle_open(state, path, now),
        Message::DeleteFile { path } => files::handle_delete(state, path, now),
        Message::DownloadFile { path } => files::handle_download(state, path, now),
        Message::BeginCreate { kind } => files::handle_begin_create(state, kind),
        Message::SubmitCreate { name } => files::handle_submit_create(state, &name),
        Message::CancelCreate => files::handle_cancel_create(state),
        Message::EditorChanged { content } => files::handle_editor_changed(state, content),
    }
}

/// Fire the debounced refresh and expire overdue requests.
fn handle_tick(state: &mut WorkspaceState, now: Instant) -> UpdateResult {
    let mut actions = Vec::new();

    if state.refresh.poll(now) {
        actions.push(UpdateAction::Send(state.files.request_listing(now)));
    }

    let timeout = state.settings.sync.request_timeout();
    for error in state.files.expire(now, timeout) {
        tracing::warn!("{}", error);
        actions.push(UpdateAction::notify(&error));
    }

    UpdateResult::actions(actions)
}
