//! Connection changes and inbound remote messages

use std::time::Instant;

use boxdesk_channel::{ChannelEvent, ConnectionState};
use boxdesk_core::prelude::*;
use boxdesk_core::{FolderError, Inbound, OperationError, TerminalOutput};

use crate::file_sync::RequestKind;
use crate::state::WorkspaceState;

use super::{UpdateAction, UpdateResult};

pub fn handle_channel_event(
    state: &mut WorkspaceState,
    event: ChannelEvent,
    now: Instant,
) -> UpdateResult {
    match event {
        ChannelEvent::Connected => handle_connected(state, now),
        ChannelEvent::Reconnecting { attempt } => {
            state.connection = ConnectionState::Reconnecting { attempt };
            UpdateResult::none()
        }
        ChannelEvent::Disconnected => {
            state.connection = ConnectionState::Disconnected;
            UpdateResult::action(UpdateAction::Notify {
                message: format!("Lost connection to workspace {}", state.workspace),
            })
        }
        ChannelEvent::Message(inbound) => handle_inbound(state, inbound),
    }
}

/// On a reconnect the remote shells are re-attached under their ids and the
/// listing is re-fetched.
fn handle_connected(state: &mut WorkspaceState, now: Instant) -> UpdateResult {
    state.connection = ConnectionState::Connected;
    if !state.has_connected {
        state.has_connected = true;
        return UpdateResult::none();
    }

    info!("Reconnected to workspace {}", state.workspace);
    let mut actions: Vec<UpdateAction> = state
        .registry
        .reattach_all(&state.workspace)
        .into_iter()
        .map(UpdateAction::Send)
        .collect();
    actions.push(UpdateAction::Send(state.files.request_listing(now)));
    UpdateResult::actions(actions)
}

fn handle_inbound(state: &mut WorkspaceState, inbound: Inbound) -> UpdateResult {
    trace!("Inbound {}", inbound.event_name());
    match inbound {
        Inbound::TerminalOutput(output) => handle_terminal_output(state, output),

        Inbound::FileList(list) => {
            state.files.on_file_list(list);
            UpdateResult::none()
        }

        Inbound::FileContent(content) => match state.files.on_file_content(content) {
            Ok(_) => UpdateResult::none(),
            Err(e) => surface(e),
        },

        Inbound::DownloadFileResponse(payload) => match state.files.on_download(payload) {
            Ok(Some(download)) => UpdateResult::action(UpdateAction::SaveDownload(download)),
            Ok(None) => UpdateResult::none(),
            Err(e) => surface(e),
        },

        Inbound::DownloadError(report) => {
            remote_error(state, "Download", Some(RequestKind::Download), report)
        }
        Inbound::FileEditError(report) => remote_error(state, "Save", None, report),
        Inbound::DeleteError(report) => {
            remote_error(state, "Delete", Some(RequestKind::Delete), report)
        }
        Inbound::FileCreateError(report) => remote_error(state, "Create file", None, report),
        Inbound::FolderCreateError(FolderError { folder_path, error }) => remote_error(
            state,
            "Create folder",
            None,
            OperationError {
                file_path: folder_path,
                error,
            },
        ),

        Inbound::FileDeleted(ack) => {
            state.files.on_deleted(&ack.file_path);
            UpdateResult::none()
        }
        Inbound::FileSaved(ack) => {
            debug!("Saved {}", ack.file_path);
            UpdateResult::none()
        }
        Inbound::FileCreated(ack) => {
            debug!("Created file {}", ack.file_path);
            UpdateResult::none()
        }
        Inbound::FolderCreated(ack) => {
            debug!("Created folder {}", ack.folder_path);
            UpdateResult::none()
        }
    }
}

fn handle_terminal_output(state: &mut WorkspaceState, output: TerminalOutput) -> UpdateResult {
    match output.tab_id {
        Some(id) => {
            state.registry.route_output(&id, output.output.as_bytes());
        }
        None => warn!("Terminal output without a session: {}", output.output.trim_end()),
    }
    UpdateResult::none()
}

fn remote_error(
    state: &mut WorkspaceState,
    operation: &str,
    kind: Option<RequestKind>,
    report: OperationError,
) -> UpdateResult {
    match state.files.on_operation_error(operation, kind, report) {
        Some(e) => surface(e),
        None => UpdateResult::none(),
    }
}

/// Notify the user of a failed request. Anything else is only logged.
pub(super) fn surface(error: Error) -> UpdateResult {
    warn!("{}", error);
    if !error.is_user_facing() {
        return UpdateResult::none();
    }
    UpdateResult::action(UpdateAction::notify(&error))
}
