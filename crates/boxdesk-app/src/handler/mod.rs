//! Handler module - TEA update function and event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `channel`: Connection changes and inbound remote messages
//! - `terminal`: Terminal tab intents
//! - `files`: File browser and editor intents
//! - `layout`: Startup restore, reset and panel resizing

pub(crate) mod channel;
pub(crate) mod files;
pub(crate) mod layout;
pub(crate) mod terminal;
pub(crate) mod update;


use boxdesk_core::{Error, Outbound};

use crate::file_sync::Download;
use crate::layout::WorkspaceSnapshot;
use crate::message::Message;
use crate::state::WorkspaceState;

// Re-export main entry point
pub use update::update;

/// Actions the engine performs after update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// Queue a message on the workspace channel
    Send(Outbound),

    /// Overwrite the stored layout
    PersistLayout(WorkspaceSnapshot),

    /// Delete the stored layout
    ClearLayout,

    /// Write a decoded download into the download directory
    SaveDownload(Download),

    /// Blocking notification for the user
    Notify { message: String },
}

impl UpdateAction {
    /// Notification naming a failed operation
    pub fn notify(error: &Error) -> Self {
        UpdateAction::Notify {
            message: error.to_string(),
        }
    }
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Actions for the engine, in order
    pub actions: Vec<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            actions: Vec::new(),
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            actions: vec![action],
        }
    }

    pub fn actions(actions: Vec<UpdateAction>) -> Self {
        Self {
            message: None,
            actions,
        }
    }

    pub fn with(mut self, action: UpdateAction) -> Self {
        self.actions.push(action);
        self
    }
}

/// Snapshot of the current layout for persistence
pub(crate) fn persist(state: &WorkspaceState) -> UpdateAction {
    UpdateAction::PersistLayout(WorkspaceSnapshot::capture(&state.panels, &state.registry))
}
