//! Domain events emitted by the Engine for external consumers
//!
//! Events are broadcast after each message processing cycle via
//! `Engine::subscribe()`; the headless runner prints them as NDJSON.

use std::path::PathBuf;

use serde::Serialize;

use boxdesk_core::{FileEntry, SessionId, SyntaxMode};

/// Domain events emitted by the Engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    // ─────────────────────────────────────────────────────────
    // Terminal Sessions
    // ─────────────────────────────────────────────────────────
    SessionOpened { id: SessionId, label: String },

    SessionClosed { id: SessionId },

    SessionActivated { id: SessionId },

    /// New output appended to a session's surface
    TerminalOutput { id: SessionId, output: String },

    // ─────────────────────────────────────────────────────────
    // Files
    // ─────────────────────────────────────────────────────────
    /// A listing was applied
    FileList {
        entries: Vec<FileEntry>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// The editor buffer was bound to freshly loaded content
    FileOpened {
        path: String,
        mode: SyntaxMode,
        content: String,
    },

    /// The bound file was deleted and the buffer unbound
    EditorCleared,

    DownloadSaved { path: PathBuf },

    // ─────────────────────────────────────────────────────────
    // Status
    // ─────────────────────────────────────────────────────────
    /// User-facing failure
    Notification { message: String },

    /// Channel connection state changed
    Connection { state: String },
}

impl EngineEvent {
    /// Event type name, matching the serialized `event` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::SessionOpened { .. } => "session_opened",
            EngineEvent::SessionClosed { .. } => "session_closed",
            EngineEvent::SessionActivated { .. } => "session_activated",
            EngineEvent::TerminalOutput { .. } => "terminal_output",
            EngineEvent::FileList { .. } => "file_list",
            EngineEvent::FileOpened { .. } => "file_opened",
            EngineEvent::EditorCleared => "editor_cleared",
            EngineEvent::DownloadSaved { .. } => "download_saved",
            EngineEvent::Notification { .. } => "notification",
            EngineEvent::Connection { .. } => "connection",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_matches_serialized_tag() {
        let events = vec![
            EngineEvent::SessionOpened {
                id: SessionId::new("1"),
                label: "Terminal 1".into(),
            },
            EngineEvent::FileList {
                entries: vec![FileEntry::from_listing("src/")],
                error: None,
            },
            EngineEvent::EditorCleared,
            EngineEvent::Notification {
                message: "boom".into(),
            },
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["event"], event.event_type());
        }
    }

    #[test]
    fn test_file_opened_serializes_mode_id() {
        let event = EngineEvent::FileOpened {
            path: "main.go".into(),
            mode: SyntaxMode::Golang,
            content: String::new(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["mode"], "golang");
    }
}
