//! Headless mode - NDJSON intents in, NDJSON engine events out
//!
//! Each stdin line is one JSON UI intent; each stdout line is one engine
//! event stamped with a millisecond timestamp. Logs go to the log file, never
//! stdout.
//!
//! # Example
//!
//! ```json
//! {"intent":"open_terminal"}
//! {"intent":"keys","id":"1717171717171","data":"ls\r"}
//! {"intent":"open_file","path":"src/main.py"}
//! ```
//!
//! ```json
//! {"event":"session_opened","id":"1717171717171","label":"Terminal 1","timestamp":1717171717180}
//! {"event":"file_opened","path":"src/main.py","mode":"python","content":"...","timestamp":1717171717300}
//! ```

pub mod runner;

use std::io::{self, Write};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::error;

use boxdesk_app::{EngineEvent, Message};
use boxdesk_core::{CreateKind, SessionId};

/// UI intents accepted on stdin
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum HeadlessIntent {
    OpenTerminal,
    Activate { id: SessionId },
    Close { id: SessionId },
    Keys { id: SessionId, data: String },
    Refresh,
    OpenFile { path: String },
    /// Already confirmed by the caller
    DeleteFile { path: String },
    DownloadFile { path: String },
    /// Inline create in one step; an empty name cancels
    Create { kind: CreateKind, name: String },
    Edit { content: String },
    ResizeSidebar { width: u32 },
    ResizeEditor { height: u32 },
    ResetLayout,
    Quit,
}

impl HeadlessIntent {
    /// Parse one stdin line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> serde_json::Result<Option<Self>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(trimmed).map(Some)
    }

    /// Messages this intent feeds to the engine, in order
    pub fn into_messages(self) -> Vec<Message> {
        match self {
            HeadlessIntent::OpenTerminal => vec![Message::OpenTerminal],
            HeadlessIntent::Activate { id } => vec![Message::ActivateTerminal { id }],
            HeadlessIntent::Close { id } => vec![Message::CloseTerminal { id }],
            HeadlessIntent::Keys { id, data } => vec![Message::TerminalKeys { id, data }],
            HeadlessIntent::Refresh => vec![Message::RefreshFiles],
            HeadlessIntent::OpenFile { path } => vec![Message::OpenFile { path }],
            HeadlessIntent::DeleteFile { path } => vec![Message::DeleteFile { path }],
            HeadlessIntent::DownloadFile { path } => vec![Message::DownloadFile { path }],
            HeadlessIntent::Create { kind, name } => vec![
                Message::BeginCreate { kind },
                Message::SubmitCreate { name },
            ],
            HeadlessIntent::Edit { content } => vec![Message::EditorChanged { content }],
            HeadlessIntent::ResizeSidebar { width } => {
                vec![Message::ResizeSidebar { width }, Message::ResizeEnd]
            }
            HeadlessIntent::ResizeEditor { height } => {
                vec![Message::ResizeEditor { height }, Message::ResizeEnd]
            }
            HeadlessIntent::ResetLayout => vec![Message::ResetLayout],
            HeadlessIntent::Quit => vec![Message::Quit],
        }
    }
}

/// Engine event stamped for output
#[derive(Debug, Clone, Serialize)]
pub struct HeadlessEvent {
    #[serde(flatten)]
    pub event: EngineEvent,
    pub timestamp: i64,
}

impl HeadlessEvent {
    pub fn new(event: EngineEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Error not tied to an engine event (startup failures)
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EngineEvent::Notification {
            message: message.into(),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Emit this event to stdout as one NDJSON line
    pub fn emit(&self) {
        let json = match self.to_json() {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }

        // Flush so consumers see events immediately
        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_intents() {
        assert_eq!(
            HeadlessIntent::parse(r#"{"intent":"open_terminal"}"#).unwrap(),
            Some(HeadlessIntent::OpenTerminal)
        );
        assert_eq!(
            HeadlessIntent::parse(r#" {"intent":"keys","id":"t1","data":"ls\r"} "#).unwrap(),
            Some(HeadlessIntent::Keys {
                id: SessionId::new("t1"),
                data: "ls\r".into(),
            })
        );
        assert_eq!(
            HeadlessIntent::parse(r#"{"intent":"create","kind":"folder","name":"docs"}"#)
                .unwrap(),
            Some(HeadlessIntent::Create {
                kind: CreateKind::Folder,
                name: "docs".into(),
            })
        );
    }

    #[test]
    fn test_blank_line_is_no_intent() {
        assert_eq!(HeadlessIntent::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_unknown_intent_is_error() {
        assert!(HeadlessIntent::parse(r#"{"intent":"fly"}"#).is_err());
        assert!(HeadlessIntent::parse("not json").is_err());
    }

    #[test]
    fn test_create_intent_expands_to_inline_entry() {
        let messages = HeadlessIntent::Create {
            kind: CreateKind::File,
            name: "a.txt".into(),
        }
        .into_messages();
        assert_eq!(
            messages,
            vec![
                Message::BeginCreate {
                    kind: CreateKind::File
                },
                Message::SubmitCreate {
                    name: "a.txt".into()
                },
            ]
        );
    }

    #[test]
    fn test_event_json_is_flat_with_timestamp() {
        let event = HeadlessEvent::new(EngineEvent::SessionClosed {
            id: SessionId::new("t1"),
        });
        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(value["event"], "session_closed");
        assert_eq!(value["id"], "t1");
        assert!(value["timestamp"].as_i64().unwrap() > 0);
    }
}
