//! Message types for the workspace (TEA pattern)

use boxdesk_channel::ChannelEvent;
use boxdesk_core::{CreateKind, SessionId};

use crate::layout::WorkspaceSnapshot;

/// All possible messages/intents in the workspace
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Connection change or decoded message from the workspace channel
    Channel(ChannelEvent),

    /// Periodic tick driving the refresh debouncer and request timeouts
    Tick,

    /// Run the startup protocol with the stored layout, if any
    Restore { snapshot: Option<WorkspaceSnapshot> },

    /// Drop the stored layout and start over from defaults
    ResetLayout,

    /// Force quit
    Quit,

    // ─────────────────────────────────────────────────────────
    // Panel Resizing
    // ─────────────────────────────────────────────────────────
    /// Sidebar drag sample
    ResizeSidebar { width: u32 },

    /// Editor/terminal divider drag sample
    ResizeEditor { height: u32 },

    /// Pointer released after a drag
    ResizeEnd,

    // ─────────────────────────────────────────────────────────
    // Terminal Tabs
    // ─────────────────────────────────────────────────────────
    /// "+" clicked
    OpenTerminal,

    ActivateTerminal { id: SessionId },

    CloseTerminal { id: SessionId },

    /// Keystrokes typed into a terminal
    TerminalKeys { id: SessionId, data: String },

    // ─────────────────────────────────────────────────────────
    // File Browser
    // ─────────────────────────────────────────────────────────
    RefreshFiles,

    OpenFile { path: String },

    /// Delete after the user confirmed it
    DeleteFile { path: String },

    DownloadFile { path: String },

    /// Show the inline name entry for a new file or folder
    BeginCreate { kind: CreateKind },

    /// Name entry confirmed (Enter or focus lost); empty cancels
    SubmitCreate { name: String },

    /// Name entry abandoned (Escape)
    CancelCreate,

    // ─────────────────────────────────────────────────────────
    // Editor
    // ─────────────────────────────────────────────────────────
    /// Editor buffer mutated locally
    EditorChanged { content: String },
}
