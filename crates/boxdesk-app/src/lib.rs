//! boxdesk-app - Workspace state machines and orchestration for boxdesk
//!
//! This crate implements the TEA (The Elm Architecture) pattern for the
//! workspace: terminal session registry, layout persistence, file sync, and
//! the Engine that drives them from channel events, UI intents and ticks.

pub mod config;
pub mod debounce;
pub mod engine;
pub mod engine_event;
pub mod file_sync;
pub mod handler;
pub mod layout;
pub mod message;
pub mod session;
pub mod session_registry;
pub mod state;

// Re-export primary types
pub use engine::Engine;
pub use engine_event::EngineEvent;
pub use file_sync::{EditorBuffer, FileSyncController};
pub use handler::{UpdateAction, UpdateResult};
pub use layout::{LayoutStore, PanelLayout, WorkspaceSnapshot};
pub use message::Message;
pub use session::{SessionPhase, TerminalSession};
pub use session_registry::{SessionDescriptor, SessionRegistry};
pub use state::{WorkspacePhase, WorkspaceState};
