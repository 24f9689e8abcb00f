//! # boxdesk-core - Core Domain Types
//!
//! Foundation crate for boxdesk. Provides domain types, the channel message
//! vocabulary, error handling, logging setup and syntax mode resolution.
//!
//! This crate has **zero internal dependencies**.
//!
//! ## Public API
//!
//! - [`Outbound`], [`Inbound`] - Typed channel messages
//! - [`SessionId`], [`WorkspaceKey`], [`FileEntry`], [`CreateKind`] - Domain types
//! - [`SyntaxMode`] - Editor mode lookup by content-type and file name
//! - [`Error`], [`Result`] - Error handling
//!
//! ## Prelude
//!
//! ```rust
//! use boxdesk_core::prelude::*;
//! ```

pub mod error;
pub mod events;
pub mod logging;
pub mod mode;
pub mod types;

/// Prelude for common imports used throughout all boxdesk crates
pub mod prelude {
    pub use super::error::{Error, Result};
    pub use tracing::{debug, error, info, trace, warn};
}

pub use error::{Error, Result};
pub use events::{
    DownloadPayload, FileAck, FileContent, FileEdit, FileList, FileRequest, FolderAck,
    FolderError, FolderRequest, Inbound, ListFiles, OperationError, Outbound, TerminalInput,
    TerminalOutput,
};
pub use mode::SyntaxMode;
pub use types::{CreateKind, FileEntry, SessionId, WorkspaceKey};
