//! Channel message vocabulary
//!
//! Every frame on the channel is `{"event": "<name>", "data": {...}}`. The
//! event and field names are the ones the remote workspace server speaks.

use serde::{Deserialize, Serialize};

use crate::types::{CreateKind, SessionId, WorkspaceKey};

// ─────────────────────────────────────────────────────────
// Outbound payloads
// ─────────────────────────────────────────────────────────

/// Keystrokes for one terminal session
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TerminalInput {
    pub container_name: WorkspaceKey,
    pub tab_id: SessionId,
    pub input: String,
}

/// Directory listing request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ListFiles {
    pub container_name: WorkspaceKey,
    /// Monotonic listing counter, echoed back by servers that support it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
}

/// Request addressed at a single file path
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileRequest {
    pub container_name: WorkspaceKey,
    pub file_path: String,
}

/// Full-buffer replacement of a remote file
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileEdit {
    pub container_name: WorkspaceKey,
    pub file_path: String,
    pub content: String,
}

/// Folder creation request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FolderRequest {
    pub container_name: WorkspaceKey,
    pub folder_path: String,
}

/// Messages sent to the remote side
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Outbound {
    TerminalInput(TerminalInput),
    ListFiles(ListFiles),
    ReadFile(FileRequest),
    FileEdit(FileEdit),
    DownloadFile(FileRequest),
    DeleteFile(FileRequest),
    CreateFile(FileRequest),
    CreateFolder(FolderRequest),
}

impl Outbound {
    pub fn terminal_input(key: &WorkspaceKey, id: &SessionId, input: impl Into<String>) -> Self {
        Outbound::TerminalInput(TerminalInput {
            container_name: key.clone(),
            tab_id: id.clone(),
            input: input.into(),
        })
    }

    pub fn list_files(key: &WorkspaceKey, request_id: Option<u64>) -> Self {
        Outbound::ListFiles(ListFiles {
            container_name: key.clone(),
            request_id,
        })
    }

    pub fn read_file(key: &WorkspaceKey, path: impl Into<String>) -> Self {
        Outbound::ReadFile(file_request(key, path))
    }

    pub fn file_edit(
        key: &WorkspaceKey,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Outbound::FileEdit(FileEdit {
            container_name: key.clone(),
            file_path: path.into(),
            content: content.into(),
        })
    }

    pub fn download_file(key: &WorkspaceKey, path: impl Into<String>) -> Self {
        Outbound::DownloadFile(file_request(key, path))
    }

    pub fn delete_file(key: &WorkspaceKey, path: impl Into<String>) -> Self {
        Outbound::DeleteFile(file_request(key, path))
    }

    /// Build the create request matching `kind`
    pub fn create(key: &WorkspaceKey, path: impl Into<String>, kind: CreateKind) -> Self {
        match kind {
            CreateKind::File => Outbound::CreateFile(file_request(key, path)),
            CreateKind::Folder => Outbound::CreateFolder(FolderRequest {
                container_name: key.clone(),
                folder_path: path.into(),
            }),
        }
    }

    /// Wire event name, for logging
    pub fn event_name(&self) -> &'static str {
        match self {
            Outbound::TerminalInput(_) => "terminal_input",
            Outbound::ListFiles(_) => "list_files",
            Outbound::ReadFile(_) => "read_file",
            Outbound::FileEdit(_) => "file_edit",
            Outbound::DownloadFile(_) => "download_file",
            Outbound::DeleteFile(_) => "delete_file",
            Outbound::CreateFile(_) => "create_file",
            Outbound::CreateFolder(_) => "create_folder",
        }
    }
}

fn file_request(key: &WorkspaceKey, path: impl Into<String>) -> FileRequest {
    FileRequest {
        container_name: key.clone(),
        file_path: path.into(),
    }
}

// ─────────────────────────────────────────────────────────
// Inbound payloads
// ─────────────────────────────────────────────────────────

/// Shell output for one terminal session
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TerminalOutput {
    /// Absent when the remote could not resolve the workspace at all
    #[serde(default)]
    pub tab_id: Option<SessionId>,
    pub output: String,
}

/// Directory listing response
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileList {
    #[serde(default)]
    pub container_name: Option<String>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub request_id: Option<u64>,
}

/// File content response
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileContent {
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Base64-encoded download payload
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DownloadPayload {
    #[serde(default)]
    pub file_path: Option<String>,
    pub filename: String,
    pub content: String,
}

/// Failure report for a file operation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OperationError {
    #[serde(default)]
    pub file_path: Option<String>,
    pub error: String,
}

/// Failure report for a folder operation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FolderError {
    #[serde(default)]
    pub folder_path: Option<String>,
    pub error: String,
}

/// Confirmation of a file operation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileAck {
    pub file_path: String,
}

/// Confirmation of a folder operation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FolderAck {
    pub folder_path: String,
}

/// Messages received from the remote side
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Inbound {
    TerminalOutput(TerminalOutput),
    FileList(FileList),
    FileContent(FileContent),
    DownloadFileResponse(DownloadPayload),
    DownloadError(OperationError),
    FileSaved(FileAck),
    FileEditError(OperationError),
    FileDeleted(FileAck),
    DeleteError(OperationError),
    FileCreated(FileAck),
    FileCreateError(OperationError),
    FolderCreated(FolderAck),
    FolderCreateError(FolderError),
}

impl Inbound {
    /// Wire event name, for logging
    pub fn event_name(&self) -> &'static str {
        match self {
            Inbound::TerminalOutput(_) => "terminal_output",
            Inbound::FileList(_) => "file_list",
            Inbound::FileContent(_) => "file_content",
            Inbound::DownloadFileResponse(_) => "download_file_response",
            Inbound::DownloadError(_) => "download_error",
            Inbound::FileSaved(_) => "file_saved",
            Inbound::FileEditError(_) => "file_edit_error",
            Inbound::FileDeleted(_) => "file_deleted",
            Inbound::DeleteError(_) => "delete_error",
            Inbound::FileCreated(_) => "file_created",
            Inbound::FileCreateError(_) => "file_create_error",
            Inbound::FolderCreated(_) => "folder_created",
            Inbound::FolderCreateError(_) => "folder_create_error",
        }
    }
}
