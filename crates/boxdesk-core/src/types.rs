//! Core domain types shared by every boxdesk crate

use serde::{Deserialize, Serialize};

/// Identifier of one terminal session, unique among open sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Key naming the remote workspace/container every request is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceKey(String);

impl WorkspaceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a response tagged with `other` belongs to this workspace.
    pub fn matches(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl std::fmt::Display for WorkspaceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkspaceKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// What an inline create request produces on the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateKind {
    File,
    Folder,
}

impl std::fmt::Display for CreateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CreateKind::File => write!(f, "file"),
            CreateKind::Folder => write!(f, "folder"),
        }
    }
}

/// One row of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Name without the trailing directory marker
    pub name: String,
    pub is_dir: bool,
}

impl FileEntry {
    /// Parse a listing name; directories arrive suffixed with `/`.
    pub fn from_listing(raw: &str) -> Self {
        match raw.strip_suffix('/') {
            Some(name) => Self {
                name: name.to_string(),
                is_dir: true,
            },
            None => Self {
                name: raw.to_string(),
                is_dir: false,
            },
        }
    }

    /// Directories cannot be opened in the editor.
    pub fn is_openable(&self) -> bool {
        !self.is_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_directory_suffix() {
        let dir = FileEntry::from_listing("src/");
        assert_eq!(dir.name, "src");
        assert!(dir.is_dir);
        assert!(!dir.is_openable());

        let file = FileEntry::from_listing("main.py");
        assert_eq!(file.name, "main.py");
        assert!(file.is_openable());
    }

    #[test]
    fn test_workspace_key_matches() {
        let key = WorkspaceKey::new("new");
        assert!(key.matches("new"));
        assert!(!key.matches("old"));
    }

    #[test]
    fn test_session_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&SessionId::new("t1")).unwrap();
        assert_eq!(json, "\"t1\"");
    }
}
