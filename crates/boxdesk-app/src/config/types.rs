//! Configuration types for boxdesk
//!
//! Defines `Settings` (`.boxdesk/config.toml`) and its sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application settings (.boxdesk/config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub connection: ConnectionSettings,

    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub terminal: TerminalSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

/// Where the workspace channel connects
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ConnectionSettings {
    /// Base WebSocket URL of the workspace server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Workspace/container key addressed by every request
    #[serde(default)]
    pub workspace: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            workspace: String::new(),
        }
    }
}

fn default_endpoint() -> String {
    "ws://localhost:5000/ws".to_string()
}

/// File sync timing
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SyncSettings {
    /// Quiet period after the last keystroke before the file list refreshes
    #[serde(default = "default_refresh_debounce_ms")]
    pub refresh_debounce_ms: u64,

    /// How long a request may stay unanswered before it is reported
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            refresh_debounce_ms: default_refresh_debounce_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl SyncSettings {
    pub fn refresh_debounce(&self) -> Duration {
        Duration::from_millis(self.refresh_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_refresh_debounce_ms() -> u64 {
    500
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

/// Terminal session behavior
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TerminalSettings {
    /// Bytes of output each render surface retains
    #[serde(default = "default_scrollback_bytes")]
    pub scrollback_bytes: usize,

    /// Send `clear` when attaching so stale output from a prior attach is wiped
    #[serde(default = "default_true")]
    pub clear_on_attach: bool,

    /// Prefix of generated tab labels ("Terminal 2")
    #[serde(default = "default_label_prefix")]
    pub label_prefix: String,
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            scrollback_bytes: default_scrollback_bytes(),
            clear_on_attach: true,
            label_prefix: default_label_prefix(),
        }
    }
}

fn default_scrollback_bytes() -> usize {
    1024 * 1024
}

fn default_true() -> bool {
    true
}

fn default_label_prefix() -> String {
    "Terminal".to_string()
}

/// Local persistence locations
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct StorageSettings {
    /// Directory holding the persisted workspace layout
    #[serde(default)]
    pub state_dir: Option<PathBuf>,

    /// Directory downloads are written to
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}

impl StorageSettings {
    pub fn resolved_state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("boxdesk")
                .join("state")
        })
    }

    pub fn resolved_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.sync.refresh_debounce_ms, 500);
        assert_eq!(settings.sync.request_timeout(), Duration::from_secs(30));
        assert!(settings.terminal.clear_on_attach);
        assert_eq!(settings.terminal.label_prefix, "Terminal");
        assert!(settings.connection.workspace.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
[connection]
workspace = "dev-box"

[sync]
refresh_debounce_ms = 250
"#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.connection.workspace, "dev-box");
        assert_eq!(settings.connection.endpoint, "ws://localhost:5000/ws");
        assert_eq!(settings.sync.refresh_debounce_ms, 250);
        assert_eq!(settings.sync.request_timeout_ms, 30_000);
        assert_eq!(settings.terminal.scrollback_bytes, 1024 * 1024);
    }

    #[test]
    fn test_explicit_storage_dirs_win() {
        let storage = StorageSettings {
            state_dir: Some(PathBuf::from("/tmp/state")),
            download_dir: Some(PathBuf::from("/tmp/dl")),
        };
        assert_eq!(storage.resolved_state_dir(), PathBuf::from("/tmp/state"));
        assert_eq!(storage.resolved_download_dir(), PathBuf::from("/tmp/dl"));
    }
}
