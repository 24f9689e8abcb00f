//! Workspace state (Model in TEA pattern)

use boxdesk_channel::ConnectionState;
use boxdesk_core::{CreateKind, WorkspaceKey};

use crate::config::Settings;
use crate::debounce::RefreshDebouncer;
use crate::file_sync::FileSyncController;
use crate::layout::PanelLayout;
use crate::session_registry::SessionRegistry;

/// Lifecycle of the workspace controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkspacePhase {
    /// Waiting for the startup restore
    #[default]
    Starting,
    Running,
    Quitting,
}

/// Complete workspace state
#[derive(Debug)]
pub struct WorkspaceState {
    /// Workspace/container key every request is addressed to
    pub workspace: WorkspaceKey,

    pub settings: Settings,

    /// Open terminal sessions and the active selection
    pub registry: SessionRegistry,

    /// Editor buffer, file listing and pending file requests
    pub files: FileSyncController,

    pub panels: PanelLayout,

    /// Debounced file list refresh after terminal input
    pub refresh: RefreshDebouncer,

    /// Inline create entry in progress
    pub pending_create: Option<CreateKind>,

    pub connection: ConnectionState,

    pub phase: WorkspacePhase,

    /// Set after the first `Connected`; later ones are reconnects
    pub(crate) has_connected: bool,
}

impl WorkspaceState {
    pub fn new(workspace: WorkspaceKey, settings: Settings) -> Self {
        Self {
            registry: SessionRegistry::new(&settings.terminal),
            files: FileSyncController::new(workspace.clone()),
            refresh: RefreshDebouncer::new(settings.sync.refresh_debounce()),
            panels: PanelLayout::default(),
            pending_create: None,
            connection: ConnectionState::Connecting,
            phase: WorkspacePhase::Starting,
            has_connected: false,
            workspace,
            settings,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.phase == WorkspacePhase::Quitting
    }
}
