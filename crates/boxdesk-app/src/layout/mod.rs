//! Layout module - persisted workspace snapshot
//!
//! - `store`: `KeyValueStore` trait with file and in-memory backends
//!
//! The whole layout is one record under a single key, always fully
//! overwritten. A missing or unreadable record means "start from defaults".

pub mod store;

use serde::{Deserialize, Serialize};

use boxdesk_core::prelude::*;
use boxdesk_core::SessionId;

use crate::session_registry::{SessionDescriptor, SessionRegistry};

pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Storage key of the layout record
pub const LAYOUT_KEY: &str = "layoutSettings";

/// Panel dimensions in pixels; `None` leaves the surface's natural size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelLayout {
    pub sidebar_width: Option<u32>,
    pub editor_height: Option<u32>,
}

/// Persisted workspace layout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_height: Option<u32>,

    /// Open sessions in tab order
    #[serde(default, alias = "sessions")]
    pub open_tabs: Vec<SessionDescriptor>,

    #[serde(default, alias = "activeId")]
    pub active_tab_id: Option<SessionId>,
}

impl WorkspaceSnapshot {
    /// Capture the current panels and sessions.
    pub fn capture(panels: &PanelLayout, registry: &SessionRegistry) -> Self {
        Self {
            sidebar_width: panels.sidebar_width,
            editor_height: panels.editor_height,
            open_tabs: registry.descriptors(),
            active_tab_id: registry.active_id().cloned(),
        }
    }

    pub fn panels(&self) -> PanelLayout {
        PanelLayout {
            sidebar_width: self.sidebar_width,
            editor_height: self.editor_height,
        }
    }
}

/// Reads and writes the [`WorkspaceSnapshot`] through a [`KeyValueStore`].
pub struct LayoutStore {
    store: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutStore").finish_non_exhaustive()
    }
}

impl LayoutStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Layout store backed by [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Capture and write the current layout.
    pub fn save(&mut self, panels: &PanelLayout, registry: &SessionRegistry) -> Result<()> {
        self.save_snapshot(&WorkspaceSnapshot::capture(panels, registry))
    }

    pub fn save_snapshot(&mut self, snapshot: &WorkspaceSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        self.store.set(LAYOUT_KEY, &json)
    }

    /// Read the stored layout.
    ///
    /// Absent, unreadable and malformed records all yield `None`; the last
    /// two are logged and otherwise ignored.
    pub fn load(&self) -> Option<WorkspaceSnapshot> {
        let raw = match self.store.get(LAYOUT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read stored layout: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<Option<WorkspaceSnapshot>>(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let err = Error::malformed_state(e.to_string());
                warn!("Discarding stored layout: {}", err);
                None
            }
        }
    }

    /// Delete the stored layout.
    pub fn reset(&mut self) -> Result<()> {
        self.store.remove(LAYOUT_KEY)
    }
}
