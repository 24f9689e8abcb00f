//! Terminal session: one interactive shell attached to the remote workspace.

use boxdesk_core::{Outbound, SessionId, WorkspaceKey};

use super::surface::RenderSurface;

/// Lifecycle of a terminal session.
///
/// `Uninitialized → Attaching → Active/Inactive → Closed`. Closed is terminal;
/// reopening an id creates a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    /// Attach request issued, surface not mounted yet
    Attaching,
    Active,
    Inactive,
    Closed,
}

impl SessionPhase {
    pub fn is_mounted(&self) -> bool {
        matches!(self, SessionPhase::Active | SessionPhase::Inactive)
    }
}

/// A single terminal session
#[derive(Debug)]
pub struct TerminalSession {
    pub id: SessionId,
    pub label: String,
    phase: SessionPhase,
    surface: RenderSurface,
}

impl TerminalSession {
    pub fn new(id: SessionId, label: String, scrollback_bytes: usize) -> Self {
        Self {
            id,
            label,
            phase: SessionPhase::Uninitialized,
            surface: RenderSurface::new(scrollback_bytes),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    /// Build the attach request and move to `Attaching`.
    ///
    /// The remote side creates the shell on first input, so attaching is an
    /// input message; `initial_input` is normally `clear\n`.
    pub(crate) fn attach(&mut self, key: &WorkspaceKey, initial_input: &str) -> Outbound {
        debug_assert_eq!(self.phase, SessionPhase::Uninitialized);
        self.phase = SessionPhase::Attaching;
        Outbound::terminal_input(key, &self.id, initial_input)
    }

    /// Mount the surface; the session starts out inactive.
    pub(crate) fn mount(&mut self) {
        if self.phase == SessionPhase::Attaching {
            self.phase = SessionPhase::Inactive;
        }
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        if !self.phase.is_mounted() {
            return;
        }
        self.phase = if active {
            SessionPhase::Active
        } else {
            SessionPhase::Inactive
        };
        self.surface.set_active(active);
    }

    /// Re-issue the attach input after the channel reconnected.
    pub(crate) fn reattach(&self, key: &WorkspaceKey, initial_input: &str) -> Outbound {
        Outbound::terminal_input(key, &self.id, initial_input)
    }

    pub(crate) fn write_output(&mut self, bytes: &[u8]) {
        self.surface.write(bytes);
    }

    /// Release the surface and enter the terminal phase.
    pub(crate) fn close(mut self) -> SessionId {
        self.phase = SessionPhase::Closed;
        self.surface.set_active(false);
        self.id
    }
}
