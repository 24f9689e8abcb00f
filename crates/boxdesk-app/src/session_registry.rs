//! Registry of open terminal sessions
//!
//! Owns every [`TerminalSession`] and the single active selection. All
//! sessions share one channel; the registry only produces the messages, the
//! caller sends them.

use std::collections::HashMap;

use boxdesk_core::prelude::*;
use boxdesk_core::{Outbound, SessionId, WorkspaceKey};

use crate::config::TerminalSettings;
use crate::session::{SessionPhase, TerminalSession};

/// Input sent on attach when `clear_on_attach` is enabled
pub const CLEAR_INPUT: &str = "clear\n";

/// Persistable description of one open session
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionDescriptor {
    pub id: SessionId,
    pub label: String,
}

/// Owns the set of open terminal sessions.
#[derive(Debug)]
pub struct SessionRegistry {
    /// Sessions indexed by id
    sessions: HashMap<SessionId, TerminalSession>,

    /// Registration order (tab order)
    order: Vec<SessionId>,

    /// Currently focused session
    active: Option<SessionId>,

    /// Last generated id, keeps generated ids strictly increasing
    last_generated: i64,

    scrollback_bytes: usize,
    attach_input: String,
    label_prefix: String,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(&TerminalSettings::default())
    }
}

impl SessionRegistry {
    pub fn new(settings: &TerminalSettings) -> Self {
        Self {
            sessions: HashMap::new(),
            order: Vec::new(),
            active: None,
            last_generated: 0,
            scrollback_bytes: settings.scrollback_bytes,
            attach_input: if settings.clear_on_attach {
                CLEAR_INPUT.to_string()
            } else {
                String::new()
            },
            label_prefix: settings.label_prefix.clone(),
        }
    }

    /// Open a session and make it the active selection.
    ///
    /// Without an `id` a fresh time-derived one is generated; without a
    /// `label` one is derived from the open count. Returns the new id and the
    /// attach message for the remote shell.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateSession`] if `id` is already open.
    pub fn open(
        &mut self,
        key: &WorkspaceKey,
        id: Option<SessionId>,
        label: Option<String>,
    ) -> Result<(SessionId, Outbound)> {
        let id = match id {
            Some(id) if self.sessions.contains_key(&id) => {
                return Err(Error::duplicate_session(id.as_str()));
            }
            Some(id) => id,
            None => self.generate_id(),
        };
        let label = label.unwrap_or_else(|| format!("{} {}", self.label_prefix, self.len() + 1));

        let mut session = TerminalSession::new(id.clone(), label, self.scrollback_bytes);
        let attach = session.attach(key, &self.attach_input);
        session.mount();

        debug!("Opened terminal session {} ({})", session.id, session.label);
        self.sessions.insert(id.clone(), session);
        self.order.push(id.clone());
        self.activate(&id)?;

        Ok((id, attach))
    }

    /// Mark exactly one session active.
    ///
    /// # Errors
    ///
    /// [`Error::SessionNotFound`] if `id` is not open; the selection is unchanged.
    pub fn activate(&mut self, id: &SessionId) -> Result<()> {
        if !self.sessions.contains_key(id) {
            return Err(Error::session_not_found(id.as_str()));
        }
        for (session_id, session) in self.sessions.iter_mut() {
            session.set_active(session_id == id);
        }
        self.active = Some(id.clone());
        Ok(())
    }

    /// Close a session and release its surface.
    ///
    /// If it was active, the first remaining session (registration order)
    /// becomes active. The remote shell is left to the remote's own teardown.
    ///
    /// # Errors
    ///
    /// [`Error::SessionNotFound`] if `id` is not open.
    pub fn close(&mut self, id: &SessionId) -> Result<()> {
        let session = self
            .sessions
            .remove(id)
            .ok_or_else(|| Error::session_not_found(id.as_str()))?;
        self.order.retain(|other| other != id);
        session.close();

        if self.active.as_ref() == Some(id) {
            self.active = None;
            if let Some(first) = self.order.first().cloned() {
                self.activate(&first)?;
            }
        }

        debug!("Closed terminal session {}", id);
        Ok(())
    }

    /// Close every session (layout reset).
    pub fn close_all(&mut self) {
        for id in std::mem::take(&mut self.order) {
            if let Some(session) = self.sessions.remove(&id) {
                session.close();
            }
        }
        self.active = None;
    }

    /// Append shell output to the session's surface.
    ///
    /// Returns `false` (output dropped) when the session is no longer open;
    /// the remote shell may outlive its local tab.
    pub fn route_output(&mut self, id: &SessionId, bytes: &[u8]) -> bool {
        match self.sessions.get_mut(id) {
            Some(session) => {
                session.write_output(bytes);
                true
            }
            None => {
                trace!("Dropping {} bytes for closed session {}", bytes.len(), id);
                false
            }
        }
    }

    /// Build the message forwarding keystrokes for `id`.
    ///
    /// # Errors
    ///
    /// [`Error::SessionNotFound`] if `id` is not open.
    pub fn route_input(
        &self,
        key: &WorkspaceKey,
        id: &SessionId,
        data: impl Into<String>,
    ) -> Result<Outbound> {
        if !self.sessions.contains_key(id) {
            return Err(Error::session_not_found(id.as_str()));
        }
        Ok(Outbound::terminal_input(key, id, data))
    }

    /// Attach messages for every open session, in tab order.
    pub fn reattach_all(&self, key: &WorkspaceKey) -> Vec<Outbound> {
        self.iter()
            .map(|session| session.reattach(key, &self.attach_input))
            .collect()
    }

    /// Get a session by id
    pub fn get(&self, id: &SessionId) -> Option<&TerminalSession> {
        self.sessions.get(id)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn active_id(&self) -> Option<&SessionId> {
        self.active.as_ref()
    }

    pub fn active(&self) -> Option<&TerminalSession> {
        self.active.as_ref().and_then(|id| self.sessions.get(id))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Iterate over sessions in tab order
    pub fn iter(&self) -> impl Iterator<Item = &TerminalSession> {
        self.order.iter().filter_map(|id| self.sessions.get(id))
    }

    /// Ids in tab order
    pub fn ids(&self) -> Vec<SessionId> {
        self.order.clone()
    }

    /// Ordered `(id, label)` list for persistence
    pub fn descriptors(&self) -> Vec<SessionDescriptor> {
        self.iter()
            .map(|session| SessionDescriptor {
                id: session.id.clone(),
                label: session.label.clone(),
            })
            .collect()
    }

    /// Number of sessions in the `Active` phase
    pub fn active_count(&self) -> usize {
        self.sessions
            .values()
            .filter(|s| s.phase() == SessionPhase::Active)
            .count()
    }

    /// Millisecond timestamp, bumped past the last generated or any open id.
    fn generate_id(&mut self) -> SessionId {
        let now = chrono::Utc::now().timestamp_millis();
        let mut candidate = now.max(self.last_generated + 1);
        while self.sessions.contains_key(&SessionId::new(candidate.to_string())) {
            candidate += 1;
        }
        self.last_generated = candidate;
        SessionId::new(candidate.to_string())
    }
}
