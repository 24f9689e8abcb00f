//! Test utilities for channel consumers
//!
//! [`RecordingChannel`] captures every outbound message so state machines can
//! be driven headlessly and their traffic asserted on.

use std::sync::Mutex;

use boxdesk_core::prelude::*;
use boxdesk_core::Outbound;

use crate::channel::{Channel, ConnectionState};

/// A [`Channel`] that records outbound messages instead of sending them.
#[derive(Debug)]
pub struct RecordingChannel {
    sent: Mutex<Vec<Outbound>>,
    state: Mutex<ConnectionState>,
}

impl Default for RecordingChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingChannel {
    /// Create a connected recording channel.
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            state: Mutex::new(ConnectionState::Connected),
        }
    }

    /// Messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Drain and return the messages sent so far.
    pub fn take(&self) -> Vec<Outbound> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Change the reported connection state. A closed channel rejects sends.
    pub fn set_state(&self, state: ConnectionState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }
}

impl Channel for RecordingChannel {
    fn send(&self, message: Outbound) -> Result<()> {
        if self.connection_state() == ConnectionState::Disconnected {
            return Err(Error::ChannelClosed);
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message);
        Ok(())
    }

    fn connection_state(&self) -> ConnectionState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxdesk_core::WorkspaceKey;

    #[test]
    fn test_records_in_order() {
        let channel = RecordingChannel::new();
        let key = WorkspaceKey::new("box");
        channel.send(Outbound::list_files(&key, None)).unwrap();
        channel.send(Outbound::read_file(&key, "a.txt")).unwrap();

        let sent = channel.take();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].event_name(), "list_files");
        assert_eq!(sent[1].event_name(), "read_file");
        assert!(channel.sent().is_empty());
    }

    #[test]
    fn test_disconnected_rejects_send() {
        let channel = RecordingChannel::new();
        channel.set_state(ConnectionState::Disconnected);
        let err = channel
            .send(Outbound::list_files(&WorkspaceKey::new("box"), None))
            .unwrap_err();
        assert!(matches!(err, Error::ChannelClosed));
        assert!(!channel.is_connected());
    }
}
