//! The channel seam shared by every component that talks to the workspace.

use boxdesk_core::prelude::*;
use boxdesk_core::{Inbound, Outbound};

/// Current connection state of a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected and not attempting to connect.
    Disconnected,
    /// Initial connection attempt in progress.
    Connecting,
    /// Connected and ready to exchange messages.
    Connected,
    /// Connection lost; background task is retrying.
    Reconnecting {
        /// The current reconnection attempt number (1-indexed).
        attempt: u32,
    },
}

/// Events a channel delivers to its owner, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// The connection (re)opened.
    Connected,
    /// The connection dropped and a retry is scheduled.
    Reconnecting { attempt: u32 },
    /// The connection is gone for good.
    Disconnected,
    /// A decoded message from the remote side.
    Message(Inbound),
}

/// A persistent, bidirectional, message-oriented connection to one workspace.
///
/// `send` never blocks: the message is queued for the transport and the
/// reply, if any, arrives later as a [`ChannelEvent::Message`].
pub trait Channel: Send + Sync {
    /// Queue a message for the remote side.
    ///
    /// # Errors
    ///
    /// - [`Error::ChannelSend`] if the outbound queue is full.
    /// - [`Error::ChannelClosed`] if the transport has shut down.
    fn send(&self, message: Outbound) -> Result<()>;

    /// Return the current connection state.
    fn connection_state(&self) -> ConnectionState;

    /// Return `true` if the channel is currently connected.
    fn is_connected(&self) -> bool {
        self.connection_state() == ConnectionState::Connected
    }
}
