//! # boxdesk-channel - Workspace Channel
//!
//! The single bidirectional connection between the client and one remote
//! workspace. Depends on [`boxdesk_core`] for the message vocabulary.
//!
//! ## Public API
//!
//! - [`Channel`] - Non-blocking send seam shared by all components
//! - [`ChannelEvent`], [`ConnectionState`] - Connection liveness and inbound messages
//! - [`WsChannel`] - WebSocket implementation with reconnection
//! - [`encode_frame()`], [`decode_frame()`] - JSON text frame codec
//! - `test_utils::RecordingChannel` - Test double (feature `test-helpers`)

pub mod channel;
pub mod client;
pub mod codec;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use channel::{Channel, ChannelEvent, ConnectionState};
pub use client::{endpoint_url, WsChannel};
pub use codec::{decode_frame, encode_frame};
