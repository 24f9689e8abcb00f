//! Engine - owns the workspace state and drives it from channel events,
//! UI intents and timer ticks
//!
//! All state transitions happen inside the engine's single message loop, so
//! the state itself needs no locking.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use boxdesk_channel::{Channel, ChannelEvent, ConnectionState};
use boxdesk_core::prelude::*;
use boxdesk_core::{Outbound, SessionId, WorkspaceKey};

use crate::config::Settings;
use crate::engine_event::EngineEvent;
use crate::file_sync::Download;
use crate::handler::{self, UpdateAction};
use crate::layout::{FileStore, LayoutStore};
use crate::message::Message;
use crate::state::WorkspaceState;

/// Default tick period for the debouncer and request timeouts
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Lightweight snapshot of state for change detection.
///
/// Captured before message processing, compared after to detect
/// what changed and emit the matching EngineEvents.
#[derive(Debug, Clone)]
struct StateSnapshot {
    sessions: Vec<(SessionId, String)>,
    active: Option<SessionId>,
    bytes_written: HashMap<SessionId, u64>,
    listing_revision: u64,
    buffer_revision: u64,
    connection: ConnectionState,
}

impl StateSnapshot {
    fn capture(state: &WorkspaceState) -> Self {
        Self {
            sessions: state
                .registry
                .iter()
                .map(|s| (s.id.clone(), s.label.clone()))
                .collect(),
            active: state.registry.active_id().cloned(),
            bytes_written: state
                .registry
                .iter()
                .map(|s| (s.id.clone(), s.surface().bytes_written()))
                .collect(),
            listing_revision: state.files.listing_revision(),
            buffer_revision: state.files.buffer_revision(),
            connection: state.connection.clone(),
        }
    }
}

/// Orchestration engine for one workspace.
pub struct Engine {
    /// Workspace state (the Model)
    pub state: WorkspaceState,

    /// Shared workspace channel
    channel: Arc<dyn Channel>,

    /// Persisted layout
    layout: LayoutStore,

    /// Where downloads are written
    download_dir: PathBuf,

    /// Sender half of the message channel; clone for input sources.
    msg_tx: mpsc::Sender<Message>,

    /// Receiver half of the message channel
    msg_rx: mpsc::Receiver<Message>,

    /// Event broadcaster for external consumers
    event_tx: broadcast::Sender<EngineEvent>,
}

impl Engine {
    /// Create an engine over an existing state, channel and layout store.
    pub fn new(state: WorkspaceState, channel: Arc<dyn Channel>, layout: LayoutStore) -> Self {
        let download_dir = state.settings.storage.resolved_download_dir();
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(256);
        let (event_tx, _) = broadcast::channel(256);

        Self {
            state,
            channel,
            layout,
            download_dir,
            msg_tx,
            msg_rx,
            event_tx,
        }
    }

    /// Create an engine with the file-backed layout store from `settings`.
    pub fn from_settings(
        workspace: WorkspaceKey,
        settings: Settings,
        channel: Arc<dyn Channel>,
    ) -> Self {
        let layout = LayoutStore::new(FileStore::new(settings.storage.resolved_state_dir()));
        Self::new(WorkspaceState::new(workspace, settings), channel, layout)
    }

    /// Subscribe to engine events.
    ///
    /// Slow subscribers lose the oldest events
    /// (`broadcast::error::RecvError::Lagged`).
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Get a clone of the message sender for spawning input sources.
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    pub fn layout(&self) -> &LayoutStore {
        &self.layout
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn set_download_dir(&mut self, dir: impl Into<PathBuf>) {
        self.download_dir = dir.into();
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    /// Restore the stored layout (or cold-start) and request the listing.
    pub fn startup(&mut self) {
        let snapshot = self.layout.load();
        self.process_message(Message::Restore { snapshot });
    }

    /// Process a single message through the TEA update cycle.
    pub fn process_message(&mut self, msg: Message) {
        self.process_message_at(msg, Instant::now());
    }

    /// Process a message at an explicit instant (timer-driven tests).
    pub fn process_message_at(&mut self, msg: Message, now: Instant) {
        let pre = StateSnapshot::capture(&self.state);

        let mut next = Some(msg);
        while let Some(msg) = next {
            let result = handler::update(&mut self.state, msg, now);
            for action in result.actions {
                self.execute(action);
            }
            next = result.message;
        }

        let post = StateSnapshot::capture(&self.state);
        self.emit_events(&pre, &post);
    }

    /// Drain and process all queued messages. Returns the count processed.
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    /// Process queued messages until quit or every sender is gone.
    pub async fn run(&mut self) {
        while !self.should_quit() {
            match self.msg_rx.recv().await {
                Some(msg) => self.process_message(msg),
                None => break,
            }
        }
        info!("Engine loop finished");
    }

    /// Forward channel events into the message loop.
    pub fn spawn_channel_bridge(&self, mut events: mpsc::Receiver<ChannelEvent>) -> JoinHandle<()> {
        let tx = self.msg_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if tx.send(Message::Channel(event)).await.is_err() {
                    break;
                }
            }
            debug!("Channel bridge finished");
        })
    }

    /// Send `Message::Tick` every `period`.
    pub fn spawn_ticker(&self, period: Duration) -> JoinHandle<()> {
        let tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(Message::Tick).await.is_err() {
                    break;
                }
            }
        })
    }

    fn execute(&mut self, action: UpdateAction) {
        match action {
            UpdateAction::Send(message) => {
                let event_name = message.event_name();
                let edited = match &message {
                    Outbound::FileEdit(edit) => Some(edit.file_path.clone()),
                    _ => None,
                };
                if let Err(e) = self.channel.send(message) {
                    warn!("Failed to send {}: {}", event_name, e);
                    if let Some(path) = edited {
                        self.state.files.on_edit_not_sent(&path);
                    }
                    self.emit(EngineEvent::Notification {
                        message: format!("Could not reach workspace: {}", e),
                    });
                }
            }
            UpdateAction::PersistLayout(snapshot) => {
                if let Err(e) = self.layout.save_snapshot(&snapshot) {
                    warn!("Failed to save layout: {}", e);
                }
            }
            UpdateAction::ClearLayout => {
                if let Err(e) = self.layout.reset() {
                    warn!("Failed to clear layout: {}", e);
                }
            }
            UpdateAction::SaveDownload(download) => match self.save_download(&download) {
                Ok(path) => {
                    info!("Saved download to {:?}", path);
                    self.emit(EngineEvent::DownloadSaved { path });
                }
                Err(e) => {
                    warn!("Failed to save download {}: {}", download.filename, e);
                    self.emit(EngineEvent::Notification {
                        message: e.to_string(),
                    });
                }
            },
            UpdateAction::Notify { message } => {
                self.emit(EngineEvent::Notification { message });
            }
        }
    }

    /// Write a download without clobbering existing files.
    fn save_download(&self, download: &Download) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.download_dir).map_err(|e| {
            Error::storage(&self.download_dir, format!("Failed to create directory: {}", e))
        })?;
        let path = unique_path(&self.download_dir, &download.filename);
        std::fs::write(&path, &download.bytes)
            .map_err(|e| Error::storage(&path, format!("Failed to write download: {}", e)))?;
        Ok(path)
    }

    /// Emit EngineEvents for the changes between two snapshots.
    fn emit_events(&self, pre: &StateSnapshot, post: &StateSnapshot) {
        for (id, _) in &pre.sessions {
            if !post.sessions.iter().any(|(other, _)| other == id) {
                self.emit(EngineEvent::SessionClosed { id: id.clone() });
            }
        }

        for (id, label) in &post.sessions {
            if !pre.sessions.iter().any(|(other, _)| other == id) {
                self.emit(EngineEvent::SessionOpened {
                    id: id.clone(),
                    label: label.clone(),
                });
            }
        }

        if pre.active != post.active {
            if let Some(id) = &post.active {
                self.emit(EngineEvent::SessionActivated { id: id.clone() });
            }
        }

        for session in self.state.registry.iter() {
            let before = pre.bytes_written.get(&session.id).copied().unwrap_or(0);
            let after = post.bytes_written.get(&session.id).copied().unwrap_or(0);
            if after <= before {
                continue;
            }
            let fresh = usize::try_from(after - before).unwrap_or(usize::MAX);
            let output = session.surface().tail(fresh);
            self.emit(EngineEvent::TerminalOutput {
                id: session.id.clone(),
                output: String::from_utf8_lossy(&output).into_owned(),
            });
        }

        if pre.listing_revision != post.listing_revision {
            let listing = self.state.files.listing();
            self.emit(EngineEvent::FileList {
                entries: listing.entries.clone(),
                error: listing.error.clone(),
            });
        }

        if pre.buffer_revision != post.buffer_revision {
            let buffer = self.state.files.buffer();
            match buffer.current_file() {
                Some(path) => self.emit(EngineEvent::FileOpened {
                    path: path.to_string(),
                    mode: buffer.mode(),
                    content: buffer.content().to_string(),
                }),
                None => self.emit(EngineEvent::EditorCleared),
            }
        }

        if pre.connection != post.connection {
            self.emit(EngineEvent::Connection {
                state: describe_connection(&post.connection),
            });
        }
    }

    /// Emit a single EngineEvent to all subscribers.
    ///
    /// Having no subscribers is not an error.
    fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }
}

fn describe_connection(state: &ConnectionState) -> String {
    match state {
        ConnectionState::Disconnected => "disconnected".to_string(),
        ConnectionState::Connecting => "connecting".to_string(),
        ConnectionState::Connected => "connected".to_string(),
        ConnectionState::Reconnecting { attempt } => format!("reconnecting ({})", attempt),
    }
}

/// `dir/name`, or `dir/stem (n).ext` for the first free `n` if taken.
fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, ext) = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    };
    (1..)
        .map(|n| match ext {
            Some(ext) => dir.join(format!("{} ({}).{}", stem, n, ext)),
            None => dir.join(format!("{} ({})", stem, n)),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests;
