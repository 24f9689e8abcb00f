//! Headless mode runner - connects the channel, drives the engine and
//! bridges stdin intents and stdout events

use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

use boxdesk_app::config::{self, Settings};
use boxdesk_app::engine::TICK_INTERVAL;
use boxdesk_app::{Engine, EngineEvent, Message};
use boxdesk_channel::{endpoint_url, WsChannel};
use boxdesk_core::prelude::*;
use boxdesk_core::WorkspaceKey;

use super::{HeadlessEvent, HeadlessIntent};

/// Command-line overrides of the `[connection]` settings
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub endpoint: Option<String>,
    pub workspace: Option<String>,
}

impl ConnectionOverrides {
    pub fn apply(self, settings: &mut Settings) {
        if let Some(endpoint) = self.endpoint {
            settings.connection.endpoint = endpoint;
        }
        if let Some(workspace) = self.workspace {
            settings.connection.workspace = workspace;
        }
    }
}

/// Resolve the workspace key from settings.
pub fn workspace_key(settings: &Settings) -> Result<WorkspaceKey> {
    let workspace = settings.connection.workspace.trim();
    if workspace.is_empty() {
        return Err(Error::config_invalid(
            "no workspace configured (set [connection] workspace or pass --workspace)",
        ));
    }
    Ok(WorkspaceKey::new(workspace))
}

/// Run in headless mode against the workspace configured under `base`.
pub async fn run_headless(base: &Path, overrides: ConnectionOverrides) -> Result<()> {
    let mut settings = config::load_settings(base);
    overrides.apply(&mut settings);

    let key = workspace_key(&settings)?;
    let url = endpoint_url(&settings.connection.endpoint, &key)?;

    info!("═══════════════════════════════════════════════════════");
    info!("boxdesk starting in HEADLESS mode");
    info!("Workspace: {} via {}", key, url);
    info!("═══════════════════════════════════════════════════════");

    let (channel, channel_events) = match WsChannel::connect(&url).await {
        Ok(connected) => connected,
        Err(e) => {
            HeadlessEvent::error(e.to_string()).emit();
            return Err(e);
        }
    };

    let mut engine = Engine::from_settings(key, settings, Arc::new(channel.clone()));

    let printer = tokio::spawn(print_events(engine.subscribe()));
    let bridge = engine.spawn_channel_bridge(channel_events);
    let ticker = engine.spawn_ticker(TICK_INTERVAL);
    let stdin = tokio::spawn(read_intents(
        BufReader::new(tokio::io::stdin()),
        engine.msg_sender(),
    ));

    engine.startup();
    engine.run().await;

    channel.disconnect();
    bridge.abort();
    ticker.abort();
    stdin.abort();

    // Dropping the engine closes the event stream so the printer can finish
    drop(engine);
    if let Err(e) = printer.await {
        warn!("Event printer ended abnormally: {}", e);
    }

    info!("boxdesk headless mode exiting");
    Ok(())
}

/// Print every engine event as an NDJSON line until the engine is gone.
async fn print_events(mut events: broadcast::Receiver<EngineEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => HeadlessEvent::new(event).emit(),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Headless output lagged, {} event(s) dropped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Feed intents from `reader` into the engine until EOF, a read error or
/// `quit`. The engine is told to quit in every case.
///
/// Malformed lines are reported on stdout and skipped.
pub async fn read_intents<R>(reader: R, msg_tx: mpsc::Sender<Message>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Stdin closed");
                let _ = msg_tx.send(Message::Quit).await;
                break;
            }
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                let _ = msg_tx.send(Message::Quit).await;
                break;
            }
        };

        let intent = match HeadlessIntent::parse(&line) {
            Ok(Some(intent)) => intent,
            Ok(None) => continue,
            Err(e) => {
                warn!("Invalid intent {:?}: {}", line, e);
                HeadlessEvent::error(format!("Invalid intent: {}", e)).emit();
                continue;
            }
        };

        let quit = intent == HeadlessIntent::Quit;
        for msg in intent.into_messages() {
            if msg_tx.send(msg).await.is_err() {
                return;
            }
        }
        if quit {
            break;
        }
    }
}
