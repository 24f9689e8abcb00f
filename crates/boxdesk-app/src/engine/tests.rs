//! Engine tests driven through a recording channel and in-memory layout store

use std::sync::Arc;

use base64::Engine as _;
use boxdesk_channel::test_utils::RecordingChannel;
use boxdesk_channel::ConnectionState;
use boxdesk_core::{DownloadPayload, FileContent, FileList, Inbound, Outbound};
use tokio::sync::broadcast;

use super::*;
use crate::layout::{KeyValueStore, MemoryStore, LAYOUT_KEY};

fn engine_with(store: MemoryStore) -> (Engine, Arc<RecordingChannel>) {
    let channel = Arc::new(RecordingChannel::new());
    let state = WorkspaceState::new(WorkspaceKey::new("box"), Settings::default());
    let engine = Engine::new(state, channel.clone(), LayoutStore::new(store));
    (engine, channel)
}

fn drain(rx: &mut broadcast::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn test_startup_without_snapshot_opens_default_session() {
    let (mut engine, channel) = engine_with(MemoryStore::new());
    let mut rx = engine.subscribe();

    engine.startup();

    let sent = channel.sent();
    assert!(matches!(&sent[0], Outbound::TerminalInput(input) if input.input == "clear\n"));
    assert!(matches!(sent[1], Outbound::ListFiles(_)));

    let events = drain(&mut rx);
    assert!(matches!(events[0], EngineEvent::SessionOpened { .. }));
    assert!(matches!(events[1], EngineEvent::SessionActivated { .. }));

    let stored = engine.layout().load().unwrap();
    assert_eq!(stored.open_tabs.len(), 1);
}

#[test]
fn test_startup_restores_stored_snapshot() {
    let mut store = MemoryStore::new();
    store
        .set(
            LAYOUT_KEY,
            r#"{"sidebarWidth":240,"openTabs":[{"id":"a","label":"X"}],"activeTabId":"a"}"#,
        )
        .unwrap();
    let (mut engine, _channel) = engine_with(store);

    engine.startup();

    assert_eq!(engine.state.registry.len(), 1);
    assert_eq!(engine.state.registry.active_id(), Some(&SessionId::new("a")));
    assert_eq!(engine.state.panels.sidebar_width, Some(240));
}

#[test]
fn test_malformed_snapshot_falls_back_to_defaults() {
    let mut store = MemoryStore::new();
    store.set(LAYOUT_KEY, "{\"openTabs\": 7").unwrap();
    let (mut engine, _channel) = engine_with(store);

    engine.startup();
    assert_eq!(engine.state.registry.len(), 1);
}

#[test]
fn test_terminal_output_event_carries_new_bytes_only() {
    let (mut engine, _channel) = engine_with(MemoryStore::new());
    engine.startup();
    let id = engine.state.registry.active_id().unwrap().clone();
    let mut rx = engine.subscribe();

    for chunk in ["$ ", "ls\r\n"] {
        engine.process_message(Message::Channel(ChannelEvent::Message(
            Inbound::TerminalOutput(boxdesk_core::TerminalOutput {
                tab_id: Some(id.clone()),
                output: chunk.to_string(),
            }),
        )));
    }

    let outputs: Vec<String> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            EngineEvent::TerminalOutput { output, .. } => Some(output),
            _ => None,
        })
        .collect();
    assert_eq!(outputs, vec!["$ ".to_string(), "ls\r\n".to_string()]);
}

#[test]
fn test_applied_listing_emits_file_list() {
    let (mut engine, _channel) = engine_with(MemoryStore::new());
    engine.startup();
    let mut rx = engine.subscribe();

    engine.process_message(Message::Channel(ChannelEvent::Message(Inbound::FileList(
        FileList {
            container_name: Some("box".into()),
            files: vec!["src/".into(), "a.txt".into()],
            error: None,
            request_id: None,
        },
    ))));
    engine.process_message(Message::Channel(ChannelEvent::Message(Inbound::FileList(
        FileList {
            container_name: Some("other".into()),
            files: vec![],
            error: None,
            request_id: None,
        },
    ))));

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], EngineEvent::FileList { entries, .. } if entries.len() == 2));
}

#[test]
fn test_closed_channel_surfaces_notification() {
    let (mut engine, channel) = engine_with(MemoryStore::new());
    engine.startup();
    channel.set_state(ConnectionState::Disconnected);
    let mut rx = engine.subscribe();

    engine.process_message(Message::RefreshFiles);

    let events = drain(&mut rx);
    assert!(matches!(&events[0], EngineEvent::Notification { message } if message.contains("Could not reach")));
}

#[test]
fn test_edit_lost_on_closed_channel_is_resent_after_reconnect() {
    let (mut engine, channel) = engine_with(MemoryStore::new());
    engine.startup();
    engine.process_message(Message::OpenFile {
        path: "a.txt".into(),
    });
    engine.process_message(Message::Channel(ChannelEvent::Message(Inbound::FileContent(
        FileContent {
            file_path: "a.txt".into(),
            content: Some("one".into()),
            mime_type: None,
            error: None,
        },
    ))));
    channel.take();

    channel.set_state(ConnectionState::Disconnected);
    engine.process_message(Message::EditorChanged {
        content: "one two".into(),
    });
    assert!(channel.sent().is_empty());

    channel.set_state(ConnectionState::Connected);
    engine.process_message(Message::EditorChanged {
        content: "one two".into(),
    });
    assert_eq!(
        channel.take(),
        vec![Outbound::file_edit(&WorkspaceKey::new("box"), "a.txt", "one two")]
    );
}

#[test]
fn test_download_written_without_clobbering() {
    let temp = tempfile::tempdir().unwrap();
    let (mut engine, _channel) = engine_with(MemoryStore::new());
    engine.set_download_dir(temp.path());
    engine.startup();
    std::fs::write(temp.path().join("data.txt"), b"existing").unwrap();
    let mut rx = engine.subscribe();

    engine.process_message(Message::DownloadFile {
        path: "dir/data.txt".into(),
    });
    engine.process_message(Message::Channel(ChannelEvent::Message(
        Inbound::DownloadFileResponse(DownloadPayload {
            file_path: Some("dir/data.txt".into()),
            filename: "data.txt".into(),
            content: base64::engine::general_purpose::STANDARD.encode("hello"),
        }),
    )));

    let expected = temp.path().join("data (1).txt");
    let events = drain(&mut rx);
    assert!(events.contains(&EngineEvent::DownloadSaved {
        path: expected.clone()
    }));
    assert_eq!(std::fs::read(&expected).unwrap(), b"hello");
    assert_eq!(std::fs::read(temp.path().join("data.txt")).unwrap(), b"existing");
}

#[test]
fn test_reset_layout_clears_then_rewrites_defaults() {
    let (mut engine, _channel) = engine_with(MemoryStore::new());
    engine.startup();
    engine.process_message(Message::OpenTerminal);
    engine.process_message(Message::ResizeEditor { height: 420 });
    assert_eq!(engine.layout().load().unwrap().open_tabs.len(), 2);

    engine.process_message(Message::ResetLayout);

    let stored = engine.layout().load().unwrap();
    assert_eq!(stored.open_tabs.len(), 1);
    assert_eq!(stored.editor_height, None);
}

#[tokio::test]
async fn test_channel_bridge_feeds_message_loop() {
    let (mut engine, _channel) = engine_with(MemoryStore::new());
    engine.startup();
    let (tx, rx) = mpsc::channel(8);
    let bridge = engine.spawn_channel_bridge(rx);

    tx.send(ChannelEvent::Connected).await.unwrap();
    drop(tx);
    bridge.await.unwrap();

    assert_eq!(engine.drain_pending_messages(), 1);
    assert_eq!(engine.state.connection, ConnectionState::Connected);
}

#[tokio::test]
async fn test_run_stops_on_quit() {
    let (mut engine, _channel) = engine_with(MemoryStore::new());
    let tx = engine.msg_sender();
    tx.send(Message::Restore { snapshot: None }).await.unwrap();
    tx.send(Message::Quit).await.unwrap();

    engine.run().await;
    assert!(engine.should_quit());
    assert_eq!(engine.state.registry.len(), 1);
}

#[test]
fn test_unique_path_numbering() {
    let temp = tempfile::tempdir().unwrap();
    assert_eq!(unique_path(temp.path(), "a.txt"), temp.path().join("a.txt"));
    std::fs::write(temp.path().join("a.txt"), b"").unwrap();
    std::fs::write(temp.path().join("a (1).txt"), b"").unwrap();
    assert_eq!(unique_path(temp.path(), "a.txt"), temp.path().join("a (2).txt"));
    std::fs::write(temp.path().join("Makefile"), b"").unwrap();
    assert_eq!(
        unique_path(temp.path(), "Makefile"),
        temp.path().join("Makefile (1)")
    );
}
