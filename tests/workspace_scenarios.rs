//! End-to-end workspace scenarios through the public engine API

use std::sync::Arc;

use boxdesk_app::config::Settings;
use boxdesk_app::layout::{KeyValueStore, MemoryStore, LAYOUT_KEY};
use boxdesk_app::{Engine, EngineEvent, LayoutStore, Message, WorkspaceState};
use boxdesk_channel::test_utils::RecordingChannel;
use boxdesk_channel::ChannelEvent;
use boxdesk_core::{
    DownloadPayload, FileContent, FileList, Inbound, Outbound, SessionId, SyntaxMode, WorkspaceKey,
};

fn engine(workspace: &str, store: MemoryStore) -> (Engine, Arc<RecordingChannel>) {
    let channel = Arc::new(RecordingChannel::new());
    let state = WorkspaceState::new(WorkspaceKey::new(workspace), Settings::default());
    (
        Engine::new(state, channel.clone(), LayoutStore::new(store)),
        channel,
    )
}

fn remote(engine: &mut Engine, inbound: Inbound) {
    engine.process_message(Message::Channel(ChannelEvent::Message(inbound)));
}

#[test]
fn test_empty_registry_open_yields_one_active_cleared_session() {
    let (mut engine, channel) = engine("box", MemoryStore::new());
    engine.process_message(Message::OpenTerminal);

    assert_eq!(engine.state.registry.len(), 1);
    let id = engine.state.registry.active_id().unwrap().clone();
    assert_eq!(
        channel.sent(),
        vec![Outbound::terminal_input(&WorkspaceKey::new("box"), &id, "clear\n")]
    );
}

#[test]
fn test_closing_first_of_two_leaves_second_active() {
    let mut store = MemoryStore::new();
    store
        .set(
            LAYOUT_KEY,
            r#"{"openTabs":[{"id":"t1","label":"Shell"},{"id":"t2","label":"Shell 2"}],"activeTabId":"t1"}"#,
        )
        .unwrap();
    let (mut engine, _channel) = engine("box", store);
    engine.startup();

    engine.process_message(Message::CloseTerminal {
        id: SessionId::new("t1"),
    });

    assert_eq!(engine.state.registry.ids(), vec![SessionId::new("t2")]);
    assert_eq!(engine.state.registry.active_id(), Some(&SessionId::new("t2")));
    let stored = engine.layout().load().unwrap();
    assert_eq!(stored.active_tab_id, Some(SessionId::new("t2")));
}

#[test]
fn test_stored_snapshot_restores_session_and_sidebar() {
    let mut store = MemoryStore::new();
    store
        .set(
            LAYOUT_KEY,
            r#"{"sidebarWidth":240,"sessions":[{"id":"a","label":"X"}],"activeId":"a"}"#,
        )
        .unwrap();
    let (mut engine, _channel) = engine("box", store);
    let mut events = engine.subscribe();

    engine.startup();

    assert_eq!(engine.state.registry.ids(), vec![SessionId::new("a")]);
    assert_eq!(engine.state.registry.active_id(), Some(&SessionId::new("a")));
    assert_eq!(engine.state.panels.sidebar_width, Some(240));
    assert_eq!(
        events.try_recv().unwrap(),
        EngineEvent::SessionOpened {
            id: SessionId::new("a"),
            label: "X".into(),
        }
    );
}

#[test]
fn test_markdown_content_type_selects_markdown_mode() {
    let (mut engine, _channel) = engine("box", MemoryStore::new());
    engine.startup();
    let mut events = engine.subscribe();

    engine.process_message(Message::OpenFile {
        path: "report.md".into(),
    });
    remote(
        &mut engine,
        Inbound::FileContent(FileContent {
            file_path: "report.md".into(),
            content: Some("# Report".into()),
            mime_type: Some("text/markdown".into()),
            error: None,
        }),
    );

    assert_eq!(engine.state.files.buffer().mode(), SyntaxMode::Markdown);
    assert_eq!(
        events.try_recv().unwrap(),
        EngineEvent::FileOpened {
            path: "report.md".into(),
            mode: SyntaxMode::Markdown,
            content: "# Report".into(),
        }
    );
}

#[test]
fn test_stale_listing_for_old_workspace_is_ignored() {
    let (mut engine, _channel) = engine("new", MemoryStore::new());
    engine.startup();
    remote(
        &mut engine,
        Inbound::FileList(FileList {
            container_name: Some("new".into()),
            files: vec!["current.txt".into()],
            error: None,
            request_id: None,
        }),
    );
    let before = engine.state.files.listing().clone();
    let mut events = engine.subscribe();

    remote(
        &mut engine,
        Inbound::FileList(FileList {
            container_name: Some("old".into()),
            files: vec!["stale.txt".into()],
            error: None,
            request_id: None,
        }),
    );

    assert_eq!(engine.state.files.listing(), &before);
    assert!(events.try_recv().is_err());
}

#[test]
fn test_download_is_decoded_into_download_dir_without_clobbering() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "older").unwrap();

    let (mut engine, _channel) = engine("box", MemoryStore::new());
    engine.set_download_dir(dir.path());
    engine.startup();
    let mut events = engine.subscribe();

    engine.process_message(Message::DownloadFile {
        path: "docs/notes.txt".into(),
    });
    remote(
        &mut engine,
        Inbound::DownloadFileResponse(DownloadPayload {
            file_path: Some("docs/notes.txt".into()),
            filename: "notes.txt".into(),
            content: "aGVsbG8=".into(),
        }),
    );

    let saved = dir.path().join("notes (1).txt");
    assert_eq!(
        events.try_recv().unwrap(),
        EngineEvent::DownloadSaved {
            path: saved.clone()
        }
    );
    assert_eq!(std::fs::read_to_string(saved).unwrap(), "hello");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
        "older"
    );
}
