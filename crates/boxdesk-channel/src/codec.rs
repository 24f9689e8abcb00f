//! Text frame encoding for channel messages

use boxdesk_core::prelude::*;
use boxdesk_core::{Inbound, Outbound};

/// Serialize an outbound message into a text frame.
pub fn encode_frame(message: &Outbound) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

/// Parse a text frame into an inbound message.
///
/// Frames with an unknown event name or a malformed payload are logged and
/// skipped; they never tear down the connection.
pub fn decode_frame(text: &str) -> Option<Inbound> {
    match serde_json::from_str::<Inbound>(text) {
        Ok(message) => Some(message),
        Err(err) => {
            let event = serde_json::from_str::<serde_json::Value>(text)
                .ok()
                .and_then(|v| v.get("event").and_then(|e| e.as_str()).map(str::to_string));
            match event {
                Some(name) => debug!("Channel: ignoring event '{}': {}", name, err),
                None => debug!(
                    "Channel: ignoring unparseable frame: {}",
                    text.chars().take(120).collect::<String>()
                ),
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxdesk_core::{SessionId, WorkspaceKey};

    #[test]
    fn test_encode_terminal_input() {
        let frame = encode_frame(&Outbound::terminal_input(
            &WorkspaceKey::new("box"),
            &SessionId::new("t1"),
            "ls\n",
        ))
        .unwrap();
        assert!(frame.contains("\"event\":\"terminal_input\""));
        assert!(frame.contains("\"tab_id\":\"t1\""));
    }

    #[test]
    fn test_decode_file_list() {
        let frame = r#"{"event":"file_list","data":{"container_name":"box","files":["src/","a.py"]}}"#;
        match decode_frame(frame) {
            Some(Inbound::FileList(list)) => {
                assert_eq!(list.container_name.as_deref(), Some("box"));
                assert_eq!(list.files, vec!["src/", "a.py"]);
                assert!(list.request_id.is_none());
            }
            other => panic!("unexpected decode result: {:?}", other),
        }
    }

    #[test]
    fn test_decode_unknown_event_is_skipped() {
        assert!(decode_frame(r#"{"event":"container_stats","data":{}}"#).is_none());
    }

    #[test]
    fn test_decode_garbage_is_skipped() {
        assert!(decode_frame("not json at all").is_none());
        assert!(decode_frame("").is_none());
    }

    #[test]
    fn test_decode_download_response() {
        let frame = r#"{"event":"download_file_response","data":{"file_path":"out/a.bin","filename":"a.bin","content":"AAE="}}"#;
        match decode_frame(frame) {
            Some(Inbound::DownloadFileResponse(payload)) => {
                assert_eq!(payload.filename, "a.bin");
                assert_eq!(payload.content, "AAE=");
            }
            other => panic!("unexpected decode result: {:?}", other),
        }
    }
}
