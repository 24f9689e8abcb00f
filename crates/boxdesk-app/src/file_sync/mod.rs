//! File sync module - the editor buffer and its remote file
//!
//! - `pending`: issue-time tracking of unanswered requests
//!
//! The controller produces [`Outbound`] messages and applies inbound
//! responses; it never talks to the channel itself. Edits are full-buffer
//! replacements and the last write to reach the remote wins.

pub mod pending;

use std::time::{Duration, Instant};

use base64::Engine as _;

use boxdesk_core::prelude::*;
use boxdesk_core::{
    CreateKind, DownloadPayload, FileContent, FileEntry, FileList, OperationError, Outbound,
    SyntaxMode, WorkspaceKey,
};

pub use pending::{PendingRequests, RequestKind};

/// Path under which listing requests are tracked
const LISTING_PATH: &str = "";

/// The single shared text-editing surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorBuffer {
    current_file: Option<String>,
    content: String,
    last_synced_content: String,
    mode: SyntaxMode,
    /// The last edit never left the client; resend even if unchanged
    resync: bool,
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self {
            current_file: None,
            content: String::new(),
            last_synced_content: String::new(),
            mode: SyntaxMode::Text,
            resync: false,
        }
    }
}

impl EditorBuffer {
    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn last_synced_content(&self) -> &str {
        &self.last_synced_content
    }

    pub fn mode(&self) -> SyntaxMode {
        self.mode
    }

    pub fn is_bound(&self) -> bool {
        self.current_file.is_some()
    }

    /// Replace the buffer with freshly loaded remote content.
    fn bind(&mut self, path: String, content: String, mode: SyntaxMode) {
        self.last_synced_content = content.clone();
        self.content = content;
        self.current_file = Some(path);
        self.mode = mode;
        self.resync = false;
    }

    fn unbind(&mut self) {
        self.current_file = None;
        self.content.clear();
        self.last_synced_content.clear();
        self.resync = false;
    }
}

/// Most recently applied directory listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileListing {
    pub entries: Vec<FileEntry>,
    /// Remote failure reported in place of entries
    pub error: Option<String>,
}

/// Decoded download ready to be written locally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Base name only, never a path
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Reconciles the editor buffer with the remote filesystem
#[derive(Debug)]
pub struct FileSyncController {
    key: WorkspaceKey,
    buffer: EditorBuffer,
    listing: FileListing,
    pending: PendingRequests,

    /// Counter of issued listing requests
    next_listing_id: u64,

    /// Highest listing id applied (or invalidated by a timeout)
    applied_listing_id: u64,

    /// The outstanding listing timed out; unnumbered replies are stale
    /// until the next request
    listing_expired: bool,

    /// Path of the most recent `open`; other content responses are stale
    pending_open: Option<String>,

    /// Bumped whenever a listing is applied
    listing_revision: u64,

    /// Bumped whenever the buffer is bound or unbound
    buffer_revision: u64,
}

impl FileSyncController {
    pub fn new(key: WorkspaceKey) -> Self {
        Self {
            key,
            buffer: EditorBuffer::default(),
            listing: FileListing::default(),
            pending: PendingRequests::new(),
            next_listing_id: 0,
            applied_listing_id: 0,
            listing_expired: false,
            pending_open: None,
            listing_revision: 0,
            buffer_revision: 0,
        }
    }

    pub fn key(&self) -> &WorkspaceKey {
        &self.key
    }

    pub fn buffer(&self) -> &EditorBuffer {
        &self.buffer
    }

    pub fn listing(&self) -> &FileListing {
        &self.listing
    }

    pub fn pending(&self) -> &PendingRequests {
        &self.pending
    }

    pub fn pending_open(&self) -> Option<&str> {
        self.pending_open.as_deref()
    }

    pub fn listing_revision(&self) -> u64 {
        self.listing_revision
    }

    pub fn buffer_revision(&self) -> u64 {
        self.buffer_revision
    }

    // ─────────────────────────────────────────────────────────
    // Listing
    // ─────────────────────────────────────────────────────────

    /// Request a fresh directory listing. Nothing is cached.
    pub fn request_listing(&mut self, now: Instant) -> Outbound {
        self.next_listing_id += 1;
        self.listing_expired = false;
        self.pending.insert(RequestKind::Listing, LISTING_PATH, now);
        Outbound::list_files(&self.key, Some(self.next_listing_id))
    }

    /// Apply a listing response. Returns false if it was stale.
    ///
    /// A listing for another workspace is stale. When the remote echoes
    /// `request_id`, a response older than the last applied one is stale.
    pub fn on_file_list(&mut self, list: FileList) -> bool {
        match list.container_name.as_deref() {
            Some(name) if self.key.matches(name) => {}
            other => {
                debug!(
                    "Dropping file list for workspace {:?} (current {})",
                    other, self.key
                );
                return false;
            }
        }

        if list.request_id.is_none() && self.listing_expired {
            debug!("Dropping unnumbered file list after its request timed out");
            return false;
        }

        if let Some(request_id) = list.request_id {
            if request_id <= self.applied_listing_id {
                debug!(
                    "Dropping stale file list #{} (applied #{})",
                    request_id, self.applied_listing_id
                );
                return false;
            }
            self.applied_listing_id = request_id;
        }

        // Unnumbered listings (pushed after create/delete) answer whatever is outstanding
        let answers_latest = list
            .request_id
            .map_or(true, |id| id >= self.next_listing_id);
        if answers_latest {
            self.pending.complete_all(RequestKind::Listing, LISTING_PATH);
        } else {
            self.pending.complete(RequestKind::Listing, LISTING_PATH);
        }

        self.listing = match list.error {
            Some(error) => {
                warn!("Remote failed to list files: {}", error);
                FileListing {
                    entries: Vec::new(),
                    error: Some(error),
                }
            }
            None => FileListing {
                entries: list.files.iter().map(|f| FileEntry::from_listing(f)).collect(),
                error: None,
            },
        };
        self.listing_revision += 1;
        true
    }

    // ─────────────────────────────────────────────────────────
    // Open / edit
    // ─────────────────────────────────────────────────────────

    /// Request the content of `path` for the editor. A previous open still
    /// in flight is superseded and no longer times out.
    pub fn open(&mut self, path: impl Into<String>, now: Instant) -> Outbound {
        let path = path.into();
        if let Some(previous) = self.pending_open.take() {
            self.pending.complete_all(RequestKind::Read, &previous);
        }
        self.pending.restart(RequestKind::Read, path.clone(), now);
        self.pending_open = Some(path.clone());
        Outbound::read_file(&self.key, path)
    }

    /// Apply a content response.
    ///
    /// Returns `Ok(true)` when the buffer was replaced and `Ok(false)` when the
    /// response is stale (not the latest `open`, or already timed out).
    ///
    /// # Errors
    ///
    /// [`Error::Remote`] when the remote reports a failure; the buffer is
    /// left untouched.
    pub fn on_file_content(&mut self, response: FileContent) -> Result<bool> {
        if self.pending_open.as_deref() != Some(response.file_path.as_str()) {
            debug!("Dropping stale content for {:?}", response.file_path);
            return Ok(false);
        }
        self.pending_open = None;
        self.pending.complete_all(RequestKind::Read, &response.file_path);

        if let Some(error) = response.error {
            return Err(Error::remote(
                RequestKind::Read.operation(),
                response.file_path,
                error,
            ));
        }

        let mode = SyntaxMode::resolve(&response.file_path, response.mime_type.as_deref());
        debug!("Opened {} as {}", response.file_path, mode);
        self.buffer.bind(
            response.file_path,
            response.content.unwrap_or_default(),
            mode,
        );
        self.buffer_revision += 1;
        Ok(true)
    }

    /// Record a buffer mutation.
    ///
    /// Emits a full-content edit only when a file is bound and the content
    /// differs from what was last synced, or the previous edit was never sent.
    pub fn on_local_edit(&mut self, content: impl Into<String>) -> Option<Outbound> {
        self.buffer.content = content.into();

        if !self.buffer.is_bound()
            || (!self.buffer.resync && self.buffer.content == self.buffer.last_synced_content)
        {
            return None;
        }

        self.buffer.resync = false;
        self.buffer.last_synced_content = self.buffer.content.clone();
        let path = self.buffer.current_file.as_deref()?;
        Some(Outbound::file_edit(&self.key, path, self.buffer.content.as_str()))
    }

    /// The edit for `path` could not be queued on the channel. The next local
    /// edit resends the full buffer even if its content is unchanged.
    pub fn on_edit_not_sent(&mut self, path: &str) {
        if self.buffer.current_file() == Some(path) {
            debug!("Edit of {} was not sent, resync on next edit", path);
            self.buffer.resync = true;
        }
    }

    /// Drop the bound file, listing and every outstanding request, as on a
    /// cold start. Listing ids keep counting so replies to requests issued
    /// before the reset are stale.
    pub fn reset(&mut self) {
        if self.buffer.is_bound() {
            self.buffer_revision += 1;
        }
        self.buffer = EditorBuffer::default();
        if self.listing != FileListing::default() {
            self.listing = FileListing::default();
            self.listing_revision += 1;
        }
        self.pending = PendingRequests::new();
        self.pending_open = None;
        self.applied_listing_id = self.next_listing_id;
        self.listing_expired = true;
    }

    // ─────────────────────────────────────────────────────────
    // Delete / download / create
    // ─────────────────────────────────────────────────────────

    /// Delete `path`. The call itself is the local confirmation: a bound
    /// buffer for `path` is unbound immediately.
    pub fn delete(&mut self, path: impl Into<String>, now: Instant) -> Outbound {
        let path = path.into();
        if self.buffer.current_file() == Some(path.as_str()) {
            self.buffer.unbind();
            self.buffer_revision += 1;
        }
        if self.pending_open.as_deref() == Some(path.as_str()) {
            self.pending_open = None;
            self.pending.complete_all(RequestKind::Read, &path);
        }
        self.pending.insert(RequestKind::Delete, path.clone(), now);
        Outbound::delete_file(&self.key, path)
    }

    pub fn download(&mut self, path: impl Into<String>, now: Instant) -> Outbound {
        let path = path.into();
        self.pending.insert(RequestKind::Download, path.clone(), now);
        Outbound::download_file(&self.key, path)
    }

    /// Decode a download payload.
    ///
    /// `Ok(None)` when the download already timed out.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] when the payload is not valid base64.
    pub fn on_download(&mut self, payload: DownloadPayload) -> Result<Option<Download>> {
        if let Some(path) = payload.file_path.as_deref() {
            if !self.pending.complete(RequestKind::Download, path) {
                debug!("Dropping download for {} (not pending)", path);
                return Ok(None);
            }
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.content.trim())
            .map_err(|e| Error::decode(format!("download of {}: {}", payload.filename, e)))?;

        Ok(Some(Download {
            filename: sanitize_filename(&payload.filename, payload.file_path.as_deref()),
            bytes,
        }))
    }

    pub fn create(&self, path: impl Into<String>, kind: CreateKind) -> Outbound {
        Outbound::create(&self.key, path, kind)
    }

    // ─────────────────────────────────────────────────────────
    // Acks and remote errors
    // ─────────────────────────────────────────────────────────

    pub fn on_deleted(&mut self, path: &str) {
        self.pending.complete(RequestKind::Delete, path);
        debug!("Remote deleted {}", path);
    }

    /// Turn a remote failure report into an error.
    ///
    /// Failures for tracked requests that already timed out are stale and
    /// yield `None`.
    pub fn on_operation_error(
        &mut self,
        operation: &str,
        kind: Option<RequestKind>,
        report: OperationError,
    ) -> Option<Error> {
        let path = report.file_path.unwrap_or_default();
        if let Some(kind) = kind {
            if !path.is_empty() && !self.pending.complete(kind, &path) {
                debug!("Dropping {} error for {} (not pending)", operation, path);
                return None;
            }
        }
        Some(Error::remote(operation, path, report.error))
    }

    /// Expire unanswered requests into `TimedOut` errors.
    pub fn expire(&mut self, now: Instant, timeout: Duration) -> Vec<Error> {
        self.pending
            .expire(now, timeout)
            .into_iter()
            .map(|(kind, path)| {
                match kind {
                    RequestKind::Read if self.pending_open.as_deref() == Some(path.as_str()) => {
                        self.pending_open = None;
                    }
                    RequestKind::Listing => {
                        // Every outstanding listing id is now stale
                        self.pending.complete_all(RequestKind::Listing, LISTING_PATH);
                        self.applied_listing_id = self.next_listing_id;
                        self.listing_expired = true;
                    }
                    _ => {}
                }
                let path = if kind == RequestKind::Listing {
                    self.key.to_string()
                } else {
                    path
                };
                Error::timed_out(kind.operation(), path)
            })
            .collect()
    }
}

/// Keep only the last path component of a remote file name.
fn sanitize_filename(filename: &str, file_path: Option<&str>) -> String {
    let base = |s: &str| {
        s.rsplit(['/', '\\'])
            .next()
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    };
    let name = base(filename);
    if !name.is_empty() && name != "." && name != ".." {
        return name;
    }
    file_path
        .map(base)
        .filter(|n| !n.is_empty() && n != "." && n != "..")
        .unwrap_or_else(|| "download".to_string())
}
