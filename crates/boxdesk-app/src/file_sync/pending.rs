//! Pending request tracking for request timeouts

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Remote requests that expect a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestKind {
    Listing,
    Read,
    Download,
    Delete,
}

impl RequestKind {
    /// Operation name used in user-facing errors
    pub fn operation(&self) -> &'static str {
        match self {
            RequestKind::Listing => "List files",
            RequestKind::Read => "Open file",
            RequestKind::Download => "Download",
            RequestKind::Delete => "Delete",
        }
    }
}

/// Issue times of unanswered requests, keyed by kind and path
///
/// The same request may be outstanding several times (downloading one file
/// twice); each issue is answered or expired on its own, oldest first.
#[derive(Debug, Default)]
pub struct PendingRequests {
    issued: HashMap<(RequestKind, String), VecDeque<Instant>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more outstanding request.
    pub fn insert(&mut self, kind: RequestKind, path: impl Into<String>, now: Instant) {
        self.issued
            .entry((kind, path.into()))
            .or_default()
            .push_back(now);
    }

    /// Replace every outstanding request for the key with a single new one.
    pub fn restart(&mut self, kind: RequestKind, path: impl Into<String>, now: Instant) {
        self.issued.insert((kind, path.into()), VecDeque::from([now]));
    }

    /// Mark the oldest outstanding request answered. Returns false if none
    /// was pending (never issued, already answered, or expired).
    pub fn complete(&mut self, kind: RequestKind, path: &str) -> bool {
        let key = (kind, path.to_string());
        let Some(times) = self.issued.get_mut(&key) else {
            return false;
        };
        let answered = times.pop_front().is_some();
        if times.is_empty() {
            self.issued.remove(&key);
        }
        answered
    }

    /// Mark every outstanding request for the key answered.
    pub fn complete_all(&mut self, kind: RequestKind, path: &str) -> bool {
        self.issued.remove(&(kind, path.to_string())).is_some()
    }

    pub fn contains(&self, kind: RequestKind, path: &str) -> bool {
        self.issued.contains_key(&(kind, path.to_string()))
    }

    /// Remove requests older than `timeout` and return their keys, sorted by
    /// kind then path. A key is reported once however many of its requests
    /// expired.
    pub fn expire(&mut self, now: Instant, timeout: Duration) -> Vec<(RequestKind, String)> {
        let mut expired = Vec::new();
        self.issued.retain(|key, times| {
            let before = times.len();
            times.retain(|issued| now.saturating_duration_since(*issued) < timeout);
            if times.len() < before {
                expired.push(key.clone());
            }
            !times.is_empty()
        });
        expired.sort();
        expired
    }

    /// Number of outstanding requests
    pub fn len(&self) -> usize {
        self.issued.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}
