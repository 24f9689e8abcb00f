//! Render surface: the local visual buffer of one terminal session.

use std::collections::VecDeque;

/// Bytes retained when no limit is configured
pub const DEFAULT_SCROLLBACK_BYTES: usize = 1024 * 1024;

/// Exclusive handle to a terminal's output buffer.
///
/// Output is kept in arrival order; once the scrollback limit is exceeded the
/// oldest bytes are discarded first.
#[derive(Debug)]
pub struct RenderSurface {
    buffer: VecDeque<u8>,
    max_bytes: usize,
    /// Total bytes ever written, including discarded scrollback
    bytes_written: u64,
    active: bool,
}

impl Default for RenderSurface {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLLBACK_BYTES)
    }
}

impl RenderSurface {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            buffer: VecDeque::new(),
            max_bytes: max_bytes.max(1),
            bytes_written: 0,
            active: false,
        }
    }

    /// Append output bytes.
    pub fn write(&mut self, bytes: &[u8]) {
        self.bytes_written += bytes.len() as u64;
        if bytes.len() >= self.max_bytes {
            self.buffer.clear();
            self.buffer.extend(&bytes[bytes.len() - self.max_bytes..]);
            return;
        }
        let excess = (self.buffer.len() + bytes.len()).saturating_sub(self.max_bytes);
        self.buffer.drain(..excess);
        self.buffer.extend(bytes);
    }

    /// Retained output, oldest first
    pub fn contents(&self) -> Vec<u8> {
        self.buffer.iter().copied().collect()
    }

    /// The last `n` retained bytes (fewer if less is retained)
    pub fn tail(&self, n: usize) -> Vec<u8> {
        let start = self.buffer.len().saturating_sub(n);
        self.buffer.range(start..).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Retained output decoded lossily
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Only the registry toggles this, keeping exactly one surface active.
    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}
