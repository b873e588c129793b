//! Line buffer for console input

use crate::config::OverflowPolicy;

/// Hard upper bound on line length, in bytes
pub const LINE_CAPACITY: usize = 256;

/// Line input buffer
///
/// Holds at most one pending line. Bytes past `limit` are dropped and the
/// line is flagged as overflowed so the caller can apply its policy.
/// Whitespace past the limit only counts once more content follows it,
/// since trimming would remove it anyway.
pub struct LineBuffer {
    buf: [u8; LINE_CAPACITY],
    len: usize,
    limit: usize,
    /// Bytes dropped since the last clear
    dropped: usize,
    /// Whitespace dropped after the last dropped content byte
    dropped_space: usize,
}

impl LineBuffer {
    /// Create empty buffer using the full capacity
    pub const fn new() -> Self {
        Self::with_limit(LINE_CAPACITY)
    }

    /// Create empty buffer accepting at most `limit` bytes (clamped to capacity)
    pub const fn with_limit(limit: usize) -> Self {
        let limit = if limit > LINE_CAPACITY { LINE_CAPACITY } else { limit };
        Self {
            buf: [0u8; LINE_CAPACITY],
            len: 0,
            limit,
            dropped: 0,
            dropped_space: 0,
        }
    }

    /// Push a byte
    ///
    /// Returns `false` if the byte did not fit.
    pub fn push(&mut self, c: u8) -> bool {
        if self.len < self.limit {
            self.buf[self.len] = c;
            self.len += 1;
            true
        } else if is_space(c) {
            self.dropped_space = self.dropped_space.saturating_add(1);
            false
        } else {
            self.dropped = self
                .dropped
                .saturating_add(self.dropped_space)
                .saturating_add(1);
            self.dropped_space = 0;
            false
        }
    }

    /// Clear buffer and overflow state
    pub fn clear(&mut self) {
        self.len = 0;
        self.dropped = 0;
        self.dropped_space = 0;
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Content with surrounding whitespace removed
    pub fn trimmed(&self) -> &[u8] {
        trim(self.as_bytes())
    }

    /// Get buffer length
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of bytes this buffer keeps per line
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// True once a non-whitespace byte has been dropped for lack of space
    pub fn overflowed(&self) -> bool {
        self.dropped > 0
    }

    /// Number of bytes dropped since the last clear
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Whether the pending line should be thrown away under `policy`
    pub fn must_discard(&self, policy: OverflowPolicy) -> bool {
        self.overflowed() && policy == OverflowPolicy::Discard
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// C `isspace` set: space, \t, \n, \v, \f, \r
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// Strip leading and trailing whitespace
pub fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_space(b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|&b| !is_space(b)).map_or(start, |i| i + 1);
    &bytes[start..end]
}
