/// Default ceiling on a single response body (1 MiB).
pub const DEFAULT_MAX_LEN: usize = 1024 * 1024;

/// Default size of each transport read (4 KiB).
pub const DEFAULT_READ_CHUNK_SIZE: usize = 4096;

/// Per-stream decoder settings.
///
/// ```text
/// ┌─────────────────┬──────────────────────────────────────────────────┐
/// │ Field           │ Purpose                                          │
/// ├─────────────────┼──────────────────────────────────────────────────┤
/// │ max_len         │ Buffer ceiling in bytes; crossing it is fatal    │
/// │ read_chunk_size │ Bytes requested per transport read               │
/// └─────────────────┴──────────────────────────────────────────────────┘
/// ```
///
/// The ceiling bounds memory against a producer that never closes the
/// object. It fires on the chunk that pushes the buffer strictly past
/// `max_len`, not at end-of-stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    pub max_len: usize,
    pub read_chunk_size: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

impl DecoderConfig {
    #[must_use]
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Zero is treated as one byte per read.
    #[must_use]
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size.max(1);
        self
    }
}
