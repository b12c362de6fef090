use tsp_types::{ParsedObject, TypeError};
use tsp_wire::escape::scan_value;
use tsp_wire::layout::RESPONSE_MARKER;
use tsp_wire::scanner::StructuralScanner;

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::event::{DecoderEvent, EventSink};

/// Where the decoder is relative to the streamed `response` value.
///
/// ```text
///   SeekingKey ──marker found──▶ InValue ──unescaped `"`──▶ ValueClosed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParserState {
    /// `"response": "` has not been seen yet.
    SeekingKey,
    /// Inside the value; its text is being delivered as deltas.
    InValue,
    /// The value's closing quote has been seen.
    ValueClosed,
}

/// Incremental decoder for one legacy response stream.
///
/// Feed it transport chunks with [`consume`](Self::consume) and signal
/// end-of-stream with [`finish`](Self::finish). Chunk boundaries carry no
/// meaning: they may split the field marker, a multi-character escape, or
/// anything else.
///
/// Per chunk the decoder:
///
///   1. Appends the chunk to its buffer and enforces the size ceiling.
///   2. Feeds only the new bytes to a [`StructuralScanner`].
///   3. While seeking the key, searches for the marker starting just
///      before where the previous search stopped.
///   4. While in the value, decodes from the delivery cursor to the first
///      unescaped quote or the last complete escape, and emits the new
///      text as a `Delta`.
///   5. The first time the scanner reports balance, parses the whole
///      buffer; a successful parse emits `Complete` and ends the stream.
///      A balanced buffer that fails to parse cannot be repaired by more
///      input, so it is not parsed again until [`finish`](Self::finish).
///
/// Each byte is scanned a bounded number of times and the buffer is parsed
/// at most twice, so total work is linear in the stream length.
///
/// One `StreamDecoder` serves exactly one stream. It holds no shared
/// state; concurrent streams each get their own instance. Dropping it
/// mid-stream discards the buffer without emitting anything.
///
/// # Example
///
/// ```rust
/// use tsp_decoder::{DecoderEvent, StreamDecoder};
///
/// let mut decoder = StreamDecoder::new();
/// let mut events = decoder.consume("{\"response\": \"Ho");
/// events.extend(decoder.consume("la!\", \"currentCategory\": null}"));
///
/// assert!(matches!(&events[0], DecoderEvent::Delta(t) if t == "Ho"));
/// assert!(matches!(&events[1], DecoderEvent::Delta(t) if t == "la!"));
/// assert!(matches!(&events[2], DecoderEvent::Complete(o) if o.response == "Hola!"));
/// ```
#[derive(Debug)]
pub struct StreamDecoder {
    config: DecoderConfig,
    buffer: String,
    state: ParserState,
    /// Byte offset where the next marker search starts.
    search_from: usize,
    /// Byte offset of the first byte of the value.
    value_start: usize,
    /// Byte offset of the next undecoded value byte. Always on an escape
    /// boundary.
    raw_cursor: usize,
    /// Characters of the value emitted so far. Never decreases.
    delivered: usize,
    scanner: StructuralScanner,
    /// Full parses run so far. Non-zero on a live decoder means a balanced
    /// buffer already failed to parse.
    parse_attempts: usize,
    chunks: usize,
    finished: bool,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    #[must_use]
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            buffer: String::new(),
            state: ParserState::SeekingKey,
            search_from: 0,
            value_start: 0,
            raw_cursor: 0,
            delivered: 0,
            scanner: StructuralScanner::new(),
            parse_attempts: 0,
            chunks: 0,
            finished: false,
        }
    }

    /// Process one transport chunk.
    ///
    /// Returns the events it produced: at most one `Delta`, possibly
    /// followed by a terminal `Complete` or `Error`. Returns nothing once
    /// the stream has terminated.
    pub fn consume(&mut self, chunk: &str) -> Vec<DecoderEvent> {
        if self.finished {
            tracing::trace!(len = chunk.len(), "chunk after terminal event ignored");
            return Vec::new();
        }

        self.buffer.push_str(chunk);
        self.chunks += 1;
        tracing::trace!(
            chunk = self.chunks,
            len = chunk.len(),
            buffered = self.buffer.len(),
            "chunk received"
        );

        if self.buffer.len() > self.config.max_len {
            let len = self.buffer.len();
            return self.fail(DecodeError::ExceededMaxLength {
                len,
                limit: self.config.max_len,
            });
        }

        self.scanner.feed(chunk.as_bytes());
        let mut events = Vec::new();

        if self.state == ParserState::SeekingKey {
            self.seek_key();
        }
        if self.state == ParserState::InValue {
            if let Some(delta) = self.advance_value() {
                events.push(DecoderEvent::Delta(delta));
            }
        }

        if self.parse_attempts == 0 && self.scanner.is_balanced() {
            match self.parse_buffer() {
                Ok(object) => events.push(self.complete(object)),
                Err(err) => {
                    tracing::debug!(error = %err, "balanced buffer did not parse, deferring to end of stream");
                }
            }
        }

        events
    }

    /// Signal end-of-stream.
    ///
    /// Emits `Error(UnterminatedValue)` if the value never closed,
    /// otherwise makes a final parse attempt and emits `Complete` or
    /// `Error(InvalidFinalJson)`. Returns nothing if the stream already
    /// terminated.
    pub fn finish(&mut self) -> Vec<DecoderEvent> {
        if self.finished {
            return Vec::new();
        }

        if self.state != ParserState::ValueClosed {
            let received = self.buffer.len();
            return self.fail(DecodeError::UnterminatedValue { received });
        }

        match self.parse_buffer() {
            Ok(object) => vec![self.complete(object)],
            Err(err) => self.fail(DecodeError::InvalidFinalJson {
                reason: err.to_string(),
            }),
        }
    }

    /// [`consume`](Self::consume), dispatching each event to `sink`.
    pub fn consume_into<S: EventSink + ?Sized>(&mut self, chunk: &str, sink: &mut S) {
        for event in self.consume(chunk) {
            event.dispatch(sink);
        }
    }

    /// [`finish`](Self::finish), dispatching each event to `sink`.
    pub fn finish_into<S: EventSink + ?Sized>(&mut self, sink: &mut S) {
        for event in self.finish() {
            event.dispatch(sink);
        }
    }

    /// Abandon the stream without emitting anything.
    ///
    /// Used when the consumer cancels or the transport fails below the
    /// decoder. The buffer is released immediately.
    pub fn abandon(&mut self) {
        if !self.finished {
            tracing::debug!(buffered = self.buffer.len(), "stream abandoned");
            self.terminate();
        }
    }

    #[must_use]
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Number of value characters already emitted as deltas.
    #[must_use]
    pub fn delivery_cursor(&self) -> usize {
        self.delivered
    }

    /// Bytes currently buffered. Zero after termination.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Chunks consumed so far.
    #[must_use]
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Whether a terminal event has been emitted (or the stream abandoned).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn seek_key(&mut self) {
        let marker = RESPONSE_MARKER.as_bytes();
        let haystack = &self.buffer.as_bytes()[self.search_from..];

        if let Some(pos) = haystack.windows(marker.len()).position(|w| w == marker) {
            self.value_start = self.search_from + pos + marker.len();
            self.raw_cursor = self.value_start;
            self.state = ParserState::InValue;
            tracing::debug!(offset = self.value_start, "response value located");
        } else {
            // Keep enough tail to catch a marker split across chunks.
            self.search_from = self.buffer.len().saturating_sub(marker.len() - 1);
        }
    }

    fn advance_value(&mut self) -> Option<String> {
        let scan = scan_value(&self.buffer[self.raw_cursor..]);
        self.raw_cursor += scan.consumed;

        if !scan.text.is_empty() {
            self.delivered += scan.text.chars().count();
        }
        if scan.closed {
            self.state = ParserState::ValueClosed;
            tracing::debug!(
                raw_len = self.raw_cursor - self.value_start,
                chars = self.delivered,
                "response value closed"
            );
        }

        (!scan.text.is_empty()).then_some(scan.text)
    }

    fn parse_buffer(&mut self) -> Result<ParsedObject, TypeError> {
        self.parse_attempts += 1;
        ParsedObject::from_json(&self.buffer)
    }

    fn complete(&mut self, object: ParsedObject) -> DecoderEvent {
        tracing::debug!(
            bytes = self.buffer.len(),
            chunks = self.chunks,
            "response object complete"
        );
        self.terminate();
        DecoderEvent::Complete(object)
    }

    fn fail(&mut self, error: DecodeError) -> Vec<DecoderEvent> {
        tracing::warn!(error = %error, chunks = self.chunks, "response stream failed");
        self.terminate();
        vec![DecoderEvent::Error(error)]
    }

    fn terminate(&mut self) {
        self.finished = true;
        self.buffer = String::new();
    }
}

/// The outcome of decoding a stream to completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedStream {
    /// Every delta, in emission order.
    pub deltas: Vec<String>,
    /// The final object.
    pub object: ParsedObject,
}

impl DecodedStream {
    /// The concatenated deltas.
    #[must_use]
    pub fn streamed_text(&self) -> String {
        self.deltas.concat()
    }
}

/// Decode a sequence of chunks followed by end-of-stream.
///
/// # Errors
///
/// The terminal [`DecodeError`] if the stream fails.
pub fn decode_chunks<'a, I>(chunks: I, config: DecoderConfig) -> Result<DecodedStream, DecodeError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut decoder = StreamDecoder::with_config(config);
    let mut deltas = Vec::new();

    for chunk in chunks {
        for event in decoder.consume(chunk) {
            match event {
                DecoderEvent::Delta(text) => deltas.push(text),
                DecoderEvent::Complete(object) => return Ok(DecodedStream { deltas, object }),
                DecoderEvent::Error(err) => return Err(err),
            }
        }
    }

    for event in decoder.finish() {
        match event {
            DecoderEvent::Delta(text) => deltas.push(text),
            DecoderEvent::Complete(object) => return Ok(DecodedStream { deltas, object }),
            DecoderEvent::Error(err) => return Err(err),
        }
    }

    // `finish` always emits a terminal event on a live decoder.
    Err(DecodeError::UnterminatedValue { received: 0 })
}

/// Decode a complete body held in memory.
///
/// # Errors
///
/// The terminal [`DecodeError`] if the body is not a valid response.
pub fn decode_complete(body: &str, config: DecoderConfig) -> Result<DecodedStream, DecodeError> {
    decode_chunks(std::iter::once(body), config)
}
