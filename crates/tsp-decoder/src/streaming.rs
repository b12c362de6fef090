use std::collections::VecDeque;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::DecoderConfig;
use crate::decoder::StreamDecoder;
use crate::error::DecodeError;
use crate::event::{DecoderEvent, EventSink};
use crate::utf8::Utf8Assembler;

/// Asynchronous decoder over a transport byte stream.
///
/// Reads the response body in `read_chunk_size` pieces from any
/// `AsyncRead` (an HTTP body, a socket, a duplex pipe), reassembles UTF-8
/// across reads, and yields the [`StreamDecoder`]'s events one at a time.
///
/// Backpressure is inherited from the reader: the next read only happens
/// when the caller awaits the next event and no events are queued.
/// Cancelling is dropping: the buffer goes with it and no terminal event
/// is produced.
///
/// ```text
///   AsyncRead ──bytes──▶ Utf8Assembler ──text──▶ StreamDecoder ──events──▶ next()
///                        (holds split                                    │
///                         code points)                                   ▼
///                                                              Delta* (Complete|Error)
/// ```
///
/// # Example
///
/// ```rust,no_run
/// use tsp_decoder::{DecoderEvent, StreamingDecoder};
/// use tokio::io::AsyncRead;
///
/// async fn show(body: impl AsyncRead + Unpin) {
///     let mut stream = StreamingDecoder::new(body);
///     while let Some(event) = stream.next().await {
///         match event {
///             DecoderEvent::Delta(text) => print!("{text}"),
///             DecoderEvent::Complete(obj) => println!("\n{obj:?}"),
///             DecoderEvent::Error(err) => eprintln!("\nerror: {err}"),
///         }
///     }
/// }
/// ```
pub struct StreamingDecoder<R> {
    reader: R,
    decoder: StreamDecoder,
    utf8: Utf8Assembler,
    queued: VecDeque<DecoderEvent>,
    read_buf: Vec<u8>,
    state: StreamState,
}

/// ```text
///   Reading ──terminal event queued──▶ Draining ──queue empty──▶ Done
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StreamState {
    Reading,
    Draining,
    Done,
}

impl<R: AsyncRead + Unpin> StreamingDecoder<R> {
    /// Create a decoder with default settings.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, DecoderConfig::default())
    }

    #[must_use]
    pub fn with_config(reader: R, config: DecoderConfig) -> Self {
        Self {
            reader,
            decoder: StreamDecoder::with_config(config),
            utf8: Utf8Assembler::default(),
            queued: VecDeque::new(),
            read_buf: vec![0; config.read_chunk_size.max(1)],
            state: StreamState::Reading,
        }
    }

    /// Begin decoding a response whose body may be absent.
    ///
    /// # Errors
    ///
    /// [`DecodeError::TransportMissing`] if `body` is `None`.
    pub fn from_body(body: Option<R>, config: DecoderConfig) -> Result<Self, DecodeError> {
        match body {
            Some(reader) => Ok(Self::with_config(reader, config)),
            None => {
                tracing::warn!("response has no body to decode");
                Err(DecodeError::TransportMissing)
            }
        }
    }

    /// Next event, or `None` once the terminal event has been returned.
    pub async fn next(&mut self) -> Option<DecoderEvent> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                return Some(event);
            }
            match self.state {
                StreamState::Reading => self.read_chunk().await,
                StreamState::Draining => {
                    self.state = StreamState::Done;
                    return None;
                }
                StreamState::Done => return None,
            }
        }
    }

    /// Pump every remaining event into `sink`.
    pub async fn drive<S: EventSink + ?Sized>(&mut self, sink: &mut S) {
        while let Some(event) = self.next().await {
            event.dispatch(sink);
        }
    }

    /// The underlying state machine, for inspection.
    #[must_use]
    pub fn decoder(&self) -> &StreamDecoder {
        &self.decoder
    }

    /// Perform one read and queue whatever events it produces.
    async fn read_chunk(&mut self) {
        let n = match self.reader.read(&mut self.read_buf).await {
            Ok(n) => n,
            Err(err) => {
                self.fail(DecodeError::Io(err));
                return;
            }
        };

        if n == 0 {
            if let Err(err) = self.utf8.finish() {
                self.fail(err);
                return;
            }
            self.queued.extend(self.decoder.finish());
            self.state = StreamState::Draining;
            return;
        }

        match self.utf8.push(&self.read_buf[..n]) {
            Ok(text) => {
                self.queued.extend(self.decoder.consume(&text));
                if self.decoder.is_finished() {
                    self.state = StreamState::Draining;
                }
            }
            Err(err) => self.fail(err),
        }
    }

    /// Terminate on a failure below the decoder.
    fn fail(&mut self, error: DecodeError) {
        tracing::warn!(error = %error, "transport failed");
        self.decoder.abandon();
        self.queued.push_back(DecoderEvent::Error(error));
        self.state = StreamState::Draining;
    }
}
