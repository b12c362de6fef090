#![warn(clippy::pedantic)]

pub mod config;
pub mod decoder;
pub mod error;
pub mod event;
pub mod framed;
pub mod streaming;

mod utf8;

pub use config::DecoderConfig;
pub use decoder::{DecodedStream, ParserState, StreamDecoder, decode_chunks, decode_complete};
pub use error::{DecodeError, ErrorKind};
pub use event::{DecoderEvent, EventSink};
pub use framed::FrameDecoder;
pub use streaming::StreamingDecoder;
