use tsp_types::ParsedObject;

use crate::error::DecodeError;

/// Events emitted while decoding one response stream.
///
/// A stream yields zero or more `Delta`s followed by exactly one terminal
/// event, either `Complete` or `Error`. Nothing follows a terminal event.
///
/// ```text
///   Delta("Hel")
///   Delta("lo, ")
///   Delta("cómo estás?")
///   Complete(ParsedObject { response: "Hello, cómo estás?", .. })
/// ```
#[derive(Debug)]
pub enum DecoderEvent {
    /// Newly available text of the `response` value, unescaped.
    Delta(String),

    /// The whole object arrived and parsed.
    Complete(ParsedObject),

    /// The stream failed.
    Error(DecodeError),
}

impl DecoderEvent {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Delta(_))
    }

    /// Hand this event to the matching sink callback.
    pub fn dispatch<S: EventSink + ?Sized>(self, sink: &mut S) {
        match self {
            Self::Delta(text) => sink.on_delta(&text),
            Self::Complete(object) => sink.on_complete(object),
            Self::Error(error) => sink.on_error(error),
        }
    }
}

/// Callback-style consumer of decoder events.
///
/// The UI layer implements this to append deltas to the message being
/// displayed and to replace it with structured data on completion.
pub trait EventSink {
    fn on_delta(&mut self, text: &str);
    fn on_complete(&mut self, object: ParsedObject);
    fn on_error(&mut self, error: DecodeError);
}
