//! Producer and consumer running concurrently over an in-memory pipe.
//!
//! The encoder writes into one end of a `tokio::io::duplex`, the streaming
//! decoder reads the other end. The pipe is kept small so the producer
//! blocks on backpressure and the decoder sees realistic partial reads.

use std::convert::Infallible;
use std::time::Duration;

use futures::{StreamExt, stream};
use tokio::io::duplex;
use tsp_decoder::{
    DecodeError, DecoderConfig, DecoderEvent, ErrorKind, EventSink, StreamDecoder,
    StreamingDecoder,
};
use tsp_encoder::{EncodeError, ResponseEncoder, encode_stream};
use tsp_tests::{long_reply, sample_exercises};
use tsp_types::{ParsedObject, TurnMetadata};

#[derive(Default)]
struct Collected {
    deltas: Vec<String>,
    object: Option<ParsedObject>,
    error: Option<DecodeError>,
}

impl EventSink for Collected {
    fn on_delta(&mut self, text: &str) {
        self.deltas.push(text.to_owned());
    }

    fn on_complete(&mut self, object: ParsedObject) {
        self.object = Some(object);
    }

    fn on_error(&mut self, error: DecodeError) {
        self.error = Some(error);
    }
}

async fn pipe<S, E>(
    source: S,
    metadata: TurnMetadata,
    config: DecoderConfig,
) -> (Result<usize, EncodeError>, Collected)
where
    S: futures::Stream<Item = Result<String, E>>,
    E: std::fmt::Display,
{
    let (mut writer, reader) = duplex(64);
    let producer = async move {
        let result = encode_stream(source, &metadata, &mut writer).await;
        drop(writer);
        result
    };
    let consumer = async move {
        let mut collected = Collected::default();
        StreamingDecoder::with_config(reader, config)
            .drive(&mut collected)
            .await;
        collected
    };
    tokio::join!(producer, consumer)
}

#[tokio::test]
async fn tutor_turn_streams_end_to_end() {
    let metadata = TurnMetadata::new()
        .with_category("food")
        .with_word("manzana")
        .with_word_progress("writing")
        .with_exercises(sample_exercises());
    let fragments = vec![
        "¡Excelente! ".to_owned(),
        "\"Manzana\" means apple.\n".to_owned(),
        "Now write it: ".to_owned(),
    ];
    let expected = fragments.concat();

    let source = stream::iter(fragments.into_iter().map(Ok::<_, Infallible>));
    let (written, collected) = pipe(
        source,
        metadata.clone(),
        DecoderConfig::default().with_read_chunk_size(7),
    )
    .await;

    assert!(written.unwrap() > expected.len());
    assert!(collected.error.is_none());
    assert_eq!(collected.deltas.concat(), expected);
    let object = collected.object.unwrap();
    assert_eq!(object.response, expected);
    assert_eq!(object.metadata(), metadata);
}

#[tokio::test]
async fn slow_producer_is_delivered_fragment_by_fragment() {
    let source = stream::iter(["Uno. ", "Dos. ", "Tres."])
        .then(|fragment| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<_, Infallible>(fragment.to_owned())
        });
    let (written, collected) = pipe(source, TurnMetadata::new(), DecoderConfig::default()).await;

    written.unwrap();
    // With a pause between writes, each fragment lands in its own read.
    assert_eq!(collected.deltas, ["Uno. ", "Dos. ", "Tres."]);
    assert!(collected.object.is_some());
}

const GREETING: [&str; 3] = ["Hel", "lo, ", "cómo estás?"];

fn greeting_metadata() -> TurnMetadata {
    TurnMetadata::new()
        .with_word("hola")
        .with_word_progress("pronunciation")
}

fn assert_greeting_object(object: &ParsedObject) {
    assert_eq!(object.response, "Hello, cómo estás?");
    assert_eq!(object.current_word.as_deref(), Some("hola"));
    assert_eq!(object.current_word_progress.as_deref(), Some("pronunciation"));
    assert_eq!(object.current_category, None);
    assert_eq!(object.exercises, None);
}

#[test]
fn greeting_turn_delivers_each_fragment_then_the_object() {
    let mut encoder = ResponseEncoder::new();
    let mut decoder = StreamDecoder::new();
    let mut events = Vec::new();

    let mut out = String::new();
    for fragment in GREETING {
        out.clear();
        encoder.fragment(fragment, &mut out).unwrap();
        events.extend(decoder.consume(&out));
    }
    out.clear();
    encoder.finish(&greeting_metadata(), &mut out).unwrap();
    events.extend(decoder.consume(&out));
    events.extend(decoder.finish());

    match &events[..] {
        [
            DecoderEvent::Delta(a),
            DecoderEvent::Delta(b),
            DecoderEvent::Delta(c),
            DecoderEvent::Complete(object),
        ] => {
            assert_eq!([a.as_str(), b.as_str(), c.as_str()], GREETING);
            assert_greeting_object(object);
        }
        other => panic!("expected three deltas then Complete, got {other:?}"),
    }
}

#[tokio::test]
async fn greeting_turn_over_a_paced_pipe() {
    let source = stream::iter(GREETING).then(|fragment| async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok::<_, Infallible>(fragment.to_owned())
    });
    let (written, collected) = pipe(source, greeting_metadata(), DecoderConfig::default()).await;

    written.unwrap();
    assert!(collected.error.is_none());
    assert_eq!(collected.deltas, GREETING);
    assert_greeting_object(&collected.object.unwrap());
}

#[tokio::test]
async fn long_reply_through_a_small_pipe() {
    let fragments = long_reply(2_000);
    let expected = fragments.concat();
    let source = stream::iter(fragments.into_iter().map(Ok::<_, Infallible>));
    let (written, collected) = pipe(
        source,
        TurnMetadata::new().with_word("casa"),
        DecoderConfig::default().with_read_chunk_size(13),
    )
    .await;

    written.unwrap();
    assert_eq!(collected.deltas.concat(), expected);
    assert_eq!(collected.object.unwrap().current_word.as_deref(), Some("casa"));
}

#[tokio::test]
async fn upstream_failure_still_closes_the_object() {
    let source = stream::iter(vec![Ok("Lo siento, ".to_owned()), Err("quota exceeded")]);
    let (written, collected) = pipe(
        source,
        TurnMetadata::new().with_word("casa"),
        DecoderConfig::default(),
    )
    .await;

    assert!(matches!(written, Err(EncodeError::Upstream(ref m)) if m == "quota exceeded"));
    // The legacy body has no error slot: the consumer sees a complete
    // object with the partial text and no metadata.
    let object = collected.object.unwrap();
    assert_eq!(object.response, "Lo siento, ");
    assert!(object.metadata().is_empty());
}

#[tokio::test]
async fn ceiling_stops_a_runaway_stream() {
    let fragments = long_reply(5_000);
    let source = stream::iter(fragments.into_iter().map(Ok::<_, Infallible>));
    let (_, collected) = pipe(
        source,
        TurnMetadata::new(),
        DecoderConfig::default().with_max_len(4_096),
    )
    .await;

    assert!(collected.object.is_none());
    assert_eq!(
        collected.error.map(|e| e.kind()),
        Some(ErrorKind::ExceededMaxLength)
    );
}

#[tokio::test]
async fn concurrent_streams_do_not_interfere() {
    let tasks: Vec<_> = (0..8)
        .map(|i| {
            tokio::spawn(async move {
                let fragments: Vec<String> = (0..50).map(|n| format!("s{i}-f{n} ")).collect();
                let expected = fragments.concat();
                let source = stream::iter(fragments.into_iter().map(Ok::<_, Infallible>));
                let metadata = TurnMetadata::new().with_word(format!("word-{i}"));
                let (written, collected) = pipe(source, metadata, DecoderConfig::default()).await;
                written.unwrap();
                (i, expected, collected)
            })
        })
        .collect();

    for task in tasks {
        let (i, expected, collected) = task.await.unwrap();
        assert_eq!(collected.deltas.concat(), expected);
        let word = collected.object.unwrap().current_word;
        assert_eq!(word, Some(format!("word-{i}")));
    }
}

#[tokio::test]
async fn missing_body_is_reported_up_front() {
    let result = StreamingDecoder::<tokio::io::DuplexStream>::from_body(None, DecoderConfig::default());
    assert!(matches!(result, Err(DecodeError::TransportMissing)));
}

#[tokio::test]
async fn next_returns_none_after_the_terminal_event() {
    let body: &[u8] = br#"{"response": "hi", "currentCategory": null, "currentWord": null, "currentWordProgress": null, "exercises": null}"#;
    let mut decoder = StreamingDecoder::new(body);

    let mut events = Vec::new();
    while let Some(event) = decoder.next().await {
        events.push(event);
    }
    assert!(matches!(&events[0], DecoderEvent::Delta(t) if t == "hi"));
    assert!(matches!(events[1], DecoderEvent::Complete(_)));
    assert!(decoder.next().await.is_none());
    assert!(decoder.decoder().is_finished());
}
