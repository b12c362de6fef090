use tsp_types::TurnMetadata;
use tsp_wire::escape::escape_into;
use tsp_wire::layout::{self, NULL, OBJECT_CLOSE, OPENING, TRAILING_KEYS, VALUE_TERMINATOR};

use crate::error::EncodeError;

/// Producer-side state machine for the legacy response body.
///
/// The encoder never buffers the response itself. Each call appends the
/// bytes for one step to a caller-owned `String`, which the caller writes
/// and flushes to the sink before the next fragment arrives.
///
/// ```text
///   Fresh ──fragment/finish/abort──▶ InValue ──finish/abort──▶ Finished
///
///   Fresh     nothing written yet
///   InValue   `{"response": "` plus escaped fragments
///   Finished  closing quote, trailing fields, and `}` written
/// ```
///
/// Between any two calls the bytes written so far are a valid prefix of
/// the final object: either nothing, or the opening followed by escaped
/// text with no dangling escape.
///
/// # Example
///
/// ```rust
/// use tsp_encoder::ResponseEncoder;
/// use tsp_types::TurnMetadata;
///
/// let mut enc = ResponseEncoder::new();
/// let mut out = String::new();
/// enc.fragment("Hola", &mut out).unwrap();
/// enc.finish(&TurnMetadata::new().with_word("hola"), &mut out).unwrap();
/// assert_eq!(
///     out,
///     r#"{"response": "Hola", "currentCategory": null, "currentWord": "hola", "currentWordProgress": null, "exercises": null}"#
/// );
/// ```
#[derive(Debug, Default)]
pub struct ResponseEncoder {
    state: EncoderState,
    bytes_written: usize,
    fragments: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum EncoderState {
    #[default]
    Fresh,
    InValue,
    Finished,
}

impl ResponseEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one escaped fragment, opening the object first if needed.
    ///
    /// # Errors
    ///
    /// [`EncodeError::AlreadyFinished`] once the object has been closed.
    pub fn fragment(&mut self, text: &str, out: &mut String) -> Result<(), EncodeError> {
        let start = out.len();
        self.ensure_open(out)?;
        escape_into(text, out);
        self.fragments += 1;
        self.bytes_written += out.len() - start;
        Ok(())
    }

    /// Close the value and write the trailing fields from `metadata`.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::AlreadyFinished`] once the object has been closed.
    /// - [`EncodeError::Type`] if an exercise set fails to serialize.
    pub fn finish(&mut self, metadata: &TurnMetadata, out: &mut String) -> Result<(), EncodeError> {
        let values = [
            serde_json::to_string(&metadata.current_category)?,
            serde_json::to_string(&metadata.current_word)?,
            serde_json::to_string(&metadata.current_word_progress)?,
            serde_json::to_string(&metadata.exercises)?,
        ];
        self.close_with(&values.each_ref().map(String::as_str), out)
    }

    /// Best-effort termination after an upstream failure: close the value
    /// and write every trailing field as `null`.
    ///
    /// # Errors
    ///
    /// [`EncodeError::AlreadyFinished`] once the object has been closed.
    pub fn abort(&mut self, out: &mut String) -> Result<(), EncodeError> {
        self.close_with(&[NULL; 4], out)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == EncoderState::Finished
    }

    /// Total bytes produced so far.
    #[must_use]
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Number of fragments appended so far.
    #[must_use]
    pub fn fragments(&self) -> usize {
        self.fragments
    }

    fn ensure_open(&mut self, out: &mut String) -> Result<(), EncodeError> {
        match self.state {
            EncoderState::Fresh => {
                out.push_str(OPENING);
                self.state = EncoderState::InValue;
                Ok(())
            }
            EncoderState::InValue => Ok(()),
            EncoderState::Finished => Err(EncodeError::AlreadyFinished),
        }
    }

    fn close_with(&mut self, values: &[&str; 4], out: &mut String) -> Result<(), EncodeError> {
        let start = out.len();
        self.ensure_open(out)?;
        out.push(VALUE_TERMINATOR);
        for (key, value) in TRAILING_KEYS.iter().zip(values) {
            layout::push_trailing_field(out, key, value);
        }
        out.push(OBJECT_CLOSE);
        self.state = EncoderState::Finished;
        self.bytes_written += out.len() - start;
        Ok(())
    }
}

/// Encode a complete list of fragments in one call.
///
/// # Errors
///
/// [`EncodeError::Type`] if an exercise set fails to serialize.
pub fn encode_to_string<S: AsRef<str>>(
    fragments: &[S],
    metadata: &TurnMetadata,
) -> Result<String, EncodeError> {
    let mut encoder = ResponseEncoder::new();
    let mut out = String::new();
    for fragment in fragments {
        encoder.fragment(fragment.as_ref(), &mut out)?;
    }
    encoder.finish(metadata, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsp_types::{Exercise, ExerciseSet, ParsedObject};

    #[test]
    fn empty_stream_is_still_a_complete_object() {
        let body = encode_to_string::<&str>(&[], &TurnMetadata::new()).unwrap();
        assert_eq!(
            body,
            r#"{"response": "", "currentCategory": null, "currentWord": null, "currentWordProgress": null, "exercises": null}"#
        );
    }

    #[test]
    fn first_fragment_writes_opening() {
        let mut enc = ResponseEncoder::new();
        let mut out = String::new();
        enc.fragment("Hel", &mut out).unwrap();
        assert_eq!(out, "{\"response\": \"Hel");
        out.clear();
        enc.fragment("lo", &mut out).unwrap();
        assert_eq!(out, "lo");
        assert_eq!(enc.fragments(), 2);
        assert_eq!(enc.bytes_written(), "{\"response\": \"Hello".len());
    }

    #[test]
    fn fragments_are_escaped() {
        let body = encode_to_string(&["line \"one\"\n", "C:\\tmp"], &TurnMetadata::new()).unwrap();
        assert!(body.starts_with(r#"{"response": "line \"one\"\nC:\\tmp", "#));
        let parsed = ParsedObject::from_json(&body).unwrap();
        assert_eq!(parsed.response, "line \"one\"\nC:\\tmp");
    }

    #[test]
    fn metadata_values_are_json_encoded() {
        let exercises = ExerciseSet {
            basic: Exercise {
                unscrambled: "yo como".into(),
                scrambled: "como yo".into(),
            },
            intermediate: Exercise {
                unscrambled: "yo como pan".into(),
                scrambled: "pan como yo".into(),
            },
            advanced: Exercise {
                unscrambled: "yo como pan \"fresco\"".into(),
                scrambled: "\"fresco\" pan como yo".into(),
            },
            count: 3,
        };
        let meta = TurnMetadata::new()
            .with_category("comida")
            .with_word("pan")
            .with_word_progress("pronunciation")
            .with_exercises(exercises);
        let body = encode_to_string(&["¡Muy bien!"], &meta).unwrap();
        let parsed = ParsedObject::from_json(&body).unwrap();
        assert_eq!(parsed, ParsedObject::new("¡Muy bien!", meta));
    }

    #[test]
    fn abort_writes_null_placeholders() {
        let mut enc = ResponseEncoder::new();
        let mut out = String::new();
        enc.fragment("partial", &mut out).unwrap();
        enc.abort(&mut out).unwrap();
        assert_eq!(
            out,
            r#"{"response": "partial", "currentCategory": null, "currentWord": null, "currentWordProgress": null, "exercises": null}"#
        );
        assert!(enc.is_finished());
    }

    #[test]
    fn writes_after_finish_are_rejected() {
        let mut enc = ResponseEncoder::new();
        let mut out = String::new();
        enc.finish(&TurnMetadata::new(), &mut out).unwrap();
        assert!(matches!(
            enc.fragment("late", &mut out),
            Err(EncodeError::AlreadyFinished)
        ));
        assert!(matches!(enc.abort(&mut out), Err(EncodeError::AlreadyFinished)));
    }
}
