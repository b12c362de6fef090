use crate::error::DecodeError;

/// Reassembles UTF-8 text from byte chunks that may split a code point.
///
/// Complete characters are released immediately; the bytes of a
/// character still being received (at most three) are held until the
/// next chunk.
#[derive(Debug, Default)]
pub(crate) struct Utf8Assembler {
    pending: Vec<u8>,
    /// Bytes released as text so far.
    offset: usize,
}

impl Utf8Assembler {
    /// Append bytes and return the text that is now complete.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Result<String, DecodeError> {
        self.pending.extend_from_slice(bytes);

        let valid = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(err) => {
                return Err(DecodeError::InvalidUtf8 {
                    offset: self.offset + err.valid_up_to(),
                });
            }
        };

        let rest = self.pending.split_off(valid);
        let complete = std::mem::replace(&mut self.pending, rest);
        self.offset += valid;
        String::from_utf8(complete).map_err(|err| DecodeError::InvalidUtf8 {
            offset: self.offset - valid + err.utf8_error().valid_up_to(),
        })
    }

    /// Check that no partial character is left over at end-of-stream.
    pub(crate) fn finish(&self) -> Result<(), DecodeError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::InvalidUtf8 {
                offset: self.offset,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_passes_straight_through() {
        let mut asm = Utf8Assembler::default();
        assert_eq!(asm.push(b"hola").unwrap(), "hola");
        assert!(asm.finish().is_ok());
    }

    #[test]
    fn split_code_point_is_held() {
        let text = "é🚀";
        let bytes = text.as_bytes();
        for split in 0..=bytes.len() {
            let mut asm = Utf8Assembler::default();
            let mut out = asm.push(&bytes[..split]).unwrap();
            out.push_str(&asm.push(&bytes[split..]).unwrap());
            assert_eq!(out, text, "split at {split}");
            assert!(asm.finish().is_ok());
        }
    }

    #[test]
    fn one_byte_at_a_time() {
        let text = "cómo estás?";
        let mut asm = Utf8Assembler::default();
        let mut out = String::new();
        for byte in text.as_bytes() {
            out.push_str(&asm.push(std::slice::from_ref(byte)).unwrap());
        }
        assert_eq!(out, text);
    }

    #[test]
    fn invalid_byte_reports_offset() {
        let mut asm = Utf8Assembler::default();
        asm.push(b"abc").unwrap();
        assert!(matches!(
            asm.push(&[b'd', 0xFF]),
            Err(DecodeError::InvalidUtf8 { offset: 4 })
        ));
    }

    #[test]
    fn truncated_character_at_end_is_an_error() {
        let mut asm = Utf8Assembler::default();
        assert_eq!(asm.push(&"ñ".as_bytes()[..1]).unwrap(), "");
        assert!(matches!(asm.finish(), Err(DecodeError::InvalidUtf8 { offset: 0 })));
    }
}
