use crate::error::WireError;

/// Maximum number of bytes a u64 varint can occupy.
/// ceil(64 / 7) = 10 bytes.
pub const MAX_VARINT_BYTES: usize = 10;

/// Append `value` as an unsigned LEB128 varint.
///
/// | Value   | Encoded bytes        |
/// |---------|----------------------|
/// | 0       | `[0x00]`             |
/// | 127     | `[0x7F]`             |
/// | 128     | `[0x80, 0x01]`       |
/// | 300     | `[0xAC, 0x02]`       |
/// | 16384   | `[0x80, 0x80, 0x01]` |
pub fn put_varint(mut value: u64, out: &mut Vec<u8>) -> usize {
    let start = out.len();
    loop {
        #[allow(clippy::cast_possible_truncation)]
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
    out.len() - start
}

/// Read a varint from the front of `buf` that may still be arriving.
///
/// Returns `Ok(None)` when `buf` ends before the terminating byte, so a
/// streaming reader can wait for more input instead of failing.
///
/// # Errors
///
/// [`WireError::VarintTooLong`] if ten bytes pass without a terminator.
pub fn take_varint(buf: &[u8]) -> Result<Option<(u64, usize)>, WireError> {
    let mut value: u64 = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if i >= MAX_VARINT_BYTES {
            return Err(WireError::VarintTooLong);
        }
        value |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(Some((value, i + 1)));
        }
    }

    if buf.len() >= MAX_VARINT_BYTES {
        return Err(WireError::VarintTooLong);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        put_varint(value, &mut out);
        out
    }

    #[test]
    fn known_encodings() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(127), vec![0x7F]);
        assert_eq!(encode(128), vec![0x80, 0x01]);
        assert_eq!(encode(300), vec![0xAC, 0x02]);
        assert_eq!(encode(16384), vec![0x80, 0x80, 0x01]);
        assert_eq!(encode(u64::MAX).len(), MAX_VARINT_BYTES);
    }

    #[test]
    fn take_leaves_trailing_bytes() {
        let buf = [0xAC, 0x02, 0xFF];
        assert_eq!(take_varint(&buf).unwrap(), Some((300, 2)));
    }

    #[test]
    fn take_waits_for_more_input() {
        assert_eq!(take_varint(&[]).unwrap(), None);
        assert_eq!(take_varint(&[0x80]).unwrap(), None);
        assert_eq!(take_varint(&[0x80, 0x80]).unwrap(), None);
    }

    #[test]
    fn take_rejects_overlong() {
        assert!(matches!(
            take_varint(&[0x80; 11]),
            Err(WireError::VarintTooLong)
        ));
        assert!(matches!(
            take_varint(&[0x80; 10]),
            Err(WireError::VarintTooLong)
        ));
    }

    #[test]
    fn max_value_survives() {
        let bytes = encode(u64::MAX);
        assert_eq!(take_varint(&bytes).unwrap(), Some((u64::MAX, 10)));
    }
}
