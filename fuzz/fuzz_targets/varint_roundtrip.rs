#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: varint encode->decode roundtrip.
//
// Takes 8 bytes of fuzz input, interprets as a u64, encodes it as a
// LEB128 varint, then decodes it and asserts the value matches. Every
// strict prefix of the encoding must read as incomplete.
fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let value = u64::from_le_bytes(data[..8].try_into().unwrap());

    let mut buf = Vec::new();
    let encoded_len = tsp_wire::varint::put_varint(value, &mut buf);

    let (decoded, decoded_len) = tsp_wire::varint::take_varint(&buf).unwrap().unwrap();
    assert_eq!(decoded, value);
    assert_eq!(decoded_len, encoded_len);

    for end in 0..encoded_len {
        assert!(tsp_wire::varint::take_varint(&buf[..end]).unwrap().is_none());
    }
});
