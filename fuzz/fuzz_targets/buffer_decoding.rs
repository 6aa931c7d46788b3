#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use unicrypt_core::buffer::{
    BackendFormat, BackendNative, WordArray, from_backend_format, from_hex, to_backend_format,
    to_hex,
};

#[derive(Arbitrary, Debug)]
struct DecodingInput {
    hex: String,
    words: Vec<u32>,
    bit_length: usize,
    bytes: Vec<u8>,
}

fuzz_target!(|input: DecodingInput| {
    // Attack: malformed hex, word arrays whose bit length disagrees with their words
    // Validates: no panics, decoders reject rather than pad or truncate

    // Property 1: hex decoding either fails or re-encodes to the lowercase input
    if let Ok(buffer) = from_hex(&input.hex) {
        assert_eq!(to_hex(&buffer), input.hex.to_ascii_lowercase());
    }

    // Property 2: a word array never yields more bytes than it declares
    if let Ok(words) = WordArray::new(input.words.clone(), input.bit_length) {
        let out = from_backend_format(BackendNative::Words(words))
            .expect("validated word arrays always convert");
        assert_eq!(out.len(), input.bit_length / 8);
    }

    // Property 3: every format round-trips arbitrary bytes
    let buffer = unicrypt_core::ByteBuffer::new(input.bytes);
    for format in [BackendFormat::Bytes, BackendFormat::Words, BackendFormat::Hex] {
        let native = to_backend_format(&buffer, format);
        assert_eq!(from_backend_format(native).expect("round-trip"), buffer);
    }
});
