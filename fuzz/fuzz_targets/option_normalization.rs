#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use unicrypt_core::CryptoError;
use unicrypt_core::options::{
    CryptDirection, CryptOptions, DeriveOptions, DigestOptions, normalize_crypt,
    normalize_derive, normalize_digest,
};

#[derive(Arbitrary, Debug)]
struct OptionInput {
    hash: Option<String>,
    algorithm: Option<String>,
    iterations: Option<i64>,
    bits: Option<i64>,
    cypher: Option<String>,
    mode: Option<String>,
    tag_length: Option<i64>,
    json: String,
}

fn assert_validation_error(err: &CryptoError) {
    assert!(
        matches!(
            err,
            CryptoError::InvalidOption { .. } | CryptoError::NotImplemented(_)
        ),
        "normalization produced a non-validation error: {:?}",
        err
    );
}

fuzz_target!(|input: OptionInput| {
    // Attack: arbitrary option strings and integers, arbitrary JSON option records
    // Validates: no panics, only validation errors, accepted values are in range

    if let Err(e) = normalize_digest(&DigestOptions { hash: input.hash.clone() }) {
        assert_validation_error(&e);
    }

    let derive = DeriveOptions {
        algorithm: input.algorithm,
        hash: input.hash,
        iterations: input.iterations,
        bits: input.bits,
    };
    match normalize_derive(&derive) {
        Ok(params) => {
            assert!(params.bits > 0 && params.bits % 8 == 0);
            assert_eq!(params.output_len() * 8, params.bits as usize);
        }
        Err(e) => assert_validation_error(&e),
    }

    let crypt = CryptOptions {
        cypher: input.cypher,
        mode: input.mode,
        additional_data: None,
        tag_length: input.tag_length,
    };
    match normalize_crypt(&crypt, CryptDirection::Decrypt) {
        Ok(params) => assert!(params.tag_length > 0),
        Err(e) => assert_validation_error(&e),
    }

    // Option records loaded from configuration must never panic either
    if let Ok(options) = serde_json::from_str::<CryptOptions>(&input.json) {
        if let Err(e) = normalize_crypt(&options, CryptDirection::Encrypt) {
            assert_validation_error(&e);
        }
    }
});
