//! Property-Based Tests with proptest
//!
//! Deterministic property-based testing with reproducible shrinking. Each
//! property runs 100 cases by default (override with PROPTEST_CASES).
//!
//! **Test Organization**:
//! - `buffer_properties`: adapter and hex round-trips
//! - `operation_properties`: output lengths of random, digest and derive
//! - `cipher_properties`: encrypt/decrypt inverse and tamper detection

mod common;

use common::block_on;
use proptest::prelude::*;
use unicrypt_core::buffer::{BackendFormat, from_backend_format, to_backend_format};
use unicrypt_core::{
    ByteBuffer, CryptOptions, CryptoError, DeriveOptions, DigestOptions, Hash, from_hex, to_hex,
};

const TAG_LENGTHS: [u32; 7] = [32, 64, 96, 104, 112, 120, 128];

fn any_format() -> impl Strategy<Value = BackendFormat> {
    prop_oneof![
        Just(BackendFormat::Bytes),
        Just(BackendFormat::Words),
        Just(BackendFormat::Hex),
    ]
}

fn any_hash() -> impl Strategy<Value = Hash> {
    prop::sample::select(Hash::ALL.to_vec())
}

/// Buffer Adapter Property Tests
mod buffer_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: converting to any backend format and back is lossless
        #[test]
        fn prop_adapter_roundtrip(
            data in prop::collection::vec(any::<u8>(), 0..256),
            format in any_format(),
        ) {
            let buffer = ByteBuffer::new(data);
            let native = to_backend_format(&buffer, format);
            prop_assert_eq!(native.format(), format);
            prop_assert_eq!(from_backend_format(native).unwrap(), buffer);
        }

        /// Property: hex encoding is lowercase, two characters per byte, and reversible
        #[test]
        fn prop_hex_roundtrip(data in prop::collection::vec(any::<u8>(), 0..256)) {
            let hex = to_hex(&data);
            prop_assert_eq!(hex.len(), data.len() * 2);
            prop_assert!(!hex.chars().any(|c| c.is_ascii_uppercase()));
            prop_assert_eq!(from_hex(&hex).unwrap().into_vec(), data);
        }
    }
}

/// Output Length Property Tests
mod operation_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: random_bytes(n) yields exactly n bytes on either backend
        #[test]
        fn prop_random_length_exact(len in 1usize..2048, software in any::<bool>()) {
            let out = block_on(async {
                if software {
                    common::software_provider().random_bytes(len).await
                } else {
                    unicrypt_core::random_bytes(len).await
                }
            })
            .unwrap();
            prop_assert_eq!(out.len(), len);
        }

        /// Property: digest length depends only on the hash function
        #[test]
        fn prop_digest_length(
            data in prop::collection::vec(any::<u8>(), 0..512),
            hash in any_hash(),
        ) {
            let options = DigestOptions::new().with_hash(hash);
            let out = block_on(unicrypt_core::digest(data, options)).unwrap();
            prop_assert_eq!(out.len(), hash.output_len());
        }

        /// Property: derive always yields bits / 8 bytes
        #[test]
        fn prop_derive_length(
            password in prop::collection::vec(any::<u8>(), 0..32),
            salt in prop::collection::vec(any::<u8>(), 0..32),
            bytes in 1u32..=64,
            iterations in 1u32..=4,
        ) {
            let options = DeriveOptions::new().with_bits(bytes * 8).with_iterations(iterations);
            let out = block_on(unicrypt_core::derive(password, salt, options)).unwrap();
            prop_assert_eq!(out.len(), bytes as usize);
        }
    }
}

/// AES-GCM Property Tests
mod cipher_properties {
    use super::*;

    fn any_key() -> impl Strategy<Value = Vec<u8>> {
        prop_oneof![
            prop::collection::vec(any::<u8>(), 16),
            prop::collection::vec(any::<u8>(), 24),
            prop::collection::vec(any::<u8>(), 32),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: decrypt(encrypt(x)) == x for every supported shape
        #[test]
        fn prop_encrypt_decrypt_inverse(
            key in any_key(),
            iv in prop::collection::vec(any::<u8>(), 1..=16),
            plaintext in prop::collection::vec(any::<u8>(), 0..1024),
            aad in prop::collection::vec(any::<u8>(), 0..64),
            tag_length in prop::sample::select(TAG_LENGTHS.to_vec()),
        ) {
            let options = CryptOptions::new()
                .with_additional_data(aad)
                .with_tag_length(tag_length);

            let opened = block_on(async {
                let sealed = unicrypt_core::encrypt(
                    key.clone(),
                    iv.clone(),
                    plaintext.clone(),
                    options.clone(),
                )
                .await?;
                assert_eq!(sealed.len(), plaintext.len() + (tag_length / 8) as usize);
                unicrypt_core::decrypt(key.clone(), iv.clone(), sealed, options.clone()).await
            })
            .unwrap();

            prop_assert_eq!(opened.into_vec(), plaintext);
        }

        /// Property: flipping any single bit of the tag fails authentication
        #[test]
        fn prop_tag_bit_flip_detected(
            key in any_key(),
            iv in prop::collection::vec(any::<u8>(), 1..=16),
            plaintext in prop::collection::vec(any::<u8>(), 0..256),
            tag_length in prop::sample::select(TAG_LENGTHS.to_vec()),
            bit in any::<prop::sample::Index>(),
        ) {
            let options = CryptOptions::new().with_tag_length(tag_length);

            let result = block_on(async {
                let mut sealed = unicrypt_core::encrypt(
                    key.clone(),
                    iv.clone(),
                    plaintext.clone(),
                    options.clone(),
                )
                .await?
                .into_vec();
                let tag_bits = tag_length as usize;
                let flip = bit.index(tag_bits);
                let offset = plaintext.len() * 8 + flip;
                sealed[offset / 8] ^= 1 << (offset % 8);
                unicrypt_core::decrypt(key.clone(), iv.clone(), sealed, options.clone()).await
            });

            prop_assert_eq!(result, Err(CryptoError::AuthenticationFailed));
        }

        /// Property: flipping any bit of the ciphertext body fails authentication
        #[test]
        fn prop_body_bit_flip_detected(
            plaintext in prop::collection::vec(any::<u8>(), 1..256),
            bit in any::<prop::sample::Index>(),
        ) {
            let key = [0x42u8; 32];
            let iv = [0x24u8; 12];

            let result = block_on(async {
                let mut sealed =
                    unicrypt_core::encrypt(key, iv, plaintext.clone(), CryptOptions::new())
                        .await?
                        .into_vec();
                let offset = bit.index(plaintext.len() * 8);
                sealed[offset / 8] ^= 1 << (offset % 8);
                unicrypt_core::decrypt(key, iv, sealed, CryptOptions::new()).await
            });

            prop_assert_eq!(result, Err(CryptoError::AuthenticationFailed));
        }
    }
}
