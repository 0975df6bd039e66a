//! Functionality shared by `algorithms` and `rsa` tests.

use assert_matches::assert_matches;
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{seq::index::sample as sample_indexes, thread_rng};
use serde_json::json;

use jwt_verifier::{
    alg::{KeyKind, SigningAlgorithm, SigningKey, VerificationKey},
    prelude::*,
    ValidationError,
};

/// Current time used in tests.
pub const NOW: i64 = 1_598_954_400; // 2020-09-01T10:00:00Z

pub fn clock() -> DateTime<Utc> {
    Utc.timestamp_opt(NOW, 0).unwrap()
}

pub fn time_options() -> TimeOptions {
    TimeOptions::new(Duration::zero(), clock as fn() -> DateTime<Utc>)
}

pub fn options(key: &VerificationKey) -> ValidationOptions<'_> {
    ValidationOptions::with_time_options(SignatureRule::SingleKey(key), time_options())
}

pub fn create_payload() -> Fields {
    Fields::new()
        .with("sub", "1234567890")
        .with("name", "John Doe")
        .with("iat", NOW)
        .with("exp", NOW + Duration::days(7).num_seconds())
        .with("roles", json!(["admin", "user"]))
}

/// Checks token creation and validation for an algorithm, including failure cases
/// with mangled signature, header and payload.
pub fn test_algorithm(algorithm: SigningAlgorithm, signing_key: &SigningKey) {
    // Maximum number of signature bits mangled.
    const MAX_MANGLED_BITS: usize = 128;

    let verifying_key = signing_key.to_verification_key();
    assert_eq!(verifying_key.kind(), algorithm.key_kind());
    let payload = create_payload();

    // Successful case.
    let token_string = UnsignedToken::new(Fields::new().with("typ", "JWT"), payload.clone())
        .sign(algorithm, signing_key)
        .unwrap()
        .to_text()
        .unwrap();
    let token = Token::parse(&token_string).unwrap();
    assert_eq!(token.algorithm(), algorithm.name());
    assert_eq!(*token.payload(), payload);
    token.validate(&options(&verifying_key)).unwrap();

    // Mutate signature bits.
    let signature = token_string.rsplit('.').next().unwrap();
    let signature_start = token_string.rfind('.').unwrap() + 1;
    let signature = Base64UrlUnpadded::decode_vec(signature).unwrap();
    let signature_bits = signature.len() * 8;

    let mangled_bits: Box<dyn Iterator<Item = usize>> = if signature_bits <= MAX_MANGLED_BITS {
        Box::new(0..signature_bits)
    } else {
        let indexes = sample_indexes(&mut thread_rng(), signature_bits, MAX_MANGLED_BITS);
        Box::new(indexes.into_iter())
    };

    for i in mangled_bits {
        let mut mangled_signature = signature.clone();
        mangled_signature[i / 8] ^= 1 << (i % 8) as u8;
        let mangled_signature = Base64UrlUnpadded::encode_string(&mangled_signature);

        let mut mangled_str = token_string.clone();
        mangled_str.replace_range(signature_start.., &mangled_signature);
        let token = Token::parse(&mangled_str).unwrap();
        let err = token.validate(&options(&verifying_key)).unwrap_err();
        assert_matches!(err, ValidationError::InvalidSignature);
    }

    // Truncated signature.
    let mut mangled_signature = signature.clone();
    mangled_signature.pop();
    let mangled_signature = Base64UrlUnpadded::encode_string(&mangled_signature);
    let mut mangled_str = token_string.clone();
    mangled_str.replace_range(signature_start.., &mangled_signature);
    let token = Token::parse(&mangled_str).unwrap();
    let err = token.validate(&options(&verifying_key)).unwrap_err();
    assert_matches!(err, ValidationError::InvalidSignature);

    // Mutate header.
    let mangled_header = format!(r#"{{"typ":"JWT","alg":"{}"}}"#, algorithm.name());
    let mangled_header = Base64UrlUnpadded::encode_string(mangled_header.as_bytes());
    let header_end = token_string.find('.').unwrap();
    assert_ne!(mangled_header, &token_string[..header_end]);
    let mut mangled_str = token_string.clone();
    mangled_str.replace_range(..header_end, &mangled_header);
    let token = Token::parse(&mangled_str).unwrap();
    let err = token.validate(&options(&verifying_key)).unwrap_err();
    assert_matches!(err, ValidationError::InvalidSignature);

    // Mutate payload.
    let payload_string = create_payload().with("iat", NOW + 1).to_vec().unwrap();
    let payload_string = Base64UrlUnpadded::encode_string(&payload_string);
    assert_ne!(
        payload_string,
        token_string[(header_end + 1)..(signature_start - 1)]
    );
    let mut mangled_str = token_string.clone();
    mangled_str.replace_range((header_end + 1)..(signature_start - 1), &payload_string);
    let token = Token::parse(&mangled_str).unwrap();
    let err = token.validate(&options(&verifying_key)).unwrap_err();
    assert_matches!(err, ValidationError::InvalidSignature);

    // Key of another kind.
    let token = Token::parse(&token_string).unwrap();
    let other_key = if verifying_key.kind() == KeyKind::Symmetric {
        let key = ed25519_dalek::SigningKey::from_bytes(&[7; 32]);
        VerificationKey::from(key.verifying_key())
    } else {
        VerificationKey::symmetric(b"super_secret_key_donut_steel")
    };
    let err = token.validate(&options(&other_key)).unwrap_err();
    assert_matches!(err, ValidationError::InvalidSignature);

    // Key rotation.
    let keys = [other_key, verifying_key];
    let options =
        ValidationOptions::with_time_options(SignatureRule::KeyList(&keys), time_options());
    token.validate(&options).unwrap();
}
