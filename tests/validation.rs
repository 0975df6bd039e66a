//! End-to-end tests for token validation.

use assert_matches::assert_matches;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use std::{sync::Mutex, thread};

use jwt_verifier::{
    alg::{SigningAlgorithm, SigningKey, VerificationKey},
    prelude::*,
    ErrorKind, ParseError, ValidationError,
};

const NOW: i64 = 1_700_000_000;
const SECRET: &[u8] = b"super_secret_key_donut_steel";

fn fixed_clock() -> DateTime<Utc> {
    Utc.timestamp_opt(NOW, 0).unwrap()
}

fn options<'a>(rule: SignatureRule<'a>) -> ValidationOptions<'a> {
    ValidationOptions::with_time_options(
        rule,
        TimeOptions::new(Duration::zero(), fixed_clock as fn() -> DateTime<Utc>),
    )
}

fn issue(payload: serde_json::Value) -> String {
    let payload = Fields::from_slice(payload.to_string().as_bytes()).unwrap();
    UnsignedToken::new(Fields::new().with("typ", "JWT"), payload)
        .sign(SigningAlgorithm::Hs256, &SigningKey::symmetric(SECRET))
        .unwrap()
        .to_text()
        .unwrap()
}

#[test]
fn key_rotation_with_key_list() {
    let token = issue(json!({ "sub": "alice", "exp": NOW + 60 }));
    let token = Token::parse(&token).unwrap();

    let right_key = VerificationKey::symmetric(SECRET);
    let wrong_key = VerificationKey::symmetric(b"retired_key");
    let keys = [wrong_key.clone(), right_key];
    token.validate(&options(SignatureRule::KeyList(&keys))).unwrap();

    let err = token
        .validate(&options(SignatureRule::KeyList(&keys[..1])))
        .unwrap_err();
    assert_matches!(err, ValidationError::InvalidSignature);
    let err = token
        .validate(&options(SignatureRule::SingleKey(&wrong_key)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSignature);
}

#[test]
fn keys_resolved_by_issuer() {
    let seen_issuers = Mutex::new(vec![]);
    let resolver = |issuer: Option<&str>| {
        seen_issuers.lock().unwrap().push(issuer.map(str::to_owned));
        match issuer {
            Some("https://issuer.example.com") => vec![VerificationKey::symmetric(SECRET)],
            _ => vec![],
        }
    };

    let token = issue(json!({ "iss": "https://issuer.example.com", "sub": "alice" }));
    let token = Token::parse(&token).unwrap();
    let options = options(SignatureRule::Resolver(&resolver))
        .with_issuer(IssuerRule::ExactlyOne("https://issuer.example.com".into()));
    token.validate(&options).unwrap();

    let token = issue(json!({ "iss": "https://evil.example.com", "sub": "alice" }));
    let token = Token::parse(&token).unwrap();
    let err = token.validate(&options).unwrap_err();
    assert_matches!(err, ValidationError::InvalidSignature);

    assert_eq!(
        *seen_issuers.lock().unwrap(),
        [
            Some("https://issuer.example.com".to_owned()),
            Some("https://evil.example.com".to_owned()),
        ]
    );
}

#[test]
fn options_are_shared_among_threads() {
    let tokens: Vec<_> = (0..4)
        .map(|i| issue(json!({ "sub": format!("user{i}"), "exp": NOW + 60 })))
        .collect();
    let keys = [
        VerificationKey::symmetric(b"retired_key"),
        VerificationKey::symmetric(SECRET),
    ];
    let resolver = |_: Option<&str>| keys.to_vec();
    let rules = [
        SignatureRule::SingleKey(&keys[1]),
        SignatureRule::KeyList(&keys),
        SignatureRule::Resolver(&resolver),
    ];

    for rule in rules {
        let options = options(rule);
        thread::scope(|scope| {
            let handles: Vec<_> = tokens
                .iter()
                .map(|token| {
                    let options = &options;
                    scope.spawn(move || Token::parse(token).unwrap().validate(options))
                })
                .collect();
            for handle in handles {
                handle.join().unwrap().unwrap();
            }
        });
    }
}

#[test]
fn audience_must_contain_all_required_entries() {
    let token = issue(json!({ "aud": ["a", "b", "c"] }));
    let token = Token::parse(&token).unwrap();
    let key = VerificationKey::symmetric(SECRET);

    let options = options(SignatureRule::SingleKey(&key))
        .with_audience(AudienceRule::AllOf(vec!["a".into(), "c".into()]));
    token.validate(&options).unwrap();

    let options = options.with_audience(AudienceRule::AllOf(vec!["a".into(), "d".into()]));
    let err = token.validate(&options).unwrap_err();
    assert_matches!(err, ValidationError::AudienceMismatch);
}

#[test]
fn expiration_boundary() {
    let key = VerificationKey::symmetric(SECRET);
    let token = Token::parse(&issue(json!({ "exp": NOW }))).unwrap();
    let err = token
        .validate(&options(SignatureRule::SingleKey(&key)))
        .unwrap_err();
    assert_matches!(err, ValidationError::Expired);

    let token = Token::parse(&issue(json!({ "exp": NOW + 1 }))).unwrap();
    token
        .validate(&options(SignatureRule::SingleKey(&key)))
        .unwrap();

    // Leeway extends the validity window.
    let token = Token::parse(&issue(json!({ "exp": NOW - 30 }))).unwrap();
    let time = TimeOptions::new(Duration::seconds(60), fixed_clock);
    let options = options(SignatureRule::SingleKey(&key)).with_time(time);
    token.validate(&options).unwrap();
}

#[test]
fn expiration_is_checked_before_signature() {
    let token = issue(json!({ "exp": NOW - 1 }));
    let token = Token::parse(&token).unwrap();
    let wrong_key = VerificationKey::symmetric(b"wrong");
    let err = token
        .validate(&options(SignatureRule::SingleKey(&wrong_key)))
        .unwrap_err();
    assert_matches!(err, ValidationError::Expired);
}

#[test]
fn unsecured_token_is_rejected_regardless_of_keys() {
    let token = Token::parse("eyJhbGciOiJub25lIn0.eyJzdWIiOiJqb2UifQ.").unwrap();
    let keys = [VerificationKey::symmetric(SECRET), VerificationKey::symmetric(b"")];
    for rule in [
        SignatureRule::SingleKey(&keys[0]),
        SignatureRule::KeyList(&keys),
        SignatureRule::KeyList(&[]),
    ] {
        let err = token.validate(&options(rule)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
    }

    // Skipping signature checks is an explicit opt-out.
    token.validate(&options(SignatureRule::Skip)).unwrap();
}

#[test]
fn error_kinds() {
    let err = Token::parse("not a token").unwrap_err();
    assert_matches!(err, ParseError::InvalidTokenStructure { .. });
    assert_eq!(err.kind(), ErrorKind::Format);

    let err = Token::parse("eyJhbGciOiJIUzI1NiJ9.@@@.").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encoding);

    let key = VerificationKey::symmetric(SECRET);
    let token = Token::parse(&issue(json!({ "exp": "tomorrow" }))).unwrap();
    let err = token
        .validate(&options(SignatureRule::SingleKey(&key)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ClaimType);

    let token = Token::parse(&issue(json!({ "nbf": NOW + 10 }))).unwrap();
    let err = token
        .validate(&options(SignatureRule::SingleKey(&key)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotYetValid);

    let token = Token::parse(&issue(json!({ "iss": "someone" }))).unwrap();
    let options = options(SignatureRule::SingleKey(&key))
        .with_issuer(IssuerRule::AnyOf(vec!["me".into(), "you".into()]));
    let err = token.validate(&options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IssuerMismatch);
}
