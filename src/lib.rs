//! [JSON web token (JWT)][JWT] parsing and validation with support of multiple algorithms
//! and multiple candidate keys.
//!
//! # Design choices
//!
//! - Token header and payload are represented as [`Fields`], ordered lists of JSON fields.
//!   Parsing preserves field order and duplicate fields, so a parsed token can be re-encoded
//!   without changing the signed bytes.
//! - The signed message of a parsed token is kept exactly as it was encountered in the token,
//!   so signature verification never depends on re-encoding JSON.
//! - Signing algorithms form a closed registry ([`SigningAlgorithm`](alg::SigningAlgorithm)).
//!   The `none` algorithm is not a part of it; tokens using it are always rejected.
//! - Keys are dynamically typed ([`VerificationKey`](alg::VerificationKey)). A key that does
//!   not fit the token algorithm counts as a failed verification attempt, which allows to
//!   try several keys of different kinds in order (e.g., during key rotation).
//! - Validation is fail-fast and performs checks in a fixed order: expiration, maturity,
//!   signature, audience, issuer. See [`validate()`] for details.
//!
//! ## Supported algorithms
//!
//! | Algorithm(s) | Key kind | Backend |
//! |--------------|----------|---------|
//! | `HS256`, `HS384`, `HS512` | Symmetric | [`hmac`] + [`sha2`] |
//! | `ES256` | Elliptic curve (P-256) | [`p256`] |
//! | `ES256K` | Elliptic curve (secp256k1) | [`k256`] |
//! | `RS256`, `RS384`, `RS512`, `PS256`, `PS384`, `PS512` | RSA | [`rsa`] |
//! | `EdDSA` (Ed25519) | Edwards curve | [`ed25519-dalek`] |
//!
//! # Crate features
//!
//! - `clock` (on by default) enables getting the current time using `Utc::now()` from [`chrono`].
//!   Without it, [`TimeOptions`] and [`ValidationOptions`] must be created with an explicitly
//!   specified clock function.
//!
//! # Logging
//!
//! The crate emits [`tracing`] events: a `debug` event for each failed validation check, and
//! `trace` events for each candidate key tried during signature verification. Key material
//! and signatures are never logged.
//!
//! [JWT]: https://jwt.io/
//! [`hmac`]: https://docs.rs/hmac/
//! [`sha2`]: https://docs.rs/sha2/
//! [`p256`]: https://docs.rs/p256/
//! [`k256`]: https://docs.rs/k256/
//! [`rsa`]: https://docs.rs/rsa/
//! [`ed25519-dalek`]: https://docs.rs/ed25519-dalek/
//! [`chrono`]: https://docs.rs/chrono/
//! [`tracing`]: https://docs.rs/tracing/
//!
//! # Examples
//!
//! Issuing and validating a token:
//!
//! ```
//! use chrono::{Duration, Utc};
//! use jwt_verifier::{
//!     alg::{SigningAlgorithm, SigningKey},
//!     prelude::*,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let signing_key = SigningKey::symmetric(b"super_secret_key_donut_steel");
//! let payload = Fields::new()
//!     .with("sub", "alice")
//!     .with("iss", "https://issuer.example.com")
//!     .with("aud", "api")
//!     .with("exp", (Utc::now() + Duration::hours(1)).timestamp());
//! let token = UnsignedToken::new(Fields::new().with("typ", "JWT"), payload)
//!     .sign(SigningAlgorithm::Hs256, &signing_key)?;
//! let token_string = token.to_text()?;
//!
//! // Validate the token.
//! let token = Token::parse(&token_string)?;
//! let keys = [
//!     // The key we've just signed the token with.
//!     signing_key.to_verification_key(),
//!     // Another key, e.g., a newer one.
//!     VerificationKey::symmetric(b"new_secret_key"),
//! ];
//! let options = ValidationOptions::new(SignatureRule::KeyList(&keys))
//!     .with_issuer(IssuerRule::ExactlyOne("https://issuer.example.com".into()))
//!     .with_audience(AudienceRule::ExactlyOne("api".into()));
//! token.validate(&options)?;
//! assert_eq!(token.standard_payload()?.subject.as_deref(), Some("alice"));
//! # Ok(())
//! # } // end main()
//! ```
//!
//! Branching on errors:
//!
//! ```
//! # use jwt_verifier::{prelude::*, ErrorKind};
//! let token: Token = "eyJhbGciOiJub25lIn0.eyJzdWIiOiJqb2UifQ.".parse()?;
//! let key = VerificationKey::symmetric(b"super_secret_key_donut_steel");
//! let err = token
//!     .validate(&ValidationOptions::new(SignatureRule::SingleKey(&key)))
//!     .unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
//! # Ok::<_, jwt_verifier::ParseError>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_root_url = "https://docs.rs/jwt-verifier/0.1.0")]
#![warn(missing_debug_implementations, missing_docs, bare_trait_objects)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

pub mod alg;
mod claims;
mod error;
mod fields;
mod token;
mod traits;
mod validation;
mod verify;

/// Prelude to neatly import all necessary stuff from the crate.
pub mod prelude {
    #[doc(no_inline)]
    pub use crate::{
        alg::VerificationKey, AudienceRule, Fields, IssuerRule, SignatureRule, TimeOptions, Token,
        UnsignedToken, ValidationOptions,
    };
}

pub use serde_json::Value;

pub use crate::{
    claims::{
        parse_standard_header, parse_standard_payload, Audience, StandardHeader, StandardPayload,
        TimeOptions,
    },
    error::{
        ClaimError, ClaimShape, CreationError, ErrorKind, ParseError, TokenPart, ValidationError,
        VerifyError,
    },
    fields::Fields,
    token::{SignatureInfo, Token, UnsignedToken},
    traits::{Algorithm, AlgorithmSignature},
    validation::{validate, AudienceRule, IssuerRule, ValidationOptions},
    verify::{verify, KeyIter, KeyResolver, SignatureRule},
};
