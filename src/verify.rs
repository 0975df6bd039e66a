//! Signature verification with one or more candidate keys.

use std::{borrow::Cow, fmt, iter};

use crate::{
    alg::{SigningAlgorithm, VerificationKey},
    claims::string_claim,
    Token, VerifyError,
};

/// Lazy sequence of candidate keys produced by a [`KeyResolver`].
pub type KeyIter<'a> = Box<dyn Iterator<Item = Cow<'a, VerificationKey>> + 'a>;

/// Source of candidate verification keys for a token, e.g. a key set of a remote issuer.
///
/// Keys are pulled from the returned iterator one by one, and verification stops as soon
/// as a key matches, so an implementation may fetch keys lazily.
///
/// Resolvers must be thread-safe, so that [`ValidationOptions`](crate::ValidationOptions)
/// referencing a resolver can be shared among threads.
///
/// The trait is implemented for closures returning a `Vec` of keys:
///
/// ```
/// # use jwt_verifier::{alg::VerificationKey, KeyResolver};
/// let resolver = |issuer: Option<&str>| match issuer {
///     Some("https://issuer.example.com") => vec![VerificationKey::symmetric(b"secret")],
///     _ => vec![],
/// };
/// assert_eq!(resolver.resolve(None).count(), 0);
/// ```
pub trait KeyResolver: Send + Sync {
    /// Resolves keys for the token issuer (the `iss` claim, if present).
    fn resolve<'a>(&'a self, issuer: Option<&'a str>) -> KeyIter<'a>;
}

impl<F> KeyResolver for F
where
    F: Fn(Option<&str>) -> Vec<VerificationKey> + Send + Sync,
{
    fn resolve<'a>(&'a self, issuer: Option<&'a str>) -> KeyIter<'a> {
        Box::new(self(issuer).into_iter().map(Cow::Owned))
    }
}

/// Determines which keys the token signature is checked against.
#[derive(Clone, Copy)]
#[non_exhaustive]
pub enum SignatureRule<'a> {
    /// Do not check the signature.
    Skip,
    /// Check the signature with a single key.
    SingleKey(&'a VerificationKey),
    /// Try keys from the list in order until one of them matches. This allows to rotate keys
    /// by putting both the old and new key in the list.
    KeyList(&'a [VerificationKey]),
    /// Try keys produced by a resolver in order until one of them matches.
    Resolver(&'a dyn KeyResolver),
}

impl fmt::Debug for SignatureRule<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => formatter.write_str("Skip"),
            Self::SingleKey(key) => formatter
                .debug_tuple("SingleKey")
                .field(&key.kind())
                .finish(),
            Self::KeyList(keys) => formatter
                .debug_struct("KeyList")
                .field("len", &keys.len())
                .finish(),
            Self::Resolver(_) => formatter.debug_tuple("Resolver").field(&"_").finish(),
        }
    }
}

impl<'a> SignatureRule<'a> {
    fn candidates(self, issuer: Option<&'a str>) -> KeyIter<'a> {
        match self {
            Self::Skip => Box::new(iter::empty()),
            Self::SingleKey(key) => Box::new(iter::once(Cow::Borrowed(key))),
            Self::KeyList(keys) => Box::new(keys.iter().map(Cow::Borrowed)),
            Self::Resolver(resolver) => resolver.resolve(issuer),
        }
    }
}

/// Verifies the signature of a `token` according to the `rule`.
///
/// Candidate keys are tried in order; verification succeeds with the first matching key.
/// A key of a kind not fitting the token algorithm counts as a failed attempt rather than
/// an error.
///
/// # Return value
///
/// - `Ok(true)` if a candidate key matches, or if the rule is [`SignatureRule::Skip`]
/// - `Ok(false)` if no candidate key matches (including the case of no candidates)
///
/// # Errors
///
/// - [`VerifyError::UnsupportedAlgorithm`] if the token algorithm is unknown or is `none`.
///   This check does not depend on the candidate keys.
/// - [`VerifyError::Claim`] if the `iss` claim is present, but is not a string.
pub fn verify(token: &Token, rule: &SignatureRule<'_>) -> Result<bool, VerifyError> {
    if matches!(rule, SignatureRule::Skip) {
        return Ok(true);
    }

    let algorithm = token.algorithm();
    let Some(algorithm) = SigningAlgorithm::from_name(algorithm) else {
        tracing::debug!(algorithm, "token algorithm is not supported");
        return Err(VerifyError::UnsupportedAlgorithm(algorithm.to_owned()));
    };
    let issuer = string_claim(token.payload(), "iss")?;

    let signature = token.signature();
    let required_kind = algorithm.key_kind();
    for (idx, key) in rule.candidates(issuer).enumerate() {
        if key.kind() != required_kind {
            tracing::trace!(
                idx,
                key.kind = %key.kind(),
                %algorithm,
                "skipped candidate key of unsuitable kind"
            );
            continue;
        }
        if algorithm.verify(&key, signature.message(), signature.value()) {
            tracing::trace!(idx, %algorithm, "candidate key accepted signature");
            return Ok(true);
        }
        tracing::trace!(idx, %algorithm, "candidate key rejected signature");
    }
    Ok(false)
}
