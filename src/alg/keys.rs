//! Dynamically typed signing and verification keys.

use k256::ecdsa as k256_ecdsa;
use p256::ecdsa as p256_ecdsa;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};

use std::fmt;

use super::SymmetricKey;

/// Family of a key. Each signing algorithm accepts keys of exactly one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KeyKind {
    /// Symmetric secret, used by `HS*` algorithms.
    Symmetric,
    /// Public or private key in an ECDSA crypto system, used by `ES*` algorithms.
    EllipticCurve,
    /// Public or private RSA key, used by `RS*` and `PS*` algorithms.
    Rsa,
    /// Public or private key on an Edwards curve, used by the `EdDSA` algorithm.
    Edwards,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Symmetric => "symmetric",
            Self::EllipticCurve => "elliptic curve",
            Self::Rsa => "RSA",
            Self::Edwards => "Edwards curve",
        })
    }
}

/// Elliptic curve public key used by `ES*` algorithms.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EcPublicKey {
    /// Key on the secp256r1 curve (aka P-256). Used by `ES256`.
    P256(p256_ecdsa::VerifyingKey),
    /// Key on the secp256k1 curve. Used by `ES256K`.
    Secp256k1(k256_ecdsa::VerifyingKey),
}

impl EcPublicKey {
    /// Returns the curve name as used in the `crv` field of JSON web keys.
    pub fn curve(&self) -> &'static str {
        match self {
            Self::P256(_) => "P-256",
            Self::Secp256k1(_) => "secp256k1",
        }
    }
}

/// Edwards curve public key used by the `EdDSA` algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EdwardsPublicKey {
    /// Ed25519 key.
    Ed25519(ed25519_dalek::VerifyingKey),
}

impl EdwardsPublicKey {
    /// Returns the curve name as used in the `crv` field of JSON web keys.
    pub fn curve(&self) -> &'static str {
        match self {
            Self::Ed25519(_) => "Ed25519",
        }
    }
}

/// Key used to verify token signatures.
///
/// A key only works with algorithms of its [`KeyKind`]; offering a key of a different kind
/// to an algorithm is not an error, but a failed verification attempt.
///
/// # Examples
///
/// ```
/// # use jwt_verifier::alg::{KeyKind, VerificationKey};
/// let key = VerificationKey::symmetric(b"a-string-secret-at-least-256-bits-long");
/// assert_eq!(key.kind(), KeyKind::Symmetric);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum VerificationKey {
    /// Shared secret for `HS*` algorithms.
    Symmetric(SymmetricKey),
    /// Elliptic curve public key for `ES*` algorithms.
    EllipticCurve(EcPublicKey),
    /// RSA public key for `RS*` / `PS*` algorithms.
    Rsa(RsaPublicKey),
    /// Edwards curve public key for the `EdDSA` algorithm.
    Edwards(EdwardsPublicKey),
}

impl VerificationKey {
    /// Creates a symmetric key from the secret bytes.
    pub fn symmetric(secret: impl AsRef<[u8]>) -> Self {
        Self::Symmetric(SymmetricKey::new(secret))
    }

    /// Creates a P-256 public key from its SEC1 encoding (compressed or uncompressed).
    pub fn p256_from_sec1(bytes: &[u8]) -> anyhow::Result<Self> {
        let key = p256_ecdsa::VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|err| anyhow::anyhow!(err))?;
        Ok(key.into())
    }

    /// Creates a secp256k1 public key from its SEC1 encoding (compressed or uncompressed).
    pub fn secp256k1_from_sec1(bytes: &[u8]) -> anyhow::Result<Self> {
        let key = k256_ecdsa::VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|err| anyhow::anyhow!(err))?;
        Ok(key.into())
    }

    /// Creates an RSA public key from the big-endian presentations of its modulus
    /// and public exponent (i.e., `n` and `e` fields of a JSON web key).
    pub fn rsa_from_components(modulus: &[u8], public_exponent: &[u8]) -> anyhow::Result<Self> {
        let key = RsaPublicKey::new(
            BigUint::from_bytes_be(modulus),
            BigUint::from_bytes_be(public_exponent),
        )?;
        Ok(key.into())
    }

    /// Creates an Ed25519 public key from its 32-byte encoding.
    pub fn ed25519_from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let bytes = <&[u8; ed25519_dalek::PUBLIC_KEY_LENGTH]>::try_from(bytes).map_err(|err| {
            anyhow::anyhow!(err).context("Ed25519 public key has unexpected length")
        })?;
        let key = ed25519_dalek::VerifyingKey::from_bytes(bytes)?;
        Ok(key.into())
    }

    /// Returns the kind of this key.
    pub fn kind(&self) -> KeyKind {
        match self {
            Self::Symmetric(_) => KeyKind::Symmetric,
            Self::EllipticCurve(_) => KeyKind::EllipticCurve,
            Self::Rsa(_) => KeyKind::Rsa,
            Self::Edwards(_) => KeyKind::Edwards,
        }
    }

    /// Returns the curve name for elliptic and Edwards curve keys.
    pub fn curve(&self) -> Option<&'static str> {
        match self {
            Self::EllipticCurve(key) => Some(key.curve()),
            Self::Edwards(key) => Some(key.curve()),
            Self::Symmetric(_) | Self::Rsa(_) => None,
        }
    }
}

impl From<SymmetricKey> for VerificationKey {
    fn from(key: SymmetricKey) -> Self {
        Self::Symmetric(key)
    }
}

impl From<p256_ecdsa::VerifyingKey> for VerificationKey {
    fn from(key: p256_ecdsa::VerifyingKey) -> Self {
        Self::EllipticCurve(EcPublicKey::P256(key))
    }
}

impl From<k256_ecdsa::VerifyingKey> for VerificationKey {
    fn from(key: k256_ecdsa::VerifyingKey) -> Self {
        Self::EllipticCurve(EcPublicKey::Secp256k1(key))
    }
}

impl From<RsaPublicKey> for VerificationKey {
    fn from(key: RsaPublicKey) -> Self {
        Self::Rsa(key)
    }
}

impl From<ed25519_dalek::VerifyingKey> for VerificationKey {
    fn from(key: ed25519_dalek::VerifyingKey) -> Self {
        Self::Edwards(EdwardsPublicKey::Ed25519(key))
    }
}

/// Elliptic curve private key used by `ES*` algorithms.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum EcSigningKey {
    /// Key on the secp256r1 curve (aka P-256). Used by `ES256`.
    P256(p256_ecdsa::SigningKey),
    /// Key on the secp256k1 curve. Used by `ES256K`.
    Secp256k1(k256_ecdsa::SigningKey),
}

/// Edwards curve private key used by the `EdDSA` algorithm.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum EdwardsSigningKey {
    /// Ed25519 key.
    Ed25519(ed25519_dalek::SigningKey),
}

/// Key used to sign tokens.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SigningKey {
    /// Shared secret for `HS*` algorithms.
    Symmetric(SymmetricKey),
    /// Elliptic curve private key for `ES*` algorithms.
    EllipticCurve(EcSigningKey),
    /// RSA private key for `RS*` / `PS*` algorithms.
    Rsa(RsaPrivateKey),
    /// Edwards curve private key for the `EdDSA` algorithm.
    Edwards(EdwardsSigningKey),
}

impl SigningKey {
    /// Creates a symmetric key from the secret bytes.
    pub fn symmetric(secret: impl AsRef<[u8]>) -> Self {
        Self::Symmetric(SymmetricKey::new(secret))
    }

    /// Returns the kind of this key.
    pub fn kind(&self) -> KeyKind {
        match self {
            Self::Symmetric(_) => KeyKind::Symmetric,
            Self::EllipticCurve(_) => KeyKind::EllipticCurve,
            Self::Rsa(_) => KeyKind::Rsa,
            Self::Edwards(_) => KeyKind::Edwards,
        }
    }

    /// Returns the key verifying signatures produced with this key. For symmetric keys,
    /// this is a copy of the key itself.
    pub fn to_verification_key(&self) -> VerificationKey {
        match self {
            Self::Symmetric(key) => key.clone().into(),
            Self::EllipticCurve(EcSigningKey::P256(key)) => (*key.verifying_key()).into(),
            Self::EllipticCurve(EcSigningKey::Secp256k1(key)) => (*key.verifying_key()).into(),
            Self::Rsa(key) => key.to_public_key().into(),
            Self::Edwards(EdwardsSigningKey::Ed25519(key)) => key.verifying_key().into(),
        }
    }
}

impl From<SymmetricKey> for SigningKey {
    fn from(key: SymmetricKey) -> Self {
        Self::Symmetric(key)
    }
}

impl From<p256_ecdsa::SigningKey> for SigningKey {
    fn from(key: p256_ecdsa::SigningKey) -> Self {
        Self::EllipticCurve(EcSigningKey::P256(key))
    }
}

impl From<k256_ecdsa::SigningKey> for SigningKey {
    fn from(key: k256_ecdsa::SigningKey) -> Self {
        Self::EllipticCurve(EcSigningKey::Secp256k1(key))
    }
}

impl From<RsaPrivateKey> for SigningKey {
    fn from(key: RsaPrivateKey) -> Self {
        Self::Rsa(key)
    }
}

impl From<ed25519_dalek::SigningKey> for SigningKey {
    fn from(key: ed25519_dalek::SigningKey) -> Self {
        Self::Edwards(EdwardsSigningKey::Ed25519(key))
    }
}
