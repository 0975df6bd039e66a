//! Supported signing algorithms and the keys they work with.
//!
//! Each algorithm is implemented by a crypto backend with strongly typed keys and signatures
//! (e.g., [`Hs256`] or [`Es256`]). [`SigningAlgorithm`] is a closed registry mapping `alg`
//! names to these backends and dynamically typed [`VerificationKey`]s / [`SigningKey`]s
//! to the typed keys. The `none` algorithm is not a part of the registry, so there is no way
//! to accept unsecured tokens.

use std::{fmt, str::FromStr};

use crate::{error::CreationError, traits::AlgorithmExt, VerifyError};

mod eddsa_dalek;
mod hmacs;
mod k256;
mod keys;
mod p256;
mod rsa;

pub use self::{
    eddsa_dalek::Ed25519,
    hmacs::{Hs256, Hs256Signature, Hs384, Hs384Signature, Hs512, Hs512Signature, SymmetricKey},
    k256::Es256k,
    keys::{
        EcPublicKey, EcSigningKey, EdwardsPublicKey, EdwardsSigningKey, KeyKind, SigningKey,
        VerificationKey,
    },
    p256::Es256,
    rsa::{Rsa, RsaPrivateKey, RsaPublicKey, RsaSignature},
};

/// Hash function from the SHA-2 family used by an algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum HashAlg {
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl HashAlg {
    /// Returns the digest size in bytes.
    pub const fn output_size(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }
}

/// Signing algorithm supported for JWT verification and issuance.
///
/// # Examples
///
/// ```
/// # use jwt_verifier::alg::{HashAlg, KeyKind, SigningAlgorithm};
/// let alg: SigningAlgorithm = "ES256K".parse()?;
/// assert_eq!(alg, SigningAlgorithm::Es256k);
/// assert_eq!(alg.key_kind(), KeyKind::EllipticCurve);
/// assert_eq!(alg.hash(), Some(HashAlg::Sha256));
///
/// // Unsecured tokens are never supported.
/// assert!(SigningAlgorithm::from_name("none").is_none());
/// // Names are case-sensitive.
/// assert!(SigningAlgorithm::from_name("hs256").is_none());
/// # Ok::<_, jwt_verifier::VerifyError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256.
    Hs256,
    /// HMAC with SHA-384.
    Hs384,
    /// HMAC with SHA-512.
    Hs512,
    /// ECDSA on the P-256 curve with SHA-256.
    Es256,
    /// ECDSA on the secp256k1 curve with SHA-256.
    Es256k,
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    Rs256,
    /// RSASSA-PKCS1-v1_5 with SHA-384.
    Rs384,
    /// RSASSA-PKCS1-v1_5 with SHA-512.
    Rs512,
    /// RSASSA-PSS with SHA-256.
    Ps256,
    /// RSASSA-PSS with SHA-384.
    Ps384,
    /// RSASSA-PSS with SHA-512.
    Ps512,
    /// Ed25519 signatures.
    EdDsa,
}

impl SigningAlgorithm {
    /// All supported algorithms.
    pub const ALL: [Self; 12] = [
        Self::Hs256,
        Self::Hs384,
        Self::Hs512,
        Self::Es256,
        Self::Es256k,
        Self::Rs256,
        Self::Rs384,
        Self::Rs512,
        Self::Ps256,
        Self::Ps384,
        Self::Ps512,
        Self::EdDsa,
    ];

    /// Looks up an algorithm by its `alg` name. The lookup is case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|alg| alg.name() == name)
    }

    /// Returns the `alg` name of this algorithm.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
            Self::Es256 => "ES256",
            Self::Es256k => "ES256K",
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
            Self::Ps256 => "PS256",
            Self::Ps384 => "PS384",
            Self::Ps512 => "PS512",
            Self::EdDsa => "EdDSA",
        }
    }

    /// Returns the kind of keys this algorithm works with.
    pub const fn key_kind(self) -> KeyKind {
        match self {
            Self::Hs256 | Self::Hs384 | Self::Hs512 => KeyKind::Symmetric,
            Self::Es256 | Self::Es256k => KeyKind::EllipticCurve,
            Self::Rs256 | Self::Rs384 | Self::Rs512 | Self::Ps256 | Self::Ps384 | Self::Ps512 => {
                KeyKind::Rsa
            }
            Self::EdDsa => KeyKind::Edwards,
        }
    }

    /// Returns the hash function applied to the signed message, or `None` for `EdDSA`,
    /// which signs the message as is.
    pub const fn hash(self) -> Option<HashAlg> {
        match self {
            Self::Hs256 | Self::Es256 | Self::Es256k | Self::Rs256 | Self::Ps256 => {
                Some(HashAlg::Sha256)
            }
            Self::Hs384 | Self::Rs384 | Self::Ps384 => Some(HashAlg::Sha384),
            Self::Hs512 | Self::Rs512 | Self::Ps512 => Some(HashAlg::Sha512),
            Self::EdDsa => None,
        }
    }

    fn rsa(self) -> Option<Rsa> {
        let hash_alg = self.hash()?;
        match self {
            Self::Rs256 | Self::Rs384 | Self::Rs512 => Some(Rsa::pkcs1v15(hash_alg)),
            Self::Ps256 | Self::Ps384 | Self::Ps512 => Some(Rsa::pss(hash_alg)),
            _ => None,
        }
    }

    /// Checks `signature` over `message` with a single key. A key that does not fit
    /// the algorithm (wrong kind or curve) fails verification.
    pub(crate) fn verify(self, key: &VerificationKey, message: &[u8], signature: &[u8]) -> bool {
        use self::{EcPublicKey as Ec, EdwardsPublicKey as Ed, VerificationKey as Key};

        match (self, key) {
            (Self::Hs256, Key::Symmetric(key)) => Hs256.verify_bytes(key, message, signature),
            (Self::Hs384, Key::Symmetric(key)) => Hs384.verify_bytes(key, message, signature),
            (Self::Hs512, Key::Symmetric(key)) => Hs512.verify_bytes(key, message, signature),
            (Self::Es256, Key::EllipticCurve(Ec::P256(key))) => {
                Es256.verify_bytes(key, message, signature)
            }
            (Self::Es256k, Key::EllipticCurve(Ec::Secp256k1(key))) => {
                Es256k.verify_bytes(key, message, signature)
            }
            (Self::EdDsa, Key::Edwards(Ed::Ed25519(key))) => {
                Ed25519.verify_bytes(key, message, signature)
            }
            (_, Key::Rsa(key)) => self
                .rsa()
                .map_or(false, |rsa| rsa.verify_bytes(key, message, signature)),
            _ => false,
        }
    }

    /// Signs `message` with the provided key.
    pub(crate) fn sign(self, key: &SigningKey, message: &[u8]) -> Result<Vec<u8>, CreationError> {
        use self::{EcSigningKey as Ec, EdwardsSigningKey as Ed, SigningKey as Key};

        let mismatch = CreationError::KeyMismatch {
            algorithm: self.name(),
        };
        let signature = match (self, key) {
            (Self::Hs256, Key::Symmetric(key)) => Hs256.sign_to_vec(key, message),
            (Self::Hs384, Key::Symmetric(key)) => Hs384.sign_to_vec(key, message),
            (Self::Hs512, Key::Symmetric(key)) => Hs512.sign_to_vec(key, message),
            (Self::Es256, Key::EllipticCurve(Ec::P256(key))) => Es256.sign_to_vec(key, message),
            (Self::Es256k, Key::EllipticCurve(Ec::Secp256k1(key))) => {
                Es256k.sign_to_vec(key, message)
            }
            (Self::EdDsa, Key::Edwards(Ed::Ed25519(key))) => Ed25519.sign_to_vec(key, message),
            (_, Key::Rsa(key)) => {
                let rsa = self.rsa().ok_or(mismatch)?;
                rsa.sign_to_vec(key, message)
            }
            _ => return Err(mismatch),
        };
        signature.map_err(CreationError::Backend)
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

impl FromStr for SigningAlgorithm {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| VerifyError::UnsupportedAlgorithm(s.to_owned()))
    }
}
