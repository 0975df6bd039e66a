//! RSA-based JWT schemes: `RS*` and `PS*`.

pub use rsa::{RsaPrivateKey, RsaPublicKey};

use rsa::{traits::PublicKeyParts, Pkcs1v15Sign, Pss};
use sha2::{Digest, Sha256, Sha384, Sha512};

use std::borrow::Cow;

use crate::{alg::HashAlg, Algorithm, AlgorithmSignature};

/// RSA signature.
#[derive(Debug, Clone)]
pub struct RsaSignature(Vec<u8>);

impl AlgorithmSignature for RsaSignature {
    fn try_from_slice(bytes: &[u8]) -> anyhow::Result<Self> {
        Ok(RsaSignature(bytes.to_vec()))
    }

    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self.0)
    }
}

impl HashAlg {
    fn digest(self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(message).to_vec(),
            Self::Sha384 => Sha384::digest(message).to_vec(),
            Self::Sha512 => Sha512::digest(message).to_vec(),
        }
    }
}

/// RSA padding algorithm.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
enum Padding {
    Pkcs1v15,
    Pss,
}

/// Integrity algorithm using [RSA] digital signatures.
///
/// Depending on the variation, the algorithm employs PKCS#1 v1.5 or PSS padding and
/// one of the hash functions from the SHA-2 family: SHA-256, SHA-384, or SHA-512.
/// See [RFC 7518] for more details. Depending on the chosen parameters,
/// the name of the algorithm is one of `RS256`, `RS384`, `RS512`, `PS256`, `PS384`, `PS512`:
///
/// - `R` / `P` denote the padding scheme: PKCS#1 v1.5 for `R`, PSS for `P`
/// - `256` / `384` / `512` denote the hash function
///
/// Public keys with a modulus shorter than 2048 bits are rejected during verification,
/// as required by RFC 7518.
///
/// [RSA]: https://en.wikipedia.org/wiki/RSA_(cryptosystem)
/// [RFC 7518]: https://www.rfc-editor.org/rfc/rfc7518.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rsa {
    hash_alg: HashAlg,
    padding_alg: Padding,
}

impl Rsa {
    /// Minimum supported modulus length in bits.
    pub const MIN_MODULUS_BITS: usize = 2_048;

    const fn new(hash_alg: HashAlg, padding_alg: Padding) -> Self {
        Rsa {
            hash_alg,
            padding_alg,
        }
    }

    pub(crate) const fn pkcs1v15(hash_alg: HashAlg) -> Self {
        Rsa::new(hash_alg, Padding::Pkcs1v15)
    }

    pub(crate) const fn pss(hash_alg: HashAlg) -> Self {
        Rsa::new(hash_alg, Padding::Pss)
    }

    /// RSA with SHA-256 and PKCS#1 v1.5 padding.
    pub const fn rs256() -> Rsa {
        Rsa::new(HashAlg::Sha256, Padding::Pkcs1v15)
    }

    /// RSA with SHA-384 and PKCS#1 v1.5 padding.
    pub const fn rs384() -> Rsa {
        Rsa::new(HashAlg::Sha384, Padding::Pkcs1v15)
    }

    /// RSA with SHA-512 and PKCS#1 v1.5 padding.
    pub const fn rs512() -> Rsa {
        Rsa::new(HashAlg::Sha512, Padding::Pkcs1v15)
    }

    /// RSA with SHA-256 and PSS padding.
    pub const fn ps256() -> Rsa {
        Rsa::new(HashAlg::Sha256, Padding::Pss)
    }

    /// RSA with SHA-384 and PSS padding.
    pub const fn ps384() -> Rsa {
        Rsa::new(HashAlg::Sha384, Padding::Pss)
    }

    /// RSA with SHA-512 and PSS padding.
    pub const fn ps512() -> Rsa {
        Rsa::new(HashAlg::Sha512, Padding::Pss)
    }

    fn alg_name(self) -> &'static str {
        match (self.padding_alg, self.hash_alg) {
            (Padding::Pkcs1v15, HashAlg::Sha256) => "RS256",
            (Padding::Pkcs1v15, HashAlg::Sha384) => "RS384",
            (Padding::Pkcs1v15, HashAlg::Sha512) => "RS512",
            (Padding::Pss, HashAlg::Sha256) => "PS256",
            (Padding::Pss, HashAlg::Sha384) => "PS384",
            (Padding::Pss, HashAlg::Sha512) => "PS512",
        }
    }

    fn pkcs1v15_scheme(self) -> Pkcs1v15Sign {
        match self.hash_alg {
            HashAlg::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
            HashAlg::Sha384 => Pkcs1v15Sign::new::<Sha384>(),
            HashAlg::Sha512 => Pkcs1v15Sign::new::<Sha512>(),
        }
    }

    // The salt length needs to be set to the size of hash function output;
    // see https://www.rfc-editor.org/rfc/rfc7518.html#section-3.5.
    fn pss_scheme(self) -> Pss {
        match self.hash_alg {
            HashAlg::Sha256 => Pss::new_with_salt::<Sha256>(Sha256::output_size()),
            HashAlg::Sha384 => Pss::new_with_salt::<Sha384>(Sha384::output_size()),
            HashAlg::Sha512 => Pss::new_with_salt::<Sha512>(Sha512::output_size()),
        }
    }
}

impl Algorithm for Rsa {
    type SigningKey = RsaPrivateKey;
    type VerifyingKey = RsaPublicKey;
    type Signature = RsaSignature;

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(self.alg_name())
    }

    fn sign(&self, signing_key: &RsaPrivateKey, message: &[u8]) -> anyhow::Result<RsaSignature> {
        let digest = self.hash_alg.digest(message);
        let mut rng = rand_core::OsRng;
        let signature = match self.padding_alg {
            Padding::Pkcs1v15 => {
                signing_key.sign_with_rng(&mut rng, self.pkcs1v15_scheme(), &digest)
            }
            Padding::Pss => signing_key.sign_with_rng(&mut rng, self.pss_scheme(), &digest),
        };
        signature
            .map(RsaSignature)
            .map_err(|err| anyhow::anyhow!(err))
    }

    fn verify_signature(
        &self,
        signature: &RsaSignature,
        verifying_key: &RsaPublicKey,
        message: &[u8],
    ) -> bool {
        if verifying_key.n().bits() < Self::MIN_MODULUS_BITS {
            return false;
        }

        let digest = self.hash_alg.digest(message);
        let result = match self.padding_alg {
            Padding::Pkcs1v15 => verifying_key.verify(self.pkcs1v15_scheme(), &digest, &signature.0),
            Padding::Pss => verifying_key.verify(self.pss_scheme(), &digest, &signature.0),
        };
        result.is_ok()
    }
}
