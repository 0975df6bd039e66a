//! JWT algorithms based on HMACs.

use anyhow::ensure;
use hmac::{
    digest::{generic_array::GenericArray, typenum::Unsigned, CtOutput, OutputSizeUser},
    Hmac, Mac,
};
use rand_core::{CryptoRng, RngCore};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use std::{borrow::Cow, fmt, num::NonZeroUsize};

use crate::{Algorithm, AlgorithmSignature};

/// Byte length of generated symmetric keys.
const GENERATED_KEY_LEN: usize = 64;

/// Secret shared by the issuer and the verifier of `HS*` tokens. Zeroed on drop.
///
/// Comparisons are constant-time. The `Debug` output does not reveal the secret.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey(Vec<u8>);

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SymmetricKey")
            .field("len", &self.0.len())
            .finish()
    }
}

impl SymmetricKey {
    /// Creates a key from the specified `bytes`.
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        Self(bytes.as_ref().to_vec())
    }

    /// Generates a random key using a cryptographically secure RNG.
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let mut key = Self(vec![0; GENERATED_KEY_LEN]);
        rng.fill_bytes(&mut key.0);
        key
    }
}

impl AsRef<[u8]> for SymmetricKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for SymmetricKey {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for SymmetricKey {}

macro_rules! define_hmac_algorithm {
    (
        $(#[$($attr:meta)+])*
        struct $name:ident<$digest:ident>($signature:ident, $alg_name:expr);
    ) => {
        #[doc = concat!("Signature produced by the [`", stringify!($name), "`] algorithm.")]
        #[derive(Clone, PartialEq, Eq)]
        pub struct $signature(CtOutput<Hmac<$digest>>);

        impl fmt::Debug for $signature {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.debug_tuple(stringify!($signature)).field(&"_").finish()
            }
        }

        impl AlgorithmSignature for $signature {
            const LENGTH: Option<NonZeroUsize> =
                NonZeroUsize::new(<$digest as OutputSizeUser>::OutputSize::USIZE);

            fn try_from_slice(bytes: &[u8]) -> anyhow::Result<Self> {
                let expected_len = <$digest as OutputSizeUser>::OutputSize::USIZE;
                ensure!(bytes.len() == expected_len, "invalid signature length");
                let bytes = GenericArray::clone_from_slice(bytes);
                Ok(Self(CtOutput::new(bytes)))
            }

            fn as_bytes(&self) -> Cow<'_, [u8]> {
                Cow::Owned(self.0.clone().into_bytes().to_vec())
            }
        }

        $(#[$($attr)+])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl $name {
            /// Computes HMAC with the `key` and the specified `message`.
            fn hmac(key: &SymmetricKey, message: &[u8]) -> CtOutput<Hmac<$digest>> {
                let mut hmac = <Hmac<$digest> as Mac>::new_from_slice(key.as_ref())
                    .expect("HMACs work with any key size");
                hmac.update(message);
                hmac.finalize()
            }
        }

        impl Algorithm for $name {
            type SigningKey = SymmetricKey;
            type VerifyingKey = SymmetricKey;
            type Signature = $signature;

            fn name(&self) -> Cow<'static, str> {
                Cow::Borrowed($alg_name)
            }

            fn sign(
                &self,
                signing_key: &Self::SigningKey,
                message: &[u8],
            ) -> anyhow::Result<Self::Signature> {
                Ok($signature(Self::hmac(signing_key, message)))
            }

            fn verify_signature(
                &self,
                signature: &Self::Signature,
                verifying_key: &Self::VerifyingKey,
                message: &[u8],
            ) -> bool {
                // `CtOutput` comparison is constant-time.
                Self::hmac(verifying_key, message) == signature.0
            }
        }
    };
}

define_hmac_algorithm! {
    /// `HS256` signing algorithm.
    ///
    /// See [RFC 7518] for the algorithm specification.
    ///
    /// [RFC 7518]: https://tools.ietf.org/html/rfc7518#section-3.2
    struct Hs256<Sha256>(Hs256Signature, "HS256");
}

define_hmac_algorithm! {
    /// `HS384` signing algorithm.
    ///
    /// See [RFC 7518] for the algorithm specification.
    ///
    /// [RFC 7518]: https://tools.ietf.org/html/rfc7518#section-3.2
    struct Hs384<Sha384>(Hs384Signature, "HS384");
}

define_hmac_algorithm! {
    /// `HS512` signing algorithm.
    ///
    /// See [RFC 7518] for the algorithm specification.
    ///
    /// [RFC 7518]: https://tools.ietf.org/html/rfc7518#section-3.2
    struct Hs512<Sha512>(Hs512Signature, "HS512");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::AlgorithmExt;

    #[test]
    fn hmac_round_trip() {
        let key = SymmetricKey::new(b"super_secret_key_donut_steel");
        let signature = Hs256.sign_to_vec(&key, b"message").unwrap();
        assert_eq!(signature.len(), 32);
        assert!(Hs256.verify_bytes(&key, b"message", &signature));
        assert!(!Hs256.verify_bytes(&key, b"other message", &signature));

        let other_key = SymmetricKey::new(b"super_secret_key_donut_steel!");
        assert!(!Hs256.verify_bytes(&other_key, b"message", &signature));
    }

    #[test]
    fn signatures_with_invalid_length_fail_verification() {
        let key = SymmetricKey::new(b"secret");
        let signature = Hs384.sign_to_vec(&key, b"message").unwrap();
        assert_eq!(signature.len(), 48);
        assert!(!Hs384.verify_bytes(&key, b"message", &signature[..47]));
        assert!(!Hs512.verify_bytes(&key, b"message", &signature));
    }

    #[test]
    fn key_debug_does_not_reveal_secret() {
        let key = SymmetricKey::new(b"secret");
        let debug_str = format!("{key:?}");
        assert!(!debug_str.contains("secret\""), "{debug_str}");
        assert_eq!(debug_str, "SymmetricKey { len: 6 }");
    }
}
