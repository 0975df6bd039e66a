//! Traits implemented by crypto backends.

use std::{borrow::Cow, num::NonZeroUsize};

/// Signature for a certain JWT signing [`Algorithm`].
///
/// We require that signature can be restored from a byte slice,
/// and can be represented as a byte slice.
pub trait AlgorithmSignature: Sized {
    /// Constant byte length of signatures supported by the [`Algorithm`], or `None` if
    /// the signature length is variable.
    ///
    /// If this value is `Some(_)`, the signature length is checked before calling
    /// [`Self::try_from_slice()`]; a signature with an unexpected length fails verification.
    const LENGTH: Option<NonZeroUsize> = None;

    /// Attempts to restore a signature from a byte slice. This method may fail
    /// if the slice is malformed.
    fn try_from_slice(slice: &[u8]) -> anyhow::Result<Self>;

    /// Represents this signature as bytes.
    fn as_bytes(&self) -> Cow<'_, [u8]>;
}

/// JWT signing algorithm with strongly typed keys and signatures.
///
/// Implementations are the building blocks of the [algorithm registry](crate::alg::SigningAlgorithm),
/// which maps dynamically typed keys to these typed ones.
pub trait Algorithm {
    /// Key used when issuing new tokens.
    type SigningKey;
    /// Key used when verifying tokens. May coincide with [`Self::SigningKey`] for symmetric
    /// algorithms (e.g., `HS*`).
    type VerifyingKey;
    /// Signature produced by the algorithm.
    type Signature: AlgorithmSignature;

    /// Returns the name of this algorithm, as mentioned in the `alg` field of the JWT header.
    fn name(&self) -> Cow<'static, str>;

    /// Signs a `message` with the `signing_key`.
    fn sign(
        &self,
        signing_key: &Self::SigningKey,
        message: &[u8],
    ) -> anyhow::Result<Self::Signature>;

    /// Verifies the `message` against the `signature` and `verifying_key`.
    fn verify_signature(
        &self,
        signature: &Self::Signature,
        verifying_key: &Self::VerifyingKey,
        message: &[u8],
    ) -> bool;
}

/// Automatically implemented extensions of the [`Algorithm`] trait operating on raw bytes.
pub(crate) trait AlgorithmExt: Algorithm {
    /// Verifies raw `signature` bytes. Signatures that cannot be restored (e.g., because
    /// of an invalid length) fail verification.
    fn verify_bytes(
        &self,
        verifying_key: &Self::VerifyingKey,
        message: &[u8],
        signature: &[u8],
    ) -> bool {
        if let Some(expected_len) = Self::Signature::LENGTH {
            if signature.len() != expected_len.get() {
                return false;
            }
        }
        let Ok(signature) = Self::Signature::try_from_slice(signature) else {
            return false;
        };
        self.verify_signature(&signature, verifying_key, message)
    }

    /// Signs the `message` and returns raw signature bytes.
    fn sign_to_vec(
        &self,
        signing_key: &Self::SigningKey,
        message: &[u8],
    ) -> anyhow::Result<Vec<u8>> {
        let signature = self.sign(signing_key, message)?;
        Ok(signature.as_bytes().into_owned())
    }
}

impl<A: Algorithm> AlgorithmExt for A {}
