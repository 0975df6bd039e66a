//! `ES256K` algorithm implementation using the `k256` crate.

use k256::ecdsa::{
    signature::{DigestSigner, DigestVerifier},
    Signature, SigningKey, VerifyingKey,
};
use sha2::{Digest, Sha256};

use std::{borrow::Cow, num::NonZeroUsize};

use crate::{Algorithm, AlgorithmSignature};

impl AlgorithmSignature for Signature {
    const LENGTH: Option<NonZeroUsize> = NonZeroUsize::new(64);

    fn try_from_slice(slice: &[u8]) -> anyhow::Result<Self> {
        Signature::try_from(slice).map_err(|err| anyhow::anyhow!(err))
    }

    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(self.to_bytes().to_vec())
    }
}

/// Algorithm implementing elliptic curve digital signatures (ECDSA) on the secp256k1 curve
/// with the SHA-256 digest. The algorithm name is `ES256K`, as per [RFC 8812].
///
/// [RFC 8812]: https://www.rfc-editor.org/rfc/rfc8812.html
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Es256k;

impl Algorithm for Es256k {
    type SigningKey = SigningKey;
    type VerifyingKey = VerifyingKey;
    type Signature = Signature;

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("ES256K")
    }

    fn sign(&self, signing_key: &Self::SigningKey, message: &[u8]) -> anyhow::Result<Signature> {
        let digest = Sha256::new_with_prefix(message);
        signing_key
            .try_sign_digest(digest)
            .map_err(|err| anyhow::anyhow!(err))
    }

    fn verify_signature(
        &self,
        signature: &Self::Signature,
        verifying_key: &Self::VerifyingKey,
        message: &[u8],
    ) -> bool {
        // Some implementations (e.g., OpenSSL) produce high-S signatures, which
        // are considered invalid by this implementation. Hence, we perform normalization here.
        //
        // See also: https://github.com/bitcoin/bips/blob/master/bip-0062.mediawiki
        let normalized_signature = signature.normalize_s().unwrap_or_else(|| signature.clone());

        let digest = Sha256::new_with_prefix(message);
        verifying_key
            .verify_digest(digest, &normalized_signature)
            .is_ok()
    }
}
