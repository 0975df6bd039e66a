//! Error handling.

use core::fmt;

/// Coarse classification of the errors produced by the crate.
///
/// Applications can branch on the kind to decide, for example, between responding
/// with "401 Unauthorized" (bad token) and logging an internal fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Structural shape violation: wrong segment count, missing required field, etc.
    Format,
    /// Base64url decoding failure.
    Encoding,
    /// Malformed UTF-8 or JSON, or a JSON value that is not an object.
    Decode,
    /// A claim is present, but has an unexpected shape.
    ClaimType,
    /// Token algorithm is absent from the registry or is disabled (e.g., `none`).
    UnsupportedAlgorithm,
    /// Token signature did not match any of the candidate keys.
    InvalidSignature,
    /// Token has expired as per its `exp` claim.
    Expired,
    /// Token is not yet valid as per its `nbf` claim.
    NotYetValid,
    /// Token audience does not satisfy the audience rule.
    AudienceMismatch,
    /// Token issuer does not satisfy the issuer rule.
    IssuerMismatch,
    /// Failure while creating a token.
    Creation,
}

/// Part of a compact token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPart {
    /// Token header (the first part).
    Header,
    /// Token payload, i.e. claims (the second part).
    Payload,
    /// Token signature (the third part).
    Signature,
}

impl fmt::Display for TokenPart {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Header => "header",
            Self::Payload => "payload",
            Self::Signature => "signature",
        })
    }
}

/// Errors that may occur during token parsing.
#[derive(Debug)]
#[non_exhaustive]
pub enum ParseError {
    /// Token has invalid structure.
    ///
    /// Valid tokens must consist of 3 base64url-encoded parts (header, claims, and signature)
    /// separated by periods.
    InvalidTokenStructure {
        /// Number of period-separated parts found in the input.
        parts: usize,
    },
    /// Cannot decode base64url in the specified token part.
    InvalidBase64Encoding(TokenPart),
    /// Token header or payload is not UTF-8-encoded JSON object.
    Malformed {
        /// Malformed part of the token.
        part: TokenPart,
        /// Underlying error.
        source: serde_json::Error,
    },
    /// Token header does not contain the `alg` field.
    MissingAlgorithm,
    /// `alg` field in the token header is not a string.
    InvalidAlgorithm,
    /// `alg` field occurs in the token header more than once.
    DuplicateAlgorithm,
}

impl ParseError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTokenStructure { .. }
            | Self::MissingAlgorithm
            | Self::InvalidAlgorithm
            | Self::DuplicateAlgorithm => ErrorKind::Format,
            Self::InvalidBase64Encoding(_) => ErrorKind::Encoding,
            Self::Malformed { .. } => ErrorKind::Decode,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTokenStructure { parts } => {
                write!(formatter, "invalid token structure: expected 3 parts, found {parts}")
            }
            Self::InvalidBase64Encoding(part) => {
                write!(formatter, "invalid base64url encoding of token {part}")
            }
            Self::Malformed { part, source } => write!(formatter, "malformed token {part}: {source}"),
            Self::MissingAlgorithm => formatter.write_str("token header has no `alg` field"),
            Self::InvalidAlgorithm => formatter.write_str("`alg` field in token header is not a string"),
            Self::DuplicateAlgorithm => {
                formatter.write_str("`alg` field is specified in token header more than once")
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Expected shape of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ClaimShape {
    /// JSON string.
    String,
    /// JSON number (integer or floating-point).
    Number,
    /// JSON array of strings.
    StringArray,
    /// JSON string or array of strings.
    StringOrArray,
}

impl fmt::Display for ClaimShape {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::String => "string",
            Self::Number => "number",
            Self::StringArray => "array of strings",
            Self::StringOrArray => "string or array of strings",
        })
    }
}

/// Error extracting a standard field from the token header or payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClaimError {
    /// The claim is present, but has an unexpected shape.
    UnexpectedType {
        /// Name of the claim (e.g., `exp`).
        claim: &'static str,
        /// Expected claim shape.
        expected: ClaimShape,
    },
    /// A mandatory claim is absent.
    Missing(&'static str),
}

impl ClaimError {
    pub(crate) fn unexpected_type(claim: &'static str, expected: ClaimShape) -> Self {
        Self::UnexpectedType { claim, expected }
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedType { .. } => ErrorKind::ClaimType,
            Self::Missing(_) => ErrorKind::Format,
        }
    }
}

impl fmt::Display for ClaimError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedType { claim, expected } => {
                write!(formatter, "claim `{claim}` has unexpected type (expected {expected})")
            }
            Self::Missing(claim) => write!(formatter, "mandatory claim `{claim}` is absent"),
        }
    }
}

impl std::error::Error for ClaimError {}

/// Errors that can occur during signature verification.
///
/// Note that a signature that does not match any of the candidate keys is *not* an error;
/// it is signalled by returning `Ok(false)`.
#[derive(Debug)]
#[non_exhaustive]
pub enum VerifyError {
    /// Token algorithm is not supported.
    UnsupportedAlgorithm(String),
    /// A claim consulted during verification (`iss`) has an unexpected type.
    Claim(ClaimError),
}

impl VerifyError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            Self::Claim(err) => err.kind(),
        }
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedAlgorithm(alg) => write!(formatter, "unsupported algorithm: {alg}"),
            Self::Claim(err) => fmt::Display::fmt(err, formatter),
        }
    }
}

impl std::error::Error for VerifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Claim(err) => Some(err),
            Self::UnsupportedAlgorithm(_) => None,
        }
    }
}

impl From<ClaimError> for VerifyError {
    fn from(err: ClaimError) -> Self {
        Self::Claim(err)
    }
}

/// Errors that can occur during token validation.
#[derive(Debug)]
#[non_exhaustive]
pub enum ValidationError {
    /// A claim consulted during validation has an unexpected type.
    Claim(ClaimError),
    /// Token algorithm is not supported.
    UnsupportedAlgorithm(String),
    /// Token signature has failed verification with all candidate keys.
    InvalidSignature,
    /// Token has expired.
    Expired,
    /// Token is not yet valid as per `nbf` claim.
    NotYetValid,
    /// Token audience does not satisfy the audience rule.
    AudienceMismatch,
    /// Token issuer does not satisfy the issuer rule.
    IssuerMismatch,
}

impl ValidationError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Claim(err) => err.kind(),
            Self::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            Self::InvalidSignature => ErrorKind::InvalidSignature,
            Self::Expired => ErrorKind::Expired,
            Self::NotYetValid => ErrorKind::NotYetValid,
            Self::AudienceMismatch => ErrorKind::AudienceMismatch,
            Self::IssuerMismatch => ErrorKind::IssuerMismatch,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claim(err) => fmt::Display::fmt(err, formatter),
            Self::UnsupportedAlgorithm(alg) => write!(formatter, "unsupported algorithm: {alg}"),
            Self::InvalidSignature => formatter.write_str("signature has failed verification"),
            Self::Expired => formatter.write_str("token has expired"),
            Self::NotYetValid => formatter.write_str("token is not yet valid"),
            Self::AudienceMismatch => formatter.write_str("token audience is not accepted"),
            Self::IssuerMismatch => formatter.write_str("token issuer is not accepted"),
        }
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Claim(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ClaimError> for ValidationError {
    fn from(err: ClaimError) -> Self {
        Self::Claim(err)
    }
}

impl From<VerifyError> for ValidationError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::UnsupportedAlgorithm(alg) => Self::UnsupportedAlgorithm(alg),
            VerifyError::Claim(err) => Self::Claim(err),
        }
    }
}

/// Errors that can occur during token creation.
#[derive(Debug)]
#[non_exhaustive]
pub enum CreationError {
    /// Token header or payload cannot be serialized.
    Serialization(serde_json::Error),
    /// Signing key does not fit the algorithm.
    KeyMismatch {
        /// Algorithm name.
        algorithm: &'static str,
    },
    /// Crypto backend failed to produce a signature.
    Backend(anyhow::Error),
}

impl CreationError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Creation
    }
}

impl fmt::Display for CreationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialization(e) => write!(formatter, "cannot serialize token: {e}"),
            Self::KeyMismatch { algorithm } => {
                write!(formatter, "signing key cannot be used with {algorithm}")
            }
            Self::Backend(e) => write!(formatter, "cannot sign token: {e}"),
        }
    }
}

impl std::error::Error for CreationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialization(e) => Some(e),
            Self::Backend(e) => Some(e.as_ref()),
            Self::KeyMismatch { .. } => None,
        }
    }
}
