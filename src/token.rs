//! `Token` and closely related types.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde_json::Value;
use smallvec::{smallvec, SmallVec};

use std::str::FromStr;

use crate::{
    alg::{SigningAlgorithm, SigningKey},
    claims::{parse_standard_header, parse_standard_payload, StandardHeader, StandardPayload},
    error::{ClaimError, CreationError, ParseError, TokenPart, ValidationError, VerifyError},
    validation::{validate, ValidationOptions},
    verify::{verify, SignatureRule},
    Fields,
};

/// Maximum "reasonable" signature size in bytes.
const SIGNATURE_SIZE: usize = 128;

fn encode_fields(fields: &Fields) -> Result<String, serde_json::Error> {
    Ok(Base64UrlUnpadded::encode_string(&fields.to_vec()?))
}

/// Header and payload of a token, without a signature.
///
/// This is the starting point for issuing tokens; see [`Self::sign()`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnsignedToken {
    header: Fields,
    payload: Fields,
}

impl UnsignedToken {
    /// Creates a token from the header and payload objects.
    pub fn new(header: Fields, payload: Fields) -> Self {
        Self { header, payload }
    }

    /// Gets the token header.
    pub fn header(&self) -> &Fields {
        &self.header
    }

    /// Gets the token payload.
    pub fn payload(&self) -> &Fields {
        &self.payload
    }

    /// Serializes this token into the `header.payload` text form (i.e., the signing input).
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        let header = encode_fields(&self.header)?;
        let payload = encode_fields(&self.payload)?;
        Ok(format!("{header}.{payload}"))
    }

    /// Same as [`Self::to_text()`], but returns bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        self.to_text().map(String::into_bytes)
    }

    /// Signs this token.
    ///
    /// The `alg` header field is set to the algorithm name: an existing field is replaced
    /// in place (with any duplicates removed), otherwise the field is inserted first.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not fit the algorithm, or if the crypto backend
    /// fails to produce a signature.
    pub fn sign(
        mut self,
        algorithm: SigningAlgorithm,
        signing_key: &SigningKey,
    ) -> Result<Token, CreationError> {
        self.header.set_unique("alg", algorithm.name());
        let message = self.to_text().map_err(CreationError::Serialization)?;
        let signature = algorithm.sign(signing_key, message.as_bytes())?;

        Ok(Token {
            unsigned: self,
            signature: SignatureInfo {
                algorithm: algorithm.name().to_owned(),
                value: SmallVec::from_vec(signature),
                message: message.into_bytes(),
            },
        })
    }
}

/// Signature-related information about a [`Token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    algorithm: String,
    value: SmallVec<[u8; SIGNATURE_SIZE]>,
    message: Vec<u8>,
}

impl SignatureInfo {
    /// Gets the algorithm name, as specified in the `alg` header field.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Returns signature bytes. These bytes are **not** guaranteed to form a valid signature.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Returns the signed message, i.e. the `header.payload` part of the token exactly as it
    /// was encountered during parsing or produced during signing.
    pub fn message(&self) -> &[u8] {
        &self.message
    }
}

/// Signed JSON web token.
///
/// A token can be obtained by [parsing](Self::parse()) its compact serialization
/// or by [signing](UnsignedToken::sign()) an [`UnsignedToken`]. Parsing does not check
/// the signature or any claims; use [`Self::validate()`] or [`Self::verify()`] for that.
///
/// # Examples
///
/// ```
/// # use jwt_verifier::Token;
/// # use serde_json::json;
/// let token: Token = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
///     eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiYWRtaW4iOnRydWUsImlhdCI6MTUxNjIzOTAyMn0.\
///     KMUFsIDTnFmyG3nMiGM6H9FNFUROf3wh7SmqJp-QV30"
///     .parse()?;
/// assert_eq!(token.algorithm(), "HS256");
/// assert_eq!(token.payload().get("admin"), Some(&json!(true)));
/// assert_eq!(token.standard_payload()?.subject.as_deref(), Some("1234567890"));
/// # Ok::<_, anyhow::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    unsigned: UnsignedToken,
    signature: SignatureInfo,
}

impl Token {
    /// Parses a token from its compact serialization.
    ///
    /// Token parts must be base64url-encoded without `=` padding; a padded part is
    /// reported as [`ParseError::InvalidBase64Encoding`].
    ///
    /// # Errors
    ///
    /// Returns an error if the token does not consist of 3 base64url-encoded parts,
    /// if the header or payload is not a UTF-8 encoded JSON object, or if the `alg` header
    /// field is missing, is not a string or occurs more than once.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let parts: Vec<_> = text.split('.').collect();
        let &[header_part, payload_part, signature_part] = parts.as_slice() else {
            return Err(ParseError::InvalidTokenStructure { parts: parts.len() });
        };

        let header = Base64UrlUnpadded::decode_vec(header_part)
            .map_err(|_| ParseError::InvalidBase64Encoding(TokenPart::Header))?;
        let payload = Base64UrlUnpadded::decode_vec(payload_part)
            .map_err(|_| ParseError::InvalidBase64Encoding(TokenPart::Payload))?;
        let header = Fields::from_slice(&header).map_err(|source| ParseError::Malformed {
            part: TokenPart::Header,
            source,
        })?;
        let payload = Fields::from_slice(&payload).map_err(|source| ParseError::Malformed {
            part: TokenPart::Payload,
            source,
        })?;

        let algorithm = match header.get("alg") {
            None => return Err(ParseError::MissingAlgorithm),
            Some(Value::String(algorithm)) => algorithm.clone(),
            Some(_) => return Err(ParseError::InvalidAlgorithm),
        };
        if header.count("alg") > 1 {
            return Err(ParseError::DuplicateAlgorithm);
        }

        let mut value: SmallVec<[u8; SIGNATURE_SIZE]> =
            smallvec![0; 3 * (signature_part.len() + 3) / 4];
        let signature_len = Base64UrlUnpadded::decode(signature_part, &mut value)
            .map_err(|_| ParseError::InvalidBase64Encoding(TokenPart::Signature))?
            .len();
        value.truncate(signature_len);

        let message_len = header_part.len() + 1 + payload_part.len();
        Ok(Self {
            unsigned: UnsignedToken::new(header, payload),
            signature: SignatureInfo {
                algorithm,
                value,
                message: text.as_bytes()[..message_len].to_vec(),
            },
        })
    }

    /// Gets the token header.
    pub fn header(&self) -> &Fields {
        &self.unsigned.header
    }

    /// Gets the token payload.
    pub fn payload(&self) -> &Fields {
        &self.unsigned.payload
    }

    /// Gets the algorithm name from the `alg` header field.
    pub fn algorithm(&self) -> &str {
        &self.signature.algorithm
    }

    /// Gets the header and payload of this token.
    pub fn unsigned(&self) -> &UnsignedToken {
        &self.unsigned
    }

    /// Gets the signature information.
    pub fn signature(&self) -> &SignatureInfo {
        &self.signature
    }

    /// Splits this token into the unsigned part and the signature information.
    pub fn into_parts(self) -> (UnsignedToken, SignatureInfo) {
        (self.unsigned, self.signature)
    }

    /// Extracts registered header fields.
    pub fn standard_header(&self) -> Result<StandardHeader, ClaimError> {
        parse_standard_header(self.header())
    }

    /// Extracts registered payload claims.
    pub fn standard_payload(&self) -> Result<StandardPayload, ClaimError> {
        parse_standard_payload(self.payload())
    }

    /// Serializes this token into the compact form.
    ///
    /// The header and payload are re-encoded as compact JSON, so the output coincides with
    /// the parsed text only if the original encoding was compact.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        let unsigned = self.unsigned.to_text()?;
        let signature = Base64UrlUnpadded::encode_string(&self.signature.value);
        Ok(format!("{unsigned}.{signature}"))
    }

    /// Same as [`Self::to_text()`], but returns bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        self.to_text().map(String::into_bytes)
    }

    /// Verifies the token signature. See [`verify()`](crate::verify()) for details.
    pub fn verify(&self, rule: &SignatureRule<'_>) -> Result<bool, VerifyError> {
        verify(self, rule)
    }

    /// Validates this token. See [`validate()`](crate::validate()) for details.
    pub fn validate<F>(&self, options: &ValidationOptions<'_, F>) -> Result<(), ValidationError>
    where
        F: Fn() -> chrono::DateTime<chrono::Utc>,
    {
        validate(self, options)
    }
}

impl TryFrom<&str> for Token {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl FromStr for Token {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    const HS256_TOKEN: &str = "eyJ0eXAiOiJKV1QiLA0KICJhbGciOiJIUzI1NiJ9.\
                               eyJpc3MiOiJqb2UiLA0KICJleHAiOjEzMDA4MTkzODAsDQogImh0dHA6Ly9leGFt\
                               cGxlLmNvbS9pc19yb290Ijp0cnVlfQ.\
                               dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
    const COMPACT_TOKEN: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
                                 eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiYWRtaW4iOnRy\
                                 dWUsImlhdCI6MTUxNjIzOTAyMn0.\
                                 KMUFsIDTnFmyG3nMiGM6H9FNFUROf3wh7SmqJp-QV30";

    fn replace_header(token: &str, header: &[u8]) -> String {
        let mut mangled_str = token.to_owned();
        let header = Base64UrlUnpadded::encode_string(header);
        mangled_str.replace_range(..mangled_str.find('.').unwrap(), &header);
        mangled_str
    }

    fn replace_payload(token: &str, payload: &[u8]) -> String {
        let mut mangled_str = token.to_owned();
        let payload_start = token.find('.').unwrap() + 1;
        let payload_end = token.rfind('.').unwrap();
        let payload = Base64UrlUnpadded::encode_string(payload);
        mangled_str.replace_range(payload_start..payload_end, &payload);
        mangled_str
    }

    #[test]
    fn parsing_token() {
        let token = Token::parse(HS256_TOKEN).unwrap();
        assert_eq!(token.algorithm(), "HS256");
        assert_eq!(token.header().get("typ"), Some(&json!("JWT")));
        assert_eq!(token.payload().get("iss"), Some(&json!("joe")));
        assert_eq!(token.payload().get("exp"), Some(&json!(1_300_819_380)));
        assert_eq!(token.signature().value().len(), 32);

        let message_end = HS256_TOKEN.rfind('.').unwrap();
        assert_eq!(
            token.signature().message(),
            HS256_TOKEN[..message_end].as_bytes()
        );

        let standard_header = token.standard_header().unwrap();
        assert_eq!(standard_header.algorithm, "HS256");
        assert_eq!(standard_header.token_type.as_deref(), Some("JWT"));
    }

    #[test]
    fn compact_token_round_trip() {
        let token: Token = COMPACT_TOKEN.parse().unwrap();
        assert_eq!(token.to_text().unwrap(), COMPACT_TOKEN);
        assert_eq!(token.to_bytes().unwrap(), COMPACT_TOKEN.as_bytes());
    }

    #[test]
    fn non_compact_token_is_reencoded() {
        let token = Token::parse(HS256_TOKEN).unwrap();
        let text = token.to_text().unwrap();
        assert_ne!(text, HS256_TOKEN);

        let reparsed = Token::parse(&text).unwrap();
        assert_eq!(reparsed.unsigned(), token.unsigned());
        assert_eq!(reparsed.signature().value(), token.signature().value());
        // The message always reflects the encoded text.
        assert_ne!(reparsed.signature().message(), token.signature().message());
    }

    #[test]
    fn invalid_token_structure() {
        let mangled_str = HS256_TOKEN.replace('.', "");
        assert_matches!(
            Token::parse(&mangled_str).unwrap_err(),
            ParseError::InvalidTokenStructure { parts: 1 }
        );

        let mut mangled_str = HS256_TOKEN.to_owned();
        let signature_start = mangled_str.rfind('.').unwrap();
        mangled_str.truncate(signature_start);
        assert_matches!(
            Token::parse(&mangled_str).unwrap_err(),
            ParseError::InvalidTokenStructure { parts: 2 }
        );

        let mut mangled_str = HS256_TOKEN.to_owned();
        mangled_str.push('.');
        assert_matches!(
            Token::parse(&mangled_str).unwrap_err(),
            ParseError::InvalidTokenStructure { parts: 4 }
        );

        assert_matches!(
            Token::parse("").unwrap_err(),
            ParseError::InvalidTokenStructure { parts: 1 }
        );
    }

    #[test]
    fn base64_error_during_parsing() {
        let mangled_str = HS256_TOKEN.replace('0', "+");
        assert_matches!(
            Token::parse(&mangled_str).unwrap_err(),
            ParseError::InvalidBase64Encoding(TokenPart::Header)
        );

        // Padding is not allowed in the compact serialization.
        let mangled_str = replace_payload(COMPACT_TOKEN, b"{}").replacen(".e30.", ".e30=.", 1);
        assert_matches!(
            Token::parse(&mangled_str).unwrap_err(),
            ParseError::InvalidBase64Encoding(TokenPart::Payload)
        );

        let mut mangled_str = HS256_TOKEN.to_owned();
        mangled_str.truncate(mangled_str.len() - 2);
        assert_matches!(
            Token::parse(&mangled_str).unwrap_err(),
            ParseError::InvalidBase64Encoding(TokenPart::Signature)
        );
    }

    #[test]
    fn malformed_header() {
        let mangled_headers: [&[u8]; 5] = [
            // Missing closing brace
            br#"{"alg":"HS256""#,
            // Not an object
            br#"["alg","HS256"]"#,
            b"null",
            // Invalid UTF-8
            b"{\"alg\":\"HS256\xff\"}",
            b"",
        ];

        for mangled_header in mangled_headers {
            let mangled_str = replace_header(HS256_TOKEN, mangled_header);
            assert_matches!(
                Token::parse(&mangled_str).unwrap_err(),
                ParseError::Malformed { part: TokenPart::Header, .. }
            );
        }
    }

    #[test]
    fn header_with_invalid_algorithm() {
        let mangled_str = replace_header(HS256_TOKEN, br#"{"typ":"JWT"}"#);
        assert_matches!(
            Token::parse(&mangled_str).unwrap_err(),
            ParseError::MissingAlgorithm
        );

        let headers: [&[u8]; 3] = [br#"{"alg":5}"#, br#"{"alg":[1,"foo"]}"#, br#"{"alg":null}"#];
        for header in headers {
            let mangled_str = replace_header(HS256_TOKEN, header);
            assert_matches!(
                Token::parse(&mangled_str).unwrap_err(),
                ParseError::InvalidAlgorithm
            );
        }

        let mangled_str = replace_header(HS256_TOKEN, br#"{"alg":"HS256","alg":"none"}"#);
        assert_matches!(
            Token::parse(&mangled_str).unwrap_err(),
            ParseError::DuplicateAlgorithm
        );
    }

    #[test]
    fn malformed_payload() {
        let payloads: [&[u8]; 3] = [br#"{"exp":1500000000"#, b"[]", b"\"claims\""];
        for payload in payloads {
            let mangled_str = replace_payload(HS256_TOKEN, payload);
            assert_matches!(
                Token::parse(&mangled_str).unwrap_err(),
                ParseError::Malformed { part: TokenPart::Payload, .. }
            );
        }
    }

    #[test]
    fn duplicate_claims_are_preserved() {
        let payload = br#"{"exp":1500000000,"nbf":1400000000,"exp":1510000000}"#;
        let mangled_str = replace_payload(COMPACT_TOKEN, payload);
        let token = Token::parse(&mangled_str).unwrap();
        assert_eq!(token.payload().len(), 3);
        assert_eq!(token.payload().get("exp"), Some(&json!(1_500_000_000)));
        assert_eq!(token.to_text().unwrap(), mangled_str);

        let (unsigned, signature) = token.into_parts();
        assert_eq!(unsigned.payload().count("exp"), 2);
        assert_eq!(signature.algorithm(), "HS256");
        assert_eq!(signature.message(), unsigned.to_bytes().unwrap());
    }

    #[test]
    fn signing_sets_algorithm() {
        let key = SigningKey::symmetric(b"super_secret_key_donut_steel");
        let header = Fields::new().with("typ", "JWT");
        let payload = Fields::new().with("sub", "alice");
        let token = UnsignedToken::new(header, payload)
            .sign(SigningAlgorithm::Hs256, &key)
            .unwrap();

        assert_eq!(token.algorithm(), "HS256");
        assert_eq!(token.header().to_string(), r#"{"alg":"HS256","typ":"JWT"}"#);
        assert_eq!(token.signature().message(), token.unsigned().to_bytes().unwrap());

        let text = token.to_text().unwrap();
        assert_eq!(Token::parse(&text).unwrap(), token);
    }

    #[test]
    fn signing_replaces_existing_algorithm() {
        let key = SigningKey::symmetric(b"super_secret_key_donut_steel");
        let header = Fields::from_slice(br#"{"typ":"JWT","alg":"none","alg":"RS256"}"#).unwrap();
        let token = UnsignedToken::new(header, Fields::new())
            .sign(SigningAlgorithm::Hs512, &key)
            .unwrap();
        assert_eq!(token.header().to_string(), r#"{"typ":"JWT","alg":"HS512"}"#);
        assert_eq!(token.signature().value().len(), 64);

        let text = token.to_text().unwrap();
        assert_eq!(Token::parse(&text).unwrap(), token);
    }

    #[test]
    fn signing_with_mismatched_key() {
        let key = SigningKey::symmetric(b"secret");
        let err = UnsignedToken::default()
            .sign(SigningAlgorithm::EdDsa, &key)
            .unwrap_err();
        assert_matches!(err, CreationError::KeyMismatch { algorithm: "EdDSA" });
    }
}
