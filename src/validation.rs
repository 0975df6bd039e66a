//! Token validation: time claims, signature, audience and issuer.

use chrono::{DateTime, Utc};

use crate::{
    claims::{audience_claim, number_claim, string_claim, TimeOptions},
    verify::{verify, SignatureRule},
    Token, ValidationError,
};

/// Rule for the `iss` claim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum IssuerRule {
    /// Do not check the issuer.
    #[default]
    Skip,
    /// Issuer must be equal to the specified value.
    ExactlyOne(String),
    /// Issuer must be one of the specified values.
    AnyOf(Vec<String>),
}

impl IssuerRule {
    fn accepts(&self, issuer: Option<&str>) -> bool {
        match (self, issuer) {
            (Self::Skip, _) => true,
            (_, None) => false,
            (Self::ExactlyOne(expected), Some(issuer)) => expected == issuer,
            (Self::AnyOf(expected), Some(issuer)) => expected.iter().any(|iss| iss == issuer),
        }
    }
}

/// Rule for the `aud` claim. The claim is treated as a set of strings, which is empty
/// if the claim is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum AudienceRule {
    /// Do not check the audience.
    #[default]
    Skip,
    /// Audience must contain the specified value.
    ExactlyOne(String),
    /// Audience must contain at least one of the specified values.
    AnyOf(Vec<String>),
    /// Audience must contain all of the specified values.
    AllOf(Vec<String>),
}

impl AudienceRule {
    fn accepts(&self, audience: &[String]) -> bool {
        let contains = |expected: &String| audience.contains(expected);
        match self {
            Self::Skip => true,
            Self::ExactlyOne(expected) => contains(expected),
            Self::AnyOf(expected) => expected.iter().any(contains),
            Self::AllOf(expected) => expected.iter().all(contains),
        }
    }
}

/// Options for [`validate()`].
///
/// # Examples
///
/// ```
/// # use jwt_verifier::{
/// #     alg::VerificationKey, AudienceRule, IssuerRule, SignatureRule, ValidationOptions,
/// # };
/// let key = VerificationKey::symmetric(b"super_secret_key_donut_steel");
/// let options = ValidationOptions::new(SignatureRule::SingleKey(&key))
///     .with_issuer(IssuerRule::ExactlyOne("https://issuer.example.com".into()))
///     .with_audience(AudienceRule::AnyOf(vec!["api".into(), "admin".into()]));
/// assert!(options.expiration && options.not_before);
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ValidationOptions<'a, F = fn() -> DateTime<Utc>> {
    /// Check the `exp` claim, if present. Enabled by default.
    pub expiration: bool,
    /// Check the `nbf` claim, if present. Enabled by default.
    pub not_before: bool,
    /// Rule for the `iss` claim.
    pub issuer: IssuerRule,
    /// Rule for the `aud` claim.
    pub audience: AudienceRule,
    /// Rule for the token signature.
    pub signature: SignatureRule<'a>,
    /// Clock and leeway for time-based checks.
    pub time: TimeOptions<F>,
}

#[cfg(feature = "clock")]
impl<'a> ValidationOptions<'a> {
    /// Creates options with the specified signature rule. Both time-based checks
    /// are enabled with zero leeway, and issuer / audience checks are skipped.
    #[cfg_attr(docsrs, doc(cfg(feature = "clock")))]
    pub fn new(signature: SignatureRule<'a>) -> Self {
        Self::with_time_options(signature, TimeOptions::default())
    }
}

impl<'a, F: Fn() -> DateTime<Utc>> ValidationOptions<'a, F> {
    /// Creates options with the specified signature rule and time options.
    pub fn with_time_options(signature: SignatureRule<'a>, time: TimeOptions<F>) -> Self {
        Self {
            expiration: true,
            not_before: true,
            issuer: IssuerRule::Skip,
            audience: AudienceRule::Skip,
            signature,
            time,
        }
    }

    /// Enables or disables the `exp` check.
    #[must_use]
    pub fn with_expiration(mut self, check: bool) -> Self {
        self.expiration = check;
        self
    }

    /// Enables or disables the `nbf` check.
    #[must_use]
    pub fn with_not_before(mut self, check: bool) -> Self {
        self.not_before = check;
        self
    }

    /// Sets the issuer rule.
    #[must_use]
    pub fn with_issuer(mut self, rule: IssuerRule) -> Self {
        self.issuer = rule;
        self
    }

    /// Sets the audience rule.
    #[must_use]
    pub fn with_audience(mut self, rule: AudienceRule) -> Self {
        self.audience = rule;
        self
    }

    /// Sets the signature rule.
    #[must_use]
    pub fn with_signature(mut self, rule: SignatureRule<'a>) -> Self {
        self.signature = rule;
        self
    }

    /// Replaces time options, possibly changing the clock type.
    pub fn with_time<G>(self, time: TimeOptions<G>) -> ValidationOptions<'a, G>
    where
        G: Fn() -> DateTime<Utc>,
    {
        ValidationOptions {
            expiration: self.expiration,
            not_before: self.not_before,
            issuer: self.issuer,
            audience: self.audience,
            signature: self.signature,
            time,
        }
    }
}

/// Validates a `token`.
///
/// Checks are performed in the following order, and the first failed check determines
/// the returned error:
///
/// 1. Expiration (`exp` claim), if enabled and the claim is present.
/// 2. Maturity (`nbf` claim), if enabled and the claim is present.
/// 3. Signature, as per [`verify()`](crate::verify()).
/// 4. Audience (`aud` claim).
/// 5. Issuer (`iss` claim). If the issuer rule is not [`IssuerRule::Skip`], the claim
///    must be present.
///
/// # Errors
///
/// Returns an error describing the first failed check.
pub fn validate<F>(token: &Token, options: &ValidationOptions<'_, F>) -> Result<(), ValidationError>
where
    F: Fn() -> DateTime<Utc>,
{
    let payload = token.payload();

    if options.expiration {
        if let Some(expiration) = number_claim(payload, "exp")? {
            if options.time.is_expired(expiration) {
                tracing::debug!(expiration, "token has expired");
                return Err(ValidationError::Expired);
            }
        }
    }

    if options.not_before {
        if let Some(not_before) = number_claim(payload, "nbf")? {
            if options.time.is_premature(not_before) {
                tracing::debug!(not_before, "token is not yet valid");
                return Err(ValidationError::NotYetValid);
            }
        }
    }

    if !verify(token, &options.signature)? {
        tracing::debug!(
            algorithm = token.algorithm(),
            rule = ?options.signature,
            "token signature has failed verification"
        );
        return Err(ValidationError::InvalidSignature);
    }

    let audience = audience_claim(payload)?;
    let audience = audience.as_ref().map_or(&[][..], |aud| aud.as_slice());
    if !options.audience.accepts(audience) {
        tracing::debug!(?audience, rule = ?options.audience, "token audience is not accepted");
        return Err(ValidationError::AudienceMismatch);
    }

    let issuer = string_claim(payload, "iss")?;
    if !options.issuer.accepts(issuer) {
        tracing::debug!(issuer, rule = ?options.issuer, "token issuer is not accepted");
        return Err(ValidationError::IssuerMismatch);
    }

    Ok(())
}
