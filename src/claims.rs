//! Standard header fields and registered payload claims.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use std::slice;

use crate::{
    error::{ClaimError, ClaimShape},
    Fields,
};

/// Time-related validation options.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct TimeOptions<F = fn() -> DateTime<Utc>> {
    /// Leeway to use during validation.
    pub leeway: Duration,
    /// Source of the current timestamps.
    pub clock_fn: F,
}

impl<F: Fn() -> DateTime<Utc>> TimeOptions<F> {
    /// Creates options based on the specified time leeway and clock function.
    pub fn new(leeway: Duration, clock_fn: F) -> Self {
        Self { leeway, clock_fn }
    }

    /// Returns the current time as (possibly fractional) seconds since the Unix epoch.
    pub(crate) fn now_seconds(&self) -> f64 {
        let now = (self.clock_fn)();
        now.timestamp() as f64 + f64::from(now.timestamp_subsec_nanos()) / 1e9
    }

    fn leeway_seconds(&self) -> f64 {
        self.leeway.num_milliseconds() as f64 / 1_000.0
    }

    /// Checks whether a token with the specified `exp` claim is expired.
    /// A token expiring exactly at the current time is expired.
    pub(crate) fn is_expired(&self, expiration: f64) -> bool {
        self.now_seconds() >= expiration + self.leeway_seconds()
    }

    /// Checks whether a token with the specified `nbf` claim is not yet valid.
    pub(crate) fn is_premature(&self, not_before: f64) -> bool {
        self.now_seconds() < not_before - self.leeway_seconds()
    }
}

impl TimeOptions {
    /// Creates options based on the specified time leeway. The clock source is [`Utc::now()`].
    #[cfg(feature = "clock")]
    #[cfg_attr(docsrs, doc(cfg(feature = "clock")))]
    pub fn from_leeway(leeway: Duration) -> Self {
        Self {
            leeway,
            clock_fn: Utc::now,
        }
    }
}

/// Zero leeway and [`Utc::now()`] as the clock source.
#[cfg(feature = "clock")]
impl Default for TimeOptions {
    fn default() -> Self {
        Self::from_leeway(Duration::zero())
    }
}

/// Value of the `aud` claim: either a single string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Single audience (`"aud": "example.com"`).
    One(String),
    /// Several audiences (`"aud": ["a.example.com", "b.example.com"]`).
    Many(Vec<String>),
}

impl Audience {
    /// Returns audience members as a slice.
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::One(audience) => slice::from_ref(audience),
            Self::Many(audiences) => audiences,
        }
    }

    /// Checks whether the audience contains the specified member.
    pub fn contains(&self, member: &str) -> bool {
        self.as_slice().iter().any(|aud| aud == member)
    }
}

/// Typed projection of the registered JOSE header fields.
///
/// See [RFC 7515](https://www.rfc-editor.org/rfc/rfc7515.html#section-4.1) for the field
/// descriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct StandardHeader {
    /// Signing algorithm (`alg`).
    pub algorithm: String,
    /// Token type (`typ`).
    pub token_type: Option<String>,
    /// Content type (`cty`).
    pub content_type: Option<String>,
    /// Key ID (`kid`).
    pub key_id: Option<String>,
    /// URL of the X.509 certificate for the signing key (`x5u`).
    pub certificate_url: Option<String>,
    /// X.509 certificate chain for the signing key (`x5c`).
    pub certificate_chain: Option<Vec<String>>,
    /// Header extensions that must be understood by the recipient (`crit`).
    pub critical: Option<Vec<String>>,
}

/// Typed projection of the registered JWT claims.
///
/// Timestamps are normalized to seconds since the Unix epoch regardless of whether
/// they are encoded as integers or floats.
#[derive(Debug, Clone, Default, PartialEq)]
#[non_exhaustive]
pub struct StandardPayload {
    /// Issuer (`iss`).
    pub issuer: Option<String>,
    /// Subject (`sub`).
    pub subject: Option<String>,
    /// Audience (`aud`).
    pub audience: Option<Audience>,
    /// Expiration time (`exp`).
    pub expiration: Option<f64>,
    /// Time before which the token must not be accepted (`nbf`).
    pub not_before: Option<f64>,
    /// Issuance time (`iat`).
    pub issued_at: Option<f64>,
    /// Token ID (`jti`).
    pub jwt_id: Option<String>,
}

impl StandardPayload {
    /// Returns the expiration time as a date.
    pub fn expiration_date(&self) -> Option<DateTime<Utc>> {
        self.expiration.and_then(timestamp_to_date)
    }

    /// Returns the `nbf` claim as a date.
    pub fn not_before_date(&self) -> Option<DateTime<Utc>> {
        self.not_before.and_then(timestamp_to_date)
    }

    /// Returns the issuance time as a date.
    pub fn issued_at_date(&self) -> Option<DateTime<Utc>> {
        self.issued_at.and_then(timestamp_to_date)
    }
}

fn timestamp_to_date(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((seconds * 1_000.0).round() as i64)
}

/// Extracts the registered header fields. Unknown fields are ignored.
///
/// # Errors
///
/// Returns an error if `alg` is absent, or if a registered field has an unexpected type.
pub fn parse_standard_header(fields: &Fields) -> Result<StandardHeader, ClaimError> {
    let algorithm = string_claim(fields, "alg")?.ok_or(ClaimError::Missing("alg"))?;
    Ok(StandardHeader {
        algorithm: algorithm.to_owned(),
        token_type: string_claim(fields, "typ")?.map(str::to_owned),
        content_type: string_claim(fields, "cty")?.map(str::to_owned),
        key_id: string_claim(fields, "kid")?.map(str::to_owned),
        certificate_url: string_claim(fields, "x5u")?.map(str::to_owned),
        certificate_chain: string_array_claim(fields, "x5c")?,
        critical: string_array_claim(fields, "crit")?,
    })
}

/// Extracts the registered payload claims. Unknown claims are ignored.
///
/// # Errors
///
/// Returns an error if a registered claim has an unexpected type.
pub fn parse_standard_payload(fields: &Fields) -> Result<StandardPayload, ClaimError> {
    Ok(StandardPayload {
        issuer: string_claim(fields, "iss")?.map(str::to_owned),
        subject: string_claim(fields, "sub")?.map(str::to_owned),
        audience: audience_claim(fields)?,
        expiration: number_claim(fields, "exp")?,
        not_before: number_claim(fields, "nbf")?,
        issued_at: number_claim(fields, "iat")?,
        jwt_id: string_claim(fields, "jti")?.map(str::to_owned),
    })
}

pub(crate) fn string_claim<'a>(
    fields: &'a Fields,
    claim: &'static str,
) -> Result<Option<&'a str>, ClaimError> {
    match fields.get(claim) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(ClaimError::unexpected_type(claim, ClaimShape::String)),
    }
}

pub(crate) fn number_claim(fields: &Fields, claim: &'static str) -> Result<Option<f64>, ClaimError> {
    match fields.get(claim) {
        None => Ok(None),
        Some(Value::Number(value)) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| ClaimError::unexpected_type(claim, ClaimShape::Number)),
        Some(_) => Err(ClaimError::unexpected_type(claim, ClaimShape::Number)),
    }
}

fn string_array_claim(
    fields: &Fields,
    claim: &'static str,
) -> Result<Option<Vec<String>>, ClaimError> {
    match fields.get(claim) {
        None => Ok(None),
        Some(Value::Array(values)) => string_array(values)
            .map(Some)
            .ok_or_else(|| ClaimError::unexpected_type(claim, ClaimShape::StringArray)),
        Some(_) => Err(ClaimError::unexpected_type(claim, ClaimShape::StringArray)),
    }
}

fn string_array(values: &[Value]) -> Option<Vec<String>> {
    values
        .iter()
        .map(|value| value.as_str().map(str::to_owned))
        .collect()
}

/// Reads the `aud` claim. `null` is treated the same as an absent claim.
pub(crate) fn audience_claim(fields: &Fields) -> Result<Option<Audience>, ClaimError> {
    let err = || ClaimError::unexpected_type("aud", ClaimShape::StringOrArray);
    match fields.get("aud") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(audience)) => Ok(Some(Audience::One(audience.clone()))),
        Some(Value::Array(values)) => string_array(values)
            .map(|audiences| Some(Audience::Many(audiences)))
            .ok_or_else(err),
        Some(_) => Err(err()),
    }
}
