//! Unverified claim extraction from a bearer credential.
//!
//! The credential is a JWT issued by the API. Only the payload segment is read;
//! the signature is **never** checked. A decoded [`Session`] is advisory display
//! data and must not gate any authorization decision. The server re-validates the
//! credential on every request that carries it.

use std::fmt;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// base64url decoder that tolerates both padded and unpadded payloads.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Number of `.`-separated segments in a compact JWT.
const JWT_SEGMENTS: usize = 3;

/// Claim holding the subject identifier.
const SUBJECT_CLAIM: &str = "user_id";

/// Identifier of the signed-in user, as carried by the `user_id` claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Accepts a JSON number (the API issues numeric ids) or a non-empty string.
    fn from_claim(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(n.to_string())),
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.trim().to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded view of the current credential.
///
/// Recomputed on every read; there is no cached copy anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub subject_id: Option<SubjectId>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    /// Advisory `exp` claim. Never enforced client-side.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    fn from_claims(claims: &Map<String, Value>) -> Self {
        let text = |key: &str| {
            claims
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            subject_id: claims.get(SUBJECT_CLAIM).and_then(SubjectId::from_claim),
            name: text("name"),
            email: text("email"),
            role: text("role"),
            expires_at: claims
                .get("exp")
                .and_then(Value::as_i64)
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }

    /// Returns true if the advisory expiry lies in the past.
    pub fn looks_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

/// Why a credential could not be decoded.
///
/// Only surfaced by [`try_decode`]; [`decode`] absorbs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The credential did not have exactly three segments.
    SegmentCount(usize),
    /// The payload segment was not valid base64url.
    Base64,
    /// The payload was not valid JSON (or not UTF-8).
    Json,
    /// The payload was valid JSON but not an object.
    NotAnObject,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::SegmentCount(n) => {
                write!(f, "expected {JWT_SEGMENTS} segments, found {n}")
            }
            DecodeError::Base64 => write!(f, "payload is not valid base64url"),
            DecodeError::Json => write!(f, "payload is not valid JSON"),
            DecodeError::NotAnObject => write!(f, "payload is not a JSON object"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decodes the payload of `credential` without verifying its signature.
///
/// # Errors
/// Returns a [`DecodeError`] describing the first malformation found.
pub fn try_decode(credential: &str) -> Result<Session, DecodeError> {
    let parts: Vec<&str> = credential.trim().split('.').collect();
    if parts.len() != JWT_SEGMENTS {
        return Err(DecodeError::SegmentCount(parts.len()));
    }

    let bytes = PAYLOAD_ENGINE
        .decode(parts[1])
        .map_err(|_err| DecodeError::Base64)?;
    let payload: Value = serde_json::from_slice(&bytes).map_err(|_err| DecodeError::Json)?;
    let Value::Object(claims) = payload else {
        return Err(DecodeError::NotAnObject);
    };

    Ok(Session::from_claims(&claims))
}

/// Decodes the payload of `credential`, returning `None` on any malformation.
///
/// Never panics. See the module docs: the result is display data only.
pub fn decode(credential: &str) -> Option<Session> {
    match try_decode(credential) {
        Ok(session) => Some(session),
        Err(err) => {
            tracing::debug!(error = %err, "credential payload could not be decoded");
            None
        }
    }
}
