use std::collections::btree_map::{self, BTreeMap};

use coarsetime::{Clock, Duration, UnixTimeStamp};
use ct_codecs::{Base64UrlSafeNoPadding, Encoder};
use rand::RngCore;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::*;

pub const ISSUER: &str = "iss";
pub const SUBJECT: &str = "sub";
pub const AUDIENCE: &str = "aud";
pub const EXPIRES_AT: &str = "exp";
pub const INVALID_BEFORE: &str = "nbf";
pub const ISSUED_AT: &str = "iat";
pub const JWT_ID: &str = "jti";

/// Largest timestamp that can be represented, in seconds since the epoch
pub const MAX_TIMESTAMP_SECS: u64 = u32::MAX as u64;

/// A set of JWT claims.
///
/// Registered claims have typed accessors, but are stored alongside
/// application-defined claims and go through the same JSON encoding.
/// Keys are kept sorted, so that encoding is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims {
    claims: BTreeMap<String, Value>,
}

impl Claims {
    /// Create an empty set of claims.
    pub fn new() -> Self {
        Claims::default()
    }

    /// Create a new set of claims, issued now and expiring in `valid_for`.
    pub fn create(valid_for: Duration) -> Self {
        let now = Clock::now_since_epoch();
        Claims::new()
            .with_issued_at(now)
            .with_invalid_before(now)
            .with_expires_at(now + valid_for)
    }

    /// Decode claims from a JSON object.
    pub fn from_json(json: &[u8]) -> Result<Self, Error> {
        let claims: BTreeMap<String, Value> =
            serde_json::from_slice(json).map_err(|_| JoseError::MalformedClaims)?;
        Ok(Claims { claims })
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(&self.claims)?)
    }

    /// Get a read-only assertion view over these claims
    pub fn check(&self) -> ClaimsCheck<'_> {
        ClaimsCheck { claims: self }
    }

    /// Set a claim, replacing any previous value with the same name.
    pub fn set(&mut self, name: impl ToString, value: impl Serialize) -> Result<(), Error> {
        let value = serde_json::to_value(value)?;
        self.claims.insert(name.to_string(), value);
        Ok(())
    }

    /// Builder version of `set()`
    pub fn with(mut self, name: impl ToString, value: impl Serialize) -> Result<Self, Error> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Decode a claim as `T`; `None` if the claim is absent.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, Error> {
        match self.claims.get(name) {
            None => Ok(None),
            Some(value) => Ok(Some(
                serde_json::from_value(value.clone()).map_err(|_| JoseError::MalformedClaims)?,
            )),
        }
    }

    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.claims.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.claims.contains_key(name)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.claims.iter()
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    fn set_string(&mut self, name: &str, value: String) {
        self.claims.insert(name.to_string(), Value::String(value));
    }

    fn get_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    fn set_timestamp(&mut self, name: &str, unix_timestamp: UnixTimeStamp) {
        self.claims
            .insert(name.to_string(), Value::from(unix_timestamp.as_secs()));
    }

    /// Values beyond `MAX_TIMESTAMP_SECS` are clamped to it.
    fn get_timestamp(&self, name: &str) -> Option<UnixTimeStamp> {
        let value = self.claims.get(name)?;
        let secs = match value.as_u64() {
            Some(secs) => secs,
            // NumericDate values may be fractional
            None => value.as_f64().filter(|secs| *secs >= 0.0)? as u64,
        };
        Some(UnixTimeStamp::from_secs(secs.min(MAX_TIMESTAMP_SECS)))
    }

    /// Issuer ("iss")
    pub fn issuer(&self) -> Option<&str> {
        self.get_str(ISSUER)
    }

    pub fn set_issuer(&mut self, issuer: impl ToString) {
        self.set_string(ISSUER, issuer.to_string());
    }

    pub fn with_issuer(mut self, issuer: impl ToString) -> Self {
        self.set_issuer(issuer);
        self
    }

    /// Subject ("sub")
    pub fn subject(&self) -> Option<&str> {
        self.get_str(SUBJECT)
    }

    pub fn set_subject(&mut self, subject: impl ToString) {
        self.set_string(SUBJECT, subject.to_string());
    }

    pub fn with_subject(mut self, subject: impl ToString) -> Self {
        self.set_subject(subject);
        self
    }

    /// Audience ("aud"), when it is represented as a single string
    pub fn audience(&self) -> Option<&str> {
        self.get_str(AUDIENCE)
    }

    /// All audiences, whether "aud" is a string or an array of strings
    pub fn audiences(&self) -> Vec<&str> {
        match self.claims.get(AUDIENCE) {
            Some(Value::String(audience)) => vec![audience.as_str()],
            Some(Value::Array(audiences)) => audiences.iter().filter_map(Value::as_str).collect(),
            _ => vec![],
        }
    }

    pub fn set_audience(&mut self, audience: impl ToString) {
        self.set_string(AUDIENCE, audience.to_string());
    }

    pub fn with_audience(mut self, audience: impl ToString) -> Self {
        self.set_audience(audience);
        self
    }

    /// Set multiple audiences; they are encoded as an array
    pub fn with_audiences<I, S>(mut self, audiences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        let audiences = audiences
            .into_iter()
            .map(|audience| Value::String(audience.to_string()))
            .collect();
        self.claims
            .insert(AUDIENCE.to_string(), Value::Array(audiences));
        self
    }

    /// JWT identifier ("jti")
    pub fn jwt_id(&self) -> Option<&str> {
        self.get_str(JWT_ID)
    }

    pub fn set_jwt_id(&mut self, jwt_id: impl ToString) {
        self.set_string(JWT_ID, jwt_id.to_string());
    }

    pub fn with_jwt_id(mut self, jwt_id: impl ToString) -> Self {
        self.set_jwt_id(jwt_id);
        self
    }

    /// Create a random JWT identifier, attach it and return it
    pub fn create_jwt_id(&mut self) -> Result<&str, Error> {
        let mut raw_id = [0u8; 24];
        rand::thread_rng().fill_bytes(&mut raw_id);
        let jwt_id = Base64UrlSafeNoPadding::encode_to_string(raw_id)?;
        self.set_jwt_id(jwt_id);
        Ok(self.jwt_id().unwrap_or_default())
    }

    /// Expiration time ("exp")
    pub fn expires_at(&self) -> Option<UnixTimeStamp> {
        self.get_timestamp(EXPIRES_AT)
    }

    pub fn with_expires_at(mut self, unix_timestamp: UnixTimeStamp) -> Self {
        self.set_timestamp(EXPIRES_AT, unix_timestamp);
        self
    }

    /// Time the claims will be invalid until ("nbf")
    pub fn invalid_before(&self) -> Option<UnixTimeStamp> {
        self.get_timestamp(INVALID_BEFORE)
    }

    pub fn with_invalid_before(mut self, unix_timestamp: UnixTimeStamp) -> Self {
        self.set_timestamp(INVALID_BEFORE, unix_timestamp);
        self
    }

    /// Time the claims were created at ("iat")
    pub fn issued_at(&self) -> Option<UnixTimeStamp> {
        self.get_timestamp(ISSUED_AT)
    }

    pub fn with_issued_at(mut self, unix_timestamp: UnixTimeStamp) -> Self {
        self.set_timestamp(ISSUED_AT, unix_timestamp);
        self
    }
}

impl<'a> IntoIterator for &'a Claims {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.claims.iter()
    }
}

/// Boolean assertions over a set of claims.
///
/// Every assertion is `false` when the claim is missing.
#[derive(Debug, Clone, Copy)]
pub struct ClaimsCheck<'a> {
    claims: &'a Claims,
}

impl<'a> ClaimsCheck<'a> {
    /// The issuer is `expected`
    pub fn iss(&self, expected: &str) -> bool {
        self.claims.issuer() == Some(expected)
    }

    /// The subject is `expected`
    pub fn sub(&self, expected: &str) -> bool {
        self.claims.subject() == Some(expected)
    }

    /// `expected` is the audience, or one of the audiences
    pub fn aud(&self, expected: &str) -> bool {
        self.claims.audiences().contains(&expected)
    }

    /// The JWT identifier is `expected`
    pub fn jti(&self, expected: &str) -> bool {
        self.claims.jwt_id() == Some(expected)
    }

    /// The claims have an expiration time, and it is after `now`
    pub fn exp(&self, now: UnixTimeStamp) -> bool {
        matches!(self.claims.expires_at(), Some(expires_at) if now < expires_at)
    }

    /// The claims have a "not before" time, and it has been reached at `now`
    pub fn nbf(&self, now: UnixTimeStamp) -> bool {
        matches!(self.claims.invalid_before(), Some(invalid_before) if invalid_before <= now)
    }

    /// The claims have an issuance time that is not in the future of `now`
    pub fn iat(&self, now: UnixTimeStamp) -> bool {
        matches!(self.claims.issued_at(), Some(issued_at) if issued_at <= now)
    }

    /// An arbitrary claim equals `expected`
    pub fn claim(&self, name: &str, expected: &Value) -> bool {
        self.claims.get_value(name) == Some(expected)
    }

    pub fn has(&self, name: &str) -> bool {
        self.claims.contains(name)
    }
}
