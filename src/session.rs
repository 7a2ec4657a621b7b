//! Stateless session tokens.
//!
//! A token is `base64url(json payload) + "." + base64url(HMAC-SHA256 signature)`,
//! where the signature is computed over the encoded payload with the server
//! secret. Nothing about a session is stored on the server: a token is valid
//! if its signature verifies and its expiry has not passed.

use std::fmt::Debug;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use time::{Duration, OffsetDateTime};

use crate::{Error, timestamp::to_millis, user::UserID};

type HmacSha256 = Hmac<Sha256>;

/// How long a session lasts after logging in.
pub const SESSION_DURATION: Duration = Duration::days(7);

const SEPARATOR: char = '.';

/// The secret key used to sign and verify session tokens.
#[derive(Clone)]
pub struct SessionKey {
    mac: HmacSha256,
}

impl SessionKey {
    /// Create a signing key from the server secret.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingSecret] if `secret` is empty or only whitespace.
    /// There is no fallback secret.
    pub fn new(secret: &str) -> Result<Self, Error> {
        if secret.trim().is_empty() {
            return Err(Error::MissingSecret);
        }

        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| Error::MissingSecret)?;

        Ok(Self { mac })
    }

    fn sign(&self, encoded_payload: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(encoded_payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    /// Checks `signature` against the expected signature in constant time.
    fn verify(&self, encoded_payload: &str, signature: &[u8]) -> bool {
        let mut mac = self.mac.clone();
        mac.update(encoded_payload.as_bytes());
        mac.verify_slice(signature).is_ok()
    }
}

impl Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(********)")
    }
}

/// The contents of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    /// The logged in user.
    pub user_id: UserID,
    /// When the session expires, in milliseconds since the Unix epoch.
    pub exp: i64,
}

/// The token was rejected.
///
/// Deliberately carries no reason: callers cannot tell a forged token from an
/// expired or malformed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid session token")]
pub struct InvalidSession;

/// Create a session token for `user_id` that expires [SESSION_DURATION] from now.
///
/// # Errors
///
/// Returns [Error::JSONSerializationError] if the payload could not be serialized.
pub fn create_token(user_id: UserID, key: &SessionKey) -> Result<String, Error> {
    create_token_at(user_id, key, OffsetDateTime::now_utc())
}

/// Create a session token for `user_id` that expires [SESSION_DURATION] after `now`.
pub fn create_token_at(
    user_id: UserID,
    key: &SessionKey,
    now: OffsetDateTime,
) -> Result<String, Error> {
    let payload = SessionPayload {
        user_id,
        exp: to_millis(now + SESSION_DURATION),
    };

    let json = serde_json::to_vec(&payload)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;
    let encoded_payload = URL_SAFE_NO_PAD.encode(json);
    let signature = URL_SAFE_NO_PAD.encode(key.sign(&encoded_payload));

    Ok(format!("{encoded_payload}{SEPARATOR}{signature}"))
}

/// Check that `token` was signed with `key` and has not expired.
pub fn verify_token(token: &str, key: &SessionKey) -> Result<SessionPayload, InvalidSession> {
    verify_token_at(token, key, OffsetDateTime::now_utc())
}

/// Check that `token` was signed with `key` and has not expired as of `now`.
pub fn verify_token_at(
    token: &str,
    key: &SessionKey,
    now: OffsetDateTime,
) -> Result<SessionPayload, InvalidSession> {
    let (encoded_payload, encoded_signature) = split_token(token).ok_or_else(|| {
        tracing::debug!("Rejected session token: malformed");
        InvalidSession
    })?;

    let signature = URL_SAFE_NO_PAD.decode(encoded_signature).map_err(|_| {
        tracing::debug!("Rejected session token: signature is not base64");
        InvalidSession
    })?;

    if !key.verify(encoded_payload, &signature) {
        tracing::debug!("Rejected session token: signature mismatch");
        return Err(InvalidSession);
    }

    let payload: SessionPayload = URL_SAFE_NO_PAD
        .decode(encoded_payload)
        .ok()
        .and_then(|json| serde_json::from_slice(&json).ok())
        .ok_or_else(|| {
            tracing::debug!("Rejected session token: invalid payload");
            InvalidSession
        })?;

    if payload.exp < to_millis(now) {
        tracing::debug!("Rejected session token: expired");
        return Err(InvalidSession);
    }

    Ok(payload)
}

fn split_token(token: &str) -> Option<(&str, &str)> {
    let (encoded_payload, signature) = token.split_once(SEPARATOR)?;

    if encoded_payload.is_empty() || signature.is_empty() || signature.contains(SEPARATOR) {
        return None;
    }

    Some((encoded_payload, signature))
}
