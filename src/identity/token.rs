//! Unverified access-token inspection.
//!
//! The payload segment of the JWT is decoded to read the subject and expiry. No
//! signature check happens here; the remote API remains the authority.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::principal::UserIdentity;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPayload {
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

impl TokenPayload {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool { self.exp < now.timestamp() }
}

pub fn decode_payload(token: &str) -> AppResult<TokenPayload> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload)) = (parts.next(), parts.next()) else {
        return Err(AppError::auth("token_malformed", "token has no payload segment"));
    };
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AppError::auth("token_malformed".to_string(), format!("payload is not base64url: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::auth("token_malformed".to_string(), format!("payload is not a token claim set: {}", e)))
}

/// True when the token is past `exp`, or cannot be decoded at all.
pub fn is_token_expired(token: &str, now: DateTime<Utc>) -> bool {
    match decode_payload(token) {
        Ok(p) => p.is_expired_at(now),
        Err(_) => true,
    }
}

/// Identity carried by a decodable, unexpired token.
pub fn identity_from_token(token: &str, now: DateTime<Utc>) -> Option<UserIdentity> {
    match decode_payload(token) {
        Ok(p) if !p.is_expired_at(now) => Some(UserIdentity::new(p.sub, p.email)),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "token.decode_failed");
            None
        }
    }
}

#[cfg(test)]
pub(crate) fn encode_for_test(payload: &serde_json::Value) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    format!(
        "{}.{}.sig",
        engine.encode(br#"{"alg":"HS256","typ":"JWT"}"#),
        engine.encode(payload.to_string().as_bytes())
    )
}
