//! Signed session tokens for authenticating clients of the REST API
//!
//! A [SessionToken] is issued on a successful login and identifies the authenticated user. It is
//! handed to the client as a string, consisting of the base64-encoded payload and its HMAC-SHA256
//! signature, separated by a dot. The signature is keyed with the application secret, such that
//! the server can verify the token's integrity without storing it.
//!
//! The token does not contain any privilege information. The user's current role is looked up in
//! the data store for each request (see
//! [crate::data_store::RoomReservationStoreFacade::get_auth_token_for_session]).

use crate::data_store::UserId;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use ring::hmac;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionToken {
    user_id: UserId,
    issued_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn new(user_id: UserId) -> Self {
        SessionToken {
            user_id,
            // Truncate to seconds, as we only encode full seconds
            issued_at: DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap_or_default(),
        }
    }

    /// Parse and verify a session token string, created by [Self::as_string] with the same
    /// `secret`.
    ///
    /// Tokens older than `max_age` are rejected with [SessionError::ExpiredToken].
    pub fn from_string(
        data: &str,
        secret: &str,
        max_age: std::time::Duration,
    ) -> Result<Self, SessionError> {
        let (payload_b64, signature_b64) =
            data.split_once('.').ok_or(SessionError::InvalidTokenFormat)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| SessionError::InvalidTokenFormat)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| SessionError::InvalidTokenFormat)?;
        hmac::verify(&signing_key(secret), &payload, &signature)
            .map_err(|_| SessionError::SignatureVerificationFailed)?;

        let payload = String::from_utf8(payload).map_err(|_| SessionError::InvalidTokenFormat)?;
        let (user_id, issued_at) = payload
            .split_once(':')
            .ok_or(SessionError::InvalidTokenFormat)?;
        let user_id: UserId = user_id
            .parse()
            .map_err(|_| SessionError::InvalidTokenFormat)?;
        let issued_at: i64 = issued_at
            .parse()
            .map_err(|_| SessionError::InvalidTokenFormat)?;
        let issued_at =
            DateTime::from_timestamp(issued_at, 0).ok_or(SessionError::InvalidTokenFormat)?;

        let max_age =
            chrono::Duration::from_std(max_age).map_err(|_| SessionError::InvalidTokenFormat)?;
        if issued_at + max_age < Utc::now() {
            return Err(SessionError::ExpiredToken);
        }

        Ok(SessionToken { user_id, issued_at })
    }

    /// Serialize and sign the token for handing it to the client.
    pub fn as_string(&self, secret: &str) -> String {
        let payload = format!("{}:{}", self.user_id, self.issued_at.timestamp());
        let signature = hmac::sign(&signing_key(secret), payload.as_bytes());
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(signature.as_ref())
        )
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

fn signing_key(secret: &str) -> hmac::Key {
    hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes())
}

#[derive(Debug)]
pub enum SessionError {
    InvalidTokenFormat,
    SignatureVerificationFailed,
    ExpiredToken,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::InvalidTokenFormat => f.write_str("Invalid session token format"),
            SessionError::SignatureVerificationFailed => {
                f.write_str("Session token signature is not valid")
            }
            SessionError::ExpiredToken => f.write_str("Session token has expired"),
        }
    }
}
