//! Shipped [`AuthProvider`] implementations.

use async_trait::async_trait;
use axum::http::HeaderMap;

use super::{AuthError, AuthProvider, Session};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";
pub const USER_AVATAR_HEADER: &str = "x-user-avatar";

/// Treats every caller as anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousAuth;

#[async_trait]
impl AuthProvider for AnonymousAuth {
    fn is_configured(&self) -> bool {
        false
    }

    async fn session(&self, _headers: &HeaderMap) -> Result<Option<Session>, AuthError> {
        Err(AuthError::NotConfigured)
    }
}

/// Reads identity from headers set by a fronting auth proxy.
///
/// Only enable this when the proxy strips these headers from client
/// requests; otherwise any caller can claim any identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustedHeaderAuth;

fn header_value(headers: &HeaderMap, name: &'static str) -> Result<Option<String>, AuthError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|s| Some(s.trim().to_string()).filter(|s| !s.is_empty()))
            .map_err(|_| AuthError::InvalidHeader(name)),
    }
}

#[async_trait]
impl AuthProvider for TrustedHeaderAuth {
    fn is_configured(&self) -> bool {
        true
    }

    async fn session(&self, headers: &HeaderMap) -> Result<Option<Session>, AuthError> {
        let Some(user_id) = header_value(headers, USER_ID_HEADER)? else {
            return Ok(None);
        };

        Ok(Some(Session {
            user_id,
            full_name: header_value(headers, USER_NAME_HEADER)?,
            avatar_url: header_value(headers, USER_AVATAR_HEADER)?,
        }))
    }
}
