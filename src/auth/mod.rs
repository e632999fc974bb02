//! Caller identity.
//!
//! This module handles:
//! - Looking up the session for a request through an [`AuthProvider`]
//! - Deriving the user id, display name and avatar from that session
//!
//! Identity is always best-effort. When auth is not configured, or the
//! provider fails, the caller is treated as anonymous.

mod providers;

pub use providers::{AnonymousAuth, TrustedHeaderAuth};

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::Serialize;
use thiserror::Error;

/// Display name used when no session name is available.
pub const UNKNOWN_USER_NAME: &str = "?";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Auth is not configured")]
    NotConfigured,
    #[error("Invalid auth header {0}")]
    InvalidHeader(&'static str),
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Resolves the session behind a request.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Whether this provider can produce sessions at all.
    fn is_configured(&self) -> bool;

    /// Look up the session for a request's headers.
    async fn session(&self, headers: &HeaderMap) -> Result<Option<Session>, AuthError>;
}

/// Display name and avatar for the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub name: String,
    pub image: Option<String>,
}

async fn load_session(auth: &dyn AuthProvider, headers: &HeaderMap) -> Option<Session> {
    if !auth.is_configured() {
        return None;
    }

    match auth.session(headers).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load session");
            None
        }
    }
}

/// Get the current user id, or `None` for anonymous callers.
pub async fn current_user_id(auth: &dyn AuthProvider, headers: &HeaderMap) -> Option<String> {
    load_session(auth, headers).await.map(|s| s.user_id)
}

/// Get the current user's display name, or `"?"` when unknown.
pub async fn current_user_name(auth: &dyn AuthProvider, headers: &HeaderMap) -> String {
    load_session(auth, headers)
        .await
        .and_then(|s| s.full_name)
        .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string())
}

/// Get the current user's avatar URL, if any.
pub async fn current_user_image(auth: &dyn AuthProvider, headers: &HeaderMap) -> Option<String> {
    load_session(auth, headers).await.and_then(|s| s.avatar_url)
}

/// Get the display name and avatar with a single session lookup.
pub async fn current_user_profile(auth: &dyn AuthProvider, headers: &HeaderMap) -> UserProfile {
    let session = load_session(auth, headers).await;
    UserProfile {
        name: session
            .as_ref()
            .and_then(|s| s.full_name.clone())
            .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string()),
        image: session.and_then(|s| s.avatar_url),
    }
}
