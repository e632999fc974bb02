//! Chat request errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors a chat request can end with.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Chat is disabled on public share pages
    #[error("Chat API is not available on share pages")]
    SharePage,
    /// The selected model's provider has no credentials configured
    #[error("Selected provider is not enabled: {0}. Please check your environment variables and ensure the API key is set.")]
    ProviderDisabled(String),
    /// Anything unexpected; details are logged, never returned
    #[error("Error processing your request")]
    Internal(anyhow::Error),
}

impl ChatError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::SharePage => StatusCode::FORBIDDEN,
            Self::ProviderDisabled(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for ChatError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(e) => tracing::error!(error = ?e, "API route error"),
            Self::ProviderDisabled(provider) => {
                tracing::error!(provider = %provider, "Selected provider is not enabled")
            }
            Self::SharePage => tracing::debug!("Rejected chat request from share page"),
        }
        (self.status(), self.to_string()).into_response()
    }
}
