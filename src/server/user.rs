//! `GET /api/user`.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use super::AppState;
use crate::auth::{current_user_profile, UserProfile};

pub(super) async fn user_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<UserProfile> {
    Json(current_user_profile(state.auth.as_ref(), &headers).await)
}
