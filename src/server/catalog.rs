//! `GET /api/models`.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use super::base_url::resolve_base_url;
use super::AppState;
use crate::models::{filter_enabled, CatalogSource, Model};

#[derive(Debug, Serialize)]
pub(super) struct ModelsResponse {
    models: Vec<Model>,
}

pub(super) async fn models_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<ModelsResponse> {
    let base_url = resolve_base_url(
        state.base_url.as_ref(),
        &headers,
        state.trusted_proxy_headers,
    );
    let models = match base_url {
        Some(base_url) => state.catalog.get_models(&base_url, &state.registry).await,
        None => {
            let bundled = state.catalog.load(&[CatalogSource::bundled()]).await;
            filter_enabled(bundled, &state.registry)
        }
    };

    Json(ModelsResponse { models })
}
