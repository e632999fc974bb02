//! Model catalog loading.
//!
//! The catalog is read from an ordered list of sources. The first source
//! whose document passes validation wins:
//! 1. `{base_url}/config/models.json`, fetched without caching
//! 2. The `models.json` document bundled into the binary
//!
//! If no source passes, the catalog is empty. The winning list is then
//! filtered down to models that are both author-enabled and served by an
//! enabled provider.

use reqwest::header::{ACCEPT, CACHE_CONTROL};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use super::registry::ProviderRegistry;
use super::types::{Model, ModelConfigError};
use super::validate::validate_model;

/// Path of the remote catalog document, relative to the base URL.
pub const MODELS_CONFIG_PATH: &str = "/config/models.json";

/// Catalog document bundled at compile time, used when the remote fetch fails.
const BUNDLED_MODELS_JSON: &str = include_str!("default-models.json");

/// Errors that can occur while reading a catalog source.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP error! status: {0}")]
    Status(reqwest::StatusCode),
    #[error(transparent)]
    Config(#[from] ModelConfigError),
}

/// A place a catalog document can be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// A document served over HTTP
    Remote(Url),
    /// A document compiled into the binary
    Bundled(&'static str),
}

impl CatalogSource {
    /// The document shipped with this binary.
    pub fn bundled() -> Self {
        Self::Bundled(BUNDLED_MODELS_JSON)
    }

    /// Short label for log output.
    pub fn label(&self) -> &str {
        match self {
            Self::Remote(url) => url.as_str(),
            Self::Bundled(_) => "bundled",
        }
    }
}

/// Build the remote catalog URL for a base URL.
pub fn models_url(base_url: &Url) -> Result<Url, url::ParseError> {
    base_url.join(MODELS_CONFIG_PATH)
}

/// Check whether a response body is an HTML page rather than JSON.
fn looks_like_html(text: &str) -> bool {
    let trimmed = text.trim().as_bytes();
    let prefix = b"<!doctype";
    trimmed.len() >= prefix.len() && trimmed[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// Parse and validate a catalog document.
///
/// The document must be a JSON object whose `models` key is an array in
/// which every entry passes [`validate_model`]. One bad entry rejects the
/// whole document.
pub fn parse_catalog(text: &str) -> Result<Vec<Model>, ModelConfigError> {
    if looks_like_html(text) {
        return Err(ModelConfigError::HtmlDocument);
    }

    let config: Value = serde_json::from_str(text)?;
    let entries = config
        .get("models")
        .filter(|models| {
            models
                .as_array()
                .is_some_and(|entries| entries.iter().all(validate_model))
        })
        .ok_or(ModelConfigError::InvalidFormat)?;

    Ok(Vec::<Model>::deserialize(entries)?)
}

/// Keep models that are author-enabled and whose provider is enabled.
pub fn filter_enabled(models: Vec<Model>, registry: &ProviderRegistry) -> Vec<Model> {
    let total = models.len();

    let enabled: Vec<Model> = models
        .into_iter()
        .filter(|model| {
            let provider_enabled = registry.is_provider_enabled(&model.provider_id);
            if !provider_enabled {
                tracing::debug!(
                    provider = %model.provider_id,
                    model = %model.name,
                    "Provider is not enabled, skipping model"
                );
            }
            provider_enabled && model.enabled
        })
        .collect();

    tracing::info!(
        enabled = enabled.len(),
        total,
        "Returning enabled models"
    );

    enabled
}

/// Loads model catalogs over HTTP with a bundled fallback.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    client: reqwest::Client,
}

impl ModelCatalog {
    /// Create a catalog loader with a default HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog loader that reuses an existing HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// The standard source chain for a base URL: remote, then bundled.
    pub fn default_sources(base_url: &Url) -> Vec<CatalogSource> {
        let mut sources = Vec::with_capacity(2);
        match models_url(base_url) {
            Ok(url) => sources.push(CatalogSource::Remote(url)),
            Err(e) => tracing::warn!(base_url = %base_url, error = %e, "Invalid catalog URL"),
        }
        sources.push(CatalogSource::bundled());
        sources
    }

    /// Load the enabled models for a base URL.
    ///
    /// Never fails: a broken remote document falls back to the bundled one,
    /// and a broken bundled document yields an empty list.
    pub async fn get_models(&self, base_url: &Url, registry: &ProviderRegistry) -> Vec<Model> {
        let models = self.load(&Self::default_sources(base_url)).await;
        filter_enabled(models, registry)
    }

    /// Return the models of the first source that passes validation.
    pub async fn load(&self, sources: &[CatalogSource]) -> Vec<Model> {
        for source in sources {
            match self.read_source(source).await {
                Ok(models) => {
                    tracing::info!(
                        source = %source.label(),
                        count = models.len(),
                        "Successfully loaded models"
                    );
                    return models;
                }
                Err(e) => {
                    tracing::warn!(
                        source = %source.label(),
                        error = %e,
                        "Failed to load models, trying next source"
                    );
                }
            }
        }

        tracing::warn!("No valid model catalog found, returning empty list");
        Vec::new()
    }

    async fn read_source(&self, source: &CatalogSource) -> Result<Vec<Model>, CatalogError> {
        let text = match source {
            CatalogSource::Remote(url) => self.fetch_text(url).await?,
            CatalogSource::Bundled(text) => (*text).to_string(),
        };
        Ok(parse_catalog(&text)?)
    }

    async fn fetch_text(&self, url: &Url) -> Result<String, CatalogError> {
        tracing::debug!(url = %url, "Fetching models");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status));
        }

        Ok(response.text().await?)
    }
}
