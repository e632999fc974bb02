//! Model selection and catalog.
//!
//! This module handles:
//! - Provider enablement from environment configuration
//! - Default model selection
//! - Cookie-based model overrides
//! - Loading the model catalog from a remote document with a bundled fallback

pub mod catalog;
pub mod defaults;
pub mod registry;
pub mod selection;
pub mod types;
pub mod validate;

pub use catalog::{
    filter_enabled, models_url, parse_catalog, CatalogError, CatalogSource, ModelCatalog,
    MODELS_CONFIG_PATH,
};
pub use defaults::{default_model, fallback_model, DEFAULT_PROVIDER_PRIORITY};
pub use registry::ProviderRegistry;
pub use selection::{resolve_selection, ModelSelection};
pub use types::{Model, ModelConfigError, ToolCallType};
pub use validate::validate_model;
