//! Per-request model selection from cookies.
//!
//! The UI stores the user's choice in two cookies:
//! - `selectedModel`: a URL-encoded JSON [`Model`]
//! - `search-mode`: the literal string `"true"` or `"false"`
//!
//! Anything unusable in those cookies degrades to the default model and
//! search mode off. Resolution never fails.

use serde_json::Value;

use crate::cookies::CookieJar;

use super::defaults::default_model;
use super::registry::ProviderRegistry;
use super::types::{Model, ToolCallType};

/// Cookie holding the JSON-serialized model choice.
pub const SELECTED_MODEL_COOKIE: &str = "selectedModel";

/// Cookie holding the search mode flag.
pub const SEARCH_MODE_COOKIE: &str = "search-mode";

/// The model and mode a chat request should use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub model: Model,
    pub search_mode: bool,
}

/// Read a model from the decoded `selectedModel` cookie value.
///
/// Unlike catalog entries this is not validated: any JSON object is
/// accepted. String fields that are missing or not strings become empty,
/// `enabled` defaults to `true`, and any `toolCallType` other than
/// `"native"` means manual tool calling.
fn cookie_model(value: &Value) -> Option<Model> {
    let obj = value.as_object()?;
    let string = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let tool_call_type = match obj.get("toolCallType").and_then(Value::as_str) {
        Some("native") => ToolCallType::Native,
        _ => ToolCallType::Manual,
    };

    Some(Model {
        id: string("id"),
        name: string("name"),
        provider: string("provider"),
        provider_id: string("providerId"),
        enabled: obj.get("enabled").and_then(Value::as_bool).unwrap_or(true),
        tool_call_type,
        tool_call_model: obj
            .get("toolCallModel")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Resolve the model selection for a raw `Cookie` header.
///
/// A cookie-selected model is adopted as sent whenever its provider is
/// enabled. The model's own `enabled` flag is not consulted here, and the
/// default model is returned without a registry check; the chat handler
/// performs the authoritative provider check on whatever this returns.
pub fn resolve_selection(cookie_header: Option<&str>, registry: &ProviderRegistry) -> ModelSelection {
    let mut selection = ModelSelection {
        model: default_model(registry),
        search_mode: false,
    };

    let Some(header) = cookie_header else {
        return selection;
    };
    let cookies = CookieJar::parse(header);

    if let Some(raw) = cookies.get(SELECTED_MODEL_COOKIE) {
        match serde_json::from_str::<Value>(raw).map(|value| cookie_model(&value)) {
            Ok(Some(parsed)) if registry.is_provider_enabled(&parsed.provider_id) => {
                tracing::debug!(model = %parsed.id, provider = %parsed.provider_id, "Using cookie-selected model");
                selection.model = parsed;
            }
            Ok(Some(parsed)) => {
                tracing::warn!(
                    provider = %parsed.provider_id,
                    "Selected model provider is not enabled, using default model"
                );
            }
            Ok(None) => {
                tracing::error!("Selected model is not a JSON object");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse selected model");
            }
        }
    }

    selection.search_mode = cookies.get(SEARCH_MODE_COOKIE) == Some("true");
    selection
}
