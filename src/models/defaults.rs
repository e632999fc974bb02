//! Default model selection.
//!
//! When a request carries no usable model preference, the first provider in
//! [`DEFAULT_PROVIDER_PRIORITY`] that the registry reports as enabled decides
//! the model.

use super::registry::ProviderRegistry;
use super::types::{Model, ToolCallType};

/// Providers probed for a default model, highest priority first.
pub const DEFAULT_PROVIDER_PRIORITY: &[&str] = &["google", "openai", "anthropic", "groq"];

/// Hardcoded default model for a provider in the priority list.
fn builtin_default(provider_id: &str) -> Option<Model> {
    let (id, name, provider, tool_call_type) = match provider_id {
        "google" => (
            "gemini-2.0-flash",
            "Gemini 2.0 Flash",
            "Google Generative AI",
            ToolCallType::Manual,
        ),
        "openai" => ("gpt-4o-mini", "GPT-4o mini", "OpenAI", ToolCallType::Native),
        "anthropic" => (
            "claude-3-5-haiku-20241022",
            "Claude 3.5 Haiku",
            "Anthropic",
            ToolCallType::Native,
        ),
        "groq" => (
            "meta-llama/llama-4-maverick-17b-128e-instruct",
            "Llama 4 Maverick 17B",
            "Groq",
            ToolCallType::Native,
        ),
        _ => return None,
    };

    Some(Model {
        id: id.to_string(),
        name: name.to_string(),
        provider: provider.to_string(),
        provider_id: provider_id.to_string(),
        enabled: true,
        tool_call_type,
        tool_call_model: None,
    })
}

/// The model returned when no priority provider is enabled.
///
/// This is not checked against the registry; the chat handler rejects it
/// when OpenAI is not configured either.
pub fn fallback_model() -> Model {
    Model {
        id: "gpt-4o-mini".to_string(),
        name: "GPT-4o mini".to_string(),
        provider: "OpenAI".to_string(),
        provider_id: "openai".to_string(),
        enabled: true,
        tool_call_type: ToolCallType::Native,
        tool_call_model: None,
    }
}

/// Pick the default model for the current provider configuration.
pub fn default_model(registry: &ProviderRegistry) -> Model {
    DEFAULT_PROVIDER_PRIORITY
        .iter()
        .find(|provider_id| registry.is_provider_enabled(provider_id))
        .and_then(|provider_id| builtin_default(provider_id))
        .unwrap_or_else(|| {
            tracing::debug!("No priority provider enabled, using fallback model");
            fallback_model()
        })
}
