//! Provider registry.
//!
//! This module provides `ProviderRegistry`, a read-only snapshot of which
//! model providers have credentials configured. It is resolved once from the
//! process environment and then shared by every request.

use std::collections::BTreeMap;

/// Provider ids and the environment variables that must all be set for them.
const PROVIDER_REQUIREMENTS: &[(&str, &[&str])] = &[
    ("openai", &["OPENAI_API_KEY"]),
    ("anthropic", &["ANTHROPIC_API_KEY"]),
    ("google", &["GOOGLE_GENERATIVE_AI_API_KEY"]),
    ("groq", &["GROQ_API_KEY"]),
    ("ollama", &["OLLAMA_BASE_URL"]),
    ("azure", &["AZURE_API_KEY", "AZURE_RESOURCE_NAME"]),
    ("deepseek", &["DEEPSEEK_API_KEY"]),
    ("fireworks", &["FIREWORKS_API_KEY"]),
    ("xai", &["XAI_API_KEY"]),
    (
        "openai-compatible",
        &["OPENAI_COMPATIBLE_API_KEY", "OPENAI_COMPATIBLE_API_BASE_URL"],
    ),
];

/// Snapshot of provider enablement, keyed by provider id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, bool>,
}

impl ProviderRegistry {
    /// Create a registry with every provider disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve provider enablement from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve provider enablement through an arbitrary variable lookup.
    ///
    /// A variable counts as set only when it is present and non-empty.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let has_var = |key: &str| lookup(key).is_some_and(|value| !value.is_empty());

        let providers = PROVIDER_REQUIREMENTS
            .iter()
            .map(|(provider, vars)| {
                let enabled = vars.iter().all(|var| has_var(*var));
                tracing::debug!(provider = %provider, enabled, "Provider availability check");
                (provider.to_string(), enabled)
            })
            .collect();

        Self { providers }
    }

    /// Build a registry where exactly the given providers are enabled.
    pub fn with_enabled<I, S>(enabled: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            providers: enabled.into_iter().map(|id| (id.into(), true)).collect(),
        }
    }

    /// Check if a provider is enabled. Unknown providers are never enabled.
    pub fn is_provider_enabled(&self, provider_id: &str) -> bool {
        self.providers.get(provider_id).copied().unwrap_or(false)
    }

    /// List enabled provider ids in sorted order.
    pub fn enabled_providers(&self) -> Vec<&str> {
        self.providers
            .iter()
            .filter(|(_, enabled)| **enabled)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Provider ids this service knows how to configure.
    pub fn known_providers() -> impl Iterator<Item = &'static str> {
        PROVIDER_REQUIREMENTS.iter().map(|(id, _)| *id)
    }
}
