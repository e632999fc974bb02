//! Core model type definitions.
//!
//! This module provides the fundamental types for model selection:
//! - `ModelConfigError` - Errors that can occur while loading model documents
//! - `ToolCallType` - How a model performs tool calling
//! - `Model` - A selectable model record

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or decoding model configuration.
#[derive(Debug, Error)]
pub enum ModelConfigError {
    #[error("Failed to parse model document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Received HTML instead of JSON")]
    HtmlDocument,
    #[error("Invalid model configuration format")]
    InvalidFormat,
}

/// How a model performs tool calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallType {
    /// The provider API supports structured tool calls directly
    Native,
    /// Tool calls are emulated through prompt orchestration
    Manual,
}

impl ToolCallType {
    /// Parse the wire representation (`"native"` / `"manual"`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "native" => Some(Self::Native),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

impl std::fmt::Display for ToolCallType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolCallType::Native => write!(f, "native"),
            ToolCallType::Manual => write!(f, "manual"),
        }
    }
}

/// A selectable model.
///
/// Serialized with camelCase keys, which is the shape used by both the
/// `selectedModel` cookie and the `models.json` catalog documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Model identifier passed to the inference API
    pub id: String,
    /// Human-readable display name
    pub name: String,
    /// Human-readable provider name
    pub provider: String,
    /// Key used to query the provider registry
    pub provider_id: String,
    /// Author-declared availability flag
    pub enabled: bool,
    /// Which streaming responder handles requests for this model
    pub tool_call_type: ToolCallType,
    /// Alternate model id used specifically for tool calling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_model: Option<String>,
}

impl Model {
    /// Get the model id to use for tool-calling requests.
    pub fn effective_tool_call_model(&self) -> &str {
        self.tool_call_model.as_deref().unwrap_or(&self.id)
    }
}
