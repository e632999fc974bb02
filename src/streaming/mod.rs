//! Streaming responders.
//!
//! A chat request is answered by one of two responders, chosen by the
//! selected model's [`ToolCallType`]. Responders own inference and
//! streaming; the chat route only hands them a [`StreamContext`].

use std::convert::Infallible;

use async_trait::async_trait;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures::stream;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ChatError;
use crate::models::{Model, ToolCallType};

/// A chat message as sent by the client.
///
/// The message is kept exactly as received. Accessors read the common
/// fields without requiring them to be present or well-typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatMessage(Value);

impl ChatMessage {
    /// The `role` field, if it is a string.
    pub fn role(&self) -> Option<&str> {
        self.0.get("role").and_then(Value::as_str)
    }

    /// The `content` field, if present.
    pub fn content(&self) -> Option<&Value> {
        self.0.get("content")
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for ChatMessage {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Everything a responder needs to answer one chat request.
#[derive(Debug, Clone)]
pub struct StreamContext {
    pub messages: Vec<ChatMessage>,
    pub model: Model,
    pub chat_id: String,
    pub search_mode: bool,
    pub user_id: Option<String>,
}

/// Produces the streamed response for a chat request.
#[async_trait]
pub trait StreamResponder: Send + Sync {
    async fn respond(&self, ctx: StreamContext) -> Result<Response, ChatError>;
}

/// Answers with a `text/event-stream` that announces the dispatch.
///
/// Emits a `start` event describing the request (chat id, model, tool-call
/// model, mode and search flag) and then a `finish` event. Inference
/// engines replace this by implementing [`StreamResponder`].
#[derive(Debug, Clone, Copy)]
pub struct EventStreamResponder {
    mode: ToolCallType,
}

impl EventStreamResponder {
    pub fn new(mode: ToolCallType) -> Self {
        Self { mode }
    }

    /// Responder for models with native tool calling.
    pub fn native() -> Self {
        Self::new(ToolCallType::Native)
    }

    /// Responder for models that emulate tool calling.
    pub fn manual() -> Self {
        Self::new(ToolCallType::Manual)
    }

    fn start_payload(&self, ctx: &StreamContext) -> Value {
        json!({
            "chatId": ctx.chat_id,
            "model": ctx.model.id,
            "provider": ctx.model.provider_id,
            "toolCallModel": ctx.model.effective_tool_call_model(),
            "mode": self.mode,
            "searchMode": ctx.search_mode,
            "messages": ctx.messages.len(),
        })
    }
}

#[async_trait]
impl StreamResponder for EventStreamResponder {
    async fn respond(&self, ctx: StreamContext) -> Result<Response, ChatError> {
        tracing::debug!(
            chat_id = %ctx.chat_id,
            model = %ctx.model.id,
            mode = %self.mode,
            search_mode = ctx.search_mode,
            "Starting event stream"
        );

        let start = Event::default()
            .event("start")
            .json_data(self.start_payload(&ctx))
            .map_err(|e| ChatError::Internal(e.into()))?;
        let finish = Event::default()
            .event("finish")
            .json_data(json!({ "chatId": ctx.chat_id }))
            .map_err(|e| ChatError::Internal(e.into()))?;

        let events = stream::iter([Ok::<_, Infallible>(start), Ok(finish)]);
        Ok(Sse::new(events).into_response())
    }
}
