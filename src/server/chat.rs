//! `POST /api/chat`.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{COOKIE, REFERER};
use axum::http::HeaderMap;
use axum::response::Response;
use serde_json::Value;

use super::AppState;
use crate::auth::current_user_id;
use crate::error::ChatError;
use crate::models::{resolve_selection, ModelSelection};
use crate::streaming::{ChatMessage, StreamContext};

/// Chat request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub id: Option<String>,
}

impl ChatRequest {
    /// Read `messages` and `id` from a request body.
    ///
    /// Only a body that is not JSON at all degrades to an empty request.
    /// Otherwise each field is read on its own: messages are kept as sent,
    /// a numeric `id` is used in its decimal form, and a field of any other
    /// shape is dropped without affecting the other one.
    pub fn from_body(body: &[u8]) -> Self {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid chat request body, using defaults");
                return Self::default();
            }
        };

        let messages = match value.get("messages") {
            Some(Value::Array(items)) => items.iter().cloned().map(ChatMessage::from).collect(),
            None | Some(Value::Null) => Vec::new(),
            Some(_) => {
                tracing::warn!("Chat request messages is not an array, ignoring it");
                Vec::new()
            }
        };

        let id = match value.get("id") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            None | Some(Value::Null) => None,
            Some(_) => {
                tracing::warn!("Chat request id is not a string, ignoring it");
                None
            }
        };

        Self { messages, id }
    }
}

/// Check whether a request comes from a public share page.
pub fn is_share_page(headers: &HeaderMap) -> bool {
    headers
        .get(REFERER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|referer| referer.contains("/share/"))
}

/// Join all `Cookie` headers into one header string.
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join("; "))
    }
}

pub(super) async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ChatError> {
    if is_share_page(&headers) {
        return Err(ChatError::SharePage);
    }

    let request = ChatRequest::from_body(&body);
    let chat_id = request
        .id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let user_id = current_user_id(state.auth.as_ref(), &headers).await;

    let ModelSelection { model, search_mode } =
        resolve_selection(cookie_header(&headers).as_deref(), &state.registry);

    if !state.registry.is_provider_enabled(&model.provider_id) {
        return Err(ChatError::ProviderDisabled(model.provider_id));
    }

    tracing::info!(
        chat_id = %chat_id,
        model = %model.id,
        provider = %model.provider_id,
        tool_call_type = %model.tool_call_type,
        search_mode,
        "Dispatching chat request"
    );

    let responder = state.responder(model.tool_call_type).clone();
    responder
        .respond(StreamContext {
            messages: request.messages,
            model,
            chat_id,
            search_mode,
            user_id,
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TrustedHeaderAuth;
    use crate::models::{Model, ProviderRegistry, ToolCallType};
    use crate::server::create_router;
    use crate::streaming::StreamResponder;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;
    use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tower::util::ServiceExt;

    /// Records every context it is asked to answer.
    #[derive(Default)]
    struct RecordingResponder {
        seen: Mutex<Vec<StreamContext>>,
    }

    impl RecordingResponder {
        fn calls(&self) -> Vec<StreamContext> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StreamResponder for RecordingResponder {
        async fn respond(&self, ctx: StreamContext) -> Result<Response, ChatError> {
            self.seen.lock().unwrap().push(ctx);
            Ok((StatusCode::OK, "streamed").into_response())
        }
    }

    struct FailingResponder;

    #[async_trait]
    impl StreamResponder for FailingResponder {
        async fn respond(&self, _ctx: StreamContext) -> Result<Response, ChatError> {
            Err(ChatError::Internal(anyhow::anyhow!("upstream exploded")))
        }
    }

    struct PanickingResponder;

    #[async_trait]
    impl StreamResponder for PanickingResponder {
        async fn respond(&self, _ctx: StreamContext) -> Result<Response, ChatError> {
            panic!("responder bug")
        }
    }

    struct SlowResponder;

    #[async_trait]
    impl StreamResponder for SlowResponder {
        async fn respond(&self, _ctx: StreamContext) -> Result<Response, ChatError> {
            tokio::time::sleep(std::time::Duration::from_secs(10)).await;
            Ok(StatusCode::OK.into_response())
        }
    }

    struct Harness {
        native: Arc<RecordingResponder>,
        manual: Arc<RecordingResponder>,
        state: AppState,
    }

    fn harness(enabled: &[&str]) -> Harness {
        let native = Arc::new(RecordingResponder::default());
        let manual = Arc::new(RecordingResponder::default());
        let state = AppState::new(ProviderRegistry::with_enabled(enabled.iter().copied()))
            .with_responders(native.clone(), manual.clone());
        Harness {
            native,
            manual,
            state,
        }
    }

    fn model(id: &str, provider_id: &str, tool_call_type: ToolCallType) -> Model {
        Model {
            id: id.to_string(),
            name: id.to_string(),
            provider: provider_id.to_string(),
            provider_id: provider_id.to_string(),
            enabled: true,
            tool_call_type,
            tool_call_model: None,
        }
    }

    fn model_cookie(model: &Model) -> String {
        let json = serde_json::to_string(model).unwrap();
        format!(
            "selectedModel={}",
            utf8_percent_encode(&json, NON_ALPHANUMERIC)
        )
    }

    fn chat_request() -> axum::http::request::Builder {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, String) {
        let response = create_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn body(messages: serde_json::Value, id: &str) -> Body {
        Body::from(json!({ "messages": messages, "id": id }).to_string())
    }

    #[test]
    fn test_is_share_page() {
        let mut headers = HeaderMap::new();
        assert!(!is_share_page(&headers));

        headers.insert(REFERER, "https://chat.example.com/search/abc".parse().unwrap());
        assert!(!is_share_page(&headers));

        headers.insert(REFERER, "https://chat.example.com/share/abc".parse().unwrap());
        assert!(is_share_page(&headers));
    }

    #[test]
    fn test_cookie_headers_are_joined() {
        let mut headers = HeaderMap::new();
        assert_eq!(cookie_header(&headers), None);

        headers.append(COOKIE, "a=1".parse().unwrap());
        headers.append(COOKIE, "search-mode=true".parse().unwrap());
        assert_eq!(cookie_header(&headers).as_deref(), Some("a=1; search-mode=true"));
    }

    #[test]
    fn test_request_body_degrades() {
        let request = ChatRequest::from_body(b"{not json");
        assert!(request.messages.is_empty());
        assert!(request.id.is_none());

        let request = ChatRequest::from_body(br#"{"messages": [{"role": "user", "content": "hi"}], "id": "c1"}"#);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.id.as_deref(), Some("c1"));

        let request = ChatRequest::from_body(b"[1, 2]");
        assert_eq!(request, ChatRequest::default());
    }

    #[test]
    fn test_numeric_id_keeps_messages() {
        let request =
            ChatRequest::from_body(br#"{"messages": [{"role": "user", "content": "hi"}], "id": 42}"#);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role(), Some("user"));
        assert_eq!(request.id.as_deref(), Some("42"));
    }

    #[test]
    fn test_message_without_role_is_kept() {
        let request =
            ChatRequest::from_body(br#"{"messages": [{"content": "hi", "parts": []}], "id": "c1"}"#);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role(), None);
        assert_eq!(request.messages[0].as_value(), &json!({"content": "hi", "parts": []}));
        assert_eq!(request.id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_mistyped_field_only_drops_itself() {
        let request = ChatRequest::from_body(br#"{"messages": [{"role": "user"}], "id": {"x": 1}}"#);
        assert_eq!(request.messages.len(), 1);
        assert!(request.id.is_none());

        let request = ChatRequest::from_body(br#"{"messages": "hi", "id": "c2"}"#);
        assert!(request.messages.is_empty());
        assert_eq!(request.id.as_deref(), Some("c2"));
    }

    #[tokio::test]
    async fn test_share_page_is_forbidden_regardless_of_body() {
        for payload in ["", "{not json", r#"{"messages": [], "id": "c1"}"#] {
            let h = harness(&["openai"]);
            let request = chat_request()
                .header("referer", "https://chat.example.com/share/xyz")
                .body(Body::from(payload))
                .unwrap();

            let (status, text) = send(h.state, request).await;
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(text, "Chat API is not available on share pages");
            assert!(h.native.calls().is_empty());
            assert!(h.manual.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_bad_request() {
        let h = harness(&[]);
        let chosen = model("gpt-4o", "openai", ToolCallType::Native);
        let request = chat_request()
            .header("cookie", model_cookie(&chosen))
            .body(body(json!([]), "c1"))
            .unwrap();

        let (status, text) = send(h.state, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(text.contains("Selected provider is not enabled: openai"), "{}", text);
        assert!(h.native.calls().is_empty());
    }

    #[tokio::test]
    async fn test_native_model_dispatches_to_native_responder() {
        let h = harness(&["google", "anthropic"]);
        let chosen = model("claude-3-5-sonnet-latest", "anthropic", ToolCallType::Native);
        let request = chat_request()
            .header("cookie", format!("{}; search-mode=true", model_cookie(&chosen)))
            .body(body(json!([{"role": "user", "content": "why is the sky blue"}]), "chat-7"))
            .unwrap();

        let (status, text) = send(h.state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text, "streamed");

        let calls = h.native.calls();
        assert_eq!(calls.len(), 1);
        assert!(h.manual.calls().is_empty());

        let ctx = &calls[0];
        assert_eq!(ctx.model, chosen);
        assert_eq!(ctx.chat_id, "chat-7");
        assert!(ctx.search_mode);
        assert_eq!(ctx.messages.len(), 1);
        assert_eq!(ctx.messages[0].role(), Some("user"));
        assert_eq!(ctx.user_id, None);
    }

    #[tokio::test]
    async fn test_default_manual_model_dispatches_to_manual_responder() {
        let h = harness(&["google"]);
        let request = chat_request()
            .body(body(json!([]), "chat-8"))
            .unwrap();

        let (status, _) = send(h.state, request).await;
        assert_eq!(status, StatusCode::OK);

        let calls = h.manual.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model.id, "gemini-2.0-flash");
        assert!(!calls[0].search_mode);
        assert!(h.native.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_tool_call_type_dispatches_to_manual_responder() {
        let h = harness(&["openai"]);
        let raw = r#"{"id":"gpt-4.1","providerId":"openai","toolCallType":"auto"}"#;
        let request = chat_request()
            .header(
                "cookie",
                format!("selectedModel={}", utf8_percent_encode(raw, NON_ALPHANUMERIC)),
            )
            .body(body(json!([]), "chat-11"))
            .unwrap();

        let (status, _) = send(h.state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(h.native.calls().is_empty());

        let calls = h.manual.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model.id, "gpt-4.1");
    }

    #[tokio::test]
    async fn test_disabled_cookie_model_uses_enabled_default() {
        let h = harness(&["openai"]);
        let chosen = model("grok-2-1212", "xai", ToolCallType::Native);
        let request = chat_request()
            .header("cookie", model_cookie(&chosen))
            .body(body(json!([]), "chat-9"))
            .unwrap();

        let (status, _) = send(h.state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(h.native.calls()[0].model.id, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_invalid_body_gets_generated_chat_id() {
        let h = harness(&["openai"]);
        let request = chat_request().body(Body::from("{oops")).unwrap();

        let (status, _) = send(h.state, request).await;
        assert_eq!(status, StatusCode::OK);

        let calls = h.native.calls();
        assert!(calls[0].messages.is_empty());
        assert!(uuid::Uuid::parse_str(&calls[0].chat_id).is_ok());
    }

    #[tokio::test]
    async fn test_loose_body_fields_reach_responder() {
        let h = harness(&["openai"]);
        let payload = json!({
            "messages": [{"content": "hi", "parts": [{"type": "text"}]}],
            "id": 42
        });
        let request = chat_request()
            .body(Body::from(payload.to_string()))
            .unwrap();

        let (status, _) = send(h.state, request).await;
        assert_eq!(status, StatusCode::OK);

        let calls = h.native.calls();
        assert_eq!(calls[0].chat_id, "42");
        assert_eq!(calls[0].messages.len(), 1);
        assert_eq!(calls[0].messages[0].as_value(), &payload["messages"][0]);
    }

    #[tokio::test]
    async fn test_user_id_is_forwarded() {
        let h = harness(&["openai"]);
        let state = h.state.with_auth(Arc::new(TrustedHeaderAuth));
        let request = chat_request()
            .header("x-user-id", "user-5")
            .body(body(json!([]), "chat-10"))
            .unwrap();

        let (status, _) = send(state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(h.native.calls()[0].user_id.as_deref(), Some("user-5"));
    }

    #[tokio::test]
    async fn test_responder_error_is_generic_500() {
        let state = AppState::new(ProviderRegistry::with_enabled(["openai"]))
            .with_responders(Arc::new(FailingResponder), Arc::new(FailingResponder));
        let request = chat_request().body(body(json!([]), "c")).unwrap();

        let (status, text) = send(state, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(text, "Error processing your request");
    }

    #[tokio::test]
    async fn test_responder_panic_is_generic_500() {
        let state = AppState::new(ProviderRegistry::with_enabled(["openai"]))
            .with_responders(Arc::new(PanickingResponder), Arc::new(PanickingResponder));
        let request = chat_request().body(body(json!([]), "c")).unwrap();

        let (status, text) = send(state, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(text, "Error processing your request");
    }

    #[tokio::test]
    async fn test_slow_responder_times_out() {
        let mut state = AppState::new(ProviderRegistry::with_enabled(["openai"]))
            .with_responders(Arc::new(SlowResponder), Arc::new(SlowResponder));
        state.max_duration = std::time::Duration::from_millis(50);
        let request = chat_request().body(body(json!([]), "c")).unwrap();

        let (status, _) = send(state, request).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    }
}
