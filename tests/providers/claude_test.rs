use agent_service::agent::{chat_with_agent, AgentService, ChatInput};
use agent_service::providers::claude::types::{ContentBlock, StopReason, StreamEvent, Usage};
use agent_service::{ClaudeClient, Config, LLMClient, LLMError, Message, ServiceOptions, ToolDefinition};
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-api-key";

fn service(server: &MockServer) -> AgentService {
    let config = Config::default().with_base_url(format!("{}/v1", server.uri()));
    AgentService::new(ServiceOptions::new(API_KEY), config)
}

fn message_response(content: Value, usage: Value, stop_reason: &str) -> Value {
    json!({
        "id": "msg_01XFDUDYJgAACzvnptvVoYEL",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-sonnet-20241022",
        "content": content,
        "stop_reason": stop_reason,
        "stop_sequence": null,
        "usage": usage
    })
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.body_json::<Value>().expect("request body is JSON"))
        .collect()
}

fn sse(events: &[Value]) -> String {
    events
        .iter()
        .map(|event| format!("event: {}\ndata: {event}\n\n", event["type"].as_str().unwrap()))
        .collect()
}

#[tokio::test]
async fn test_generate_sends_single_user_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", API_KEY))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_json(json!({
            "model": "claude-3-5-sonnet-20241022",
            "max_tokens": 1024,
            "messages": [{"role": "user", "content": "Hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_response(
            json!([{"type": "text", "text": "Hi there"}]),
            json!({"input_tokens": 5, "output_tokens": 3}),
            "end_turn",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let result = service(&server).generate("Hello", None).await.unwrap();

    assert_eq!(result.text, "Hi there");
    assert_eq!(
        result.usage,
        Usage::new(5, 3)
    );
    assert_eq!(result.stop_reason, Some(StopReason::EndTurn));
}

#[tokio::test]
async fn test_generate_with_leading_tool_use_returns_empty_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_response(
            json!([
                {"type": "tool_use", "id": "toolu_01", "name": "get_weather", "input": {"city": "Paris"}}
            ]),
            json!({"input_tokens": 10, "output_tokens": 1}),
            "tool_use",
        )))
        .mount(&server)
        .await;

    let result = service(&server)
        .generate("What's the weather?", Some("Use tools."))
        .await
        .unwrap();

    assert_eq!(result.text, "");
    assert_eq!(
        result.usage,
        Usage::new(10, 1)
    );
    assert_eq!(request_bodies(&server).await[0]["system"], "Use tools.");
}

#[tokio::test]
async fn test_generate_with_tools_returns_raw_response() {
    let server = MockServer::start().await;

    let wire = message_response(
        json!([
            {"type": "text", "text": "Let me check.", "citations": null},
            {"type": "server_tool_use", "id": "srvtoolu_01", "name": "web_search", "input": {"query": "Oslo"}},
            {"type": "tool_use", "id": "toolu_02", "name": "get_weather", "input": {"city": "Oslo"}}
        ]),
        json!({"input_tokens": 40, "output_tokens": 22, "cache_read_input_tokens": 7}),
        "tool_use",
    );

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wire.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let tools = vec![ToolDefinition::new(
        "get_weather",
        json!({"type": "object", "properties": {"city": {"type": "string"}}, "required": ["city"]}),
    )
    .with_description("Current weather for a city")];

    let raw = service(&server)
        .generate_with_tools("Weather in Oslo?", &tools, None)
        .await
        .unwrap();

    assert_eq!(raw.content.len(), 3);
    assert!(matches!(raw.content[1], ContentBlock::Other(_)));
    assert!(matches!(raw.content[2], ContentBlock::ToolUse { ref name, .. } if name == "get_weather"));
    assert_eq!(raw.stop_reason, Some(StopReason::ToolUse));
    assert_eq!(serde_json::to_value(&raw).unwrap(), wire);

    let bodies = request_bodies(&server).await;
    let body = &bodies[0];
    assert_eq!(body["max_tokens"], 4096);
    assert_eq!(body["tools"][0]["description"], "Current weather for a city");
}

#[tokio::test]
async fn test_chat_with_agent_sends_history_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_response(
            json!([{"type": "text", "text": "D"}]),
            json!({"input_tokens": 12, "output_tokens": 1}),
            "end_turn",
        )))
        .mount(&server)
        .await;

    let input = ChatInput::new("C").with_history(vec![Message::user("A"), Message::assistant("B")]);
    let reply = chat_with_agent(&service(&server), input).await.unwrap();

    assert_eq!(reply.message, "D");
    assert_eq!(
        request_bodies(&server).await[0]["messages"],
        json!([
            {"role": "user", "content": "A"},
            {"role": "assistant", "content": "B"},
            {"role": "user", "content": "C"}
        ])
    );
}

#[tokio::test]
async fn test_status_codes_map_to_errors() {
    let cases: [(u16, &str); 4] = [
        (401, "authentication_error"),
        (429, "rate_limit_error"),
        (529, "overloaded_error"),
        (400, "invalid_request_error"),
    ];

    for (status, error_type) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "type": "error",
                "error": {"type": error_type, "message": "nope"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = service(&server).generate("Hello", None).await.unwrap_err();
        match status {
            401 => assert!(matches!(err, LLMError::Authentication(_)), "{err:?}"),
            429 => assert!(matches!(err, LLMError::RateLimited(_)), "{err:?}"),
            529 => assert!(matches!(err, LLMError::ServerError(_)), "{err:?}"),
            _ => assert!(matches!(err, LLMError::ApiError(ref m) if m.contains(error_type)), "{err:?}"),
        }
        assert!(err.is_transport());
    }
}

#[tokio::test]
async fn test_malformed_response_is_format_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let err = service(&server).generate("Hello", None).await.unwrap_err();
    assert!(matches!(err, LLMError::ResponseFormat(_)));
}

#[tokio::test]
async fn test_stream_completion_yields_events_and_releases_once() {
    let server = MockServer::start().await;

    let body = sse(&[
        json!({"type": "message_start", "message": {
            "id": "msg_stream", "type": "message", "role": "assistant", "content": [],
            "model": "claude-3-5-sonnet-20241022", "stop_reason": null, "stop_sequence": null,
            "usage": {"input_tokens": 8, "output_tokens": 1}
        }}),
        json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
        json!({"type": "ping"}),
        json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "Hello"}}),
        json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": " there"}}),
        json!({"type": "content_block_stop", "index": 0}),
        json!({"type": "message_delta", "delta": {"stop_reason": "end_turn", "stop_sequence": null}, "usage": {"output_tokens": 4}}),
        json!({"type": "message_stop"}),
    ]);

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("accept", "text/event-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let releases = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&releases);
    let mut stream = service(&server)
        .stream_completion("Hello", Some("Be brief."))
        .await
        .unwrap()
        .on_release(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event.unwrap());
    }

    assert_eq!(events.len(), 8);
    assert!(matches!(events[0], StreamEvent::MessageStart { .. }));
    assert_eq!(events[2], StreamEvent::Ping);
    let text: String = events.iter().filter_map(StreamEvent::text_delta).collect();
    assert_eq!(text, "Hello there");
    assert_eq!(events[7], StreamEvent::MessageStop);

    drop(stream);
    assert_eq!(releases.load(Ordering::SeqCst), 1);

    let bodies = request_bodies(&server).await;
    let body = &bodies[0];
    assert_eq!(body["stream"], true);
    assert_eq!(body["max_tokens"], 1024);
    assert_eq!(body["system"], "Be brief.");
}

#[tokio::test]
async fn test_stream_error_event_terminates_stream() {
    let server = MockServer::start().await;

    let body = sse(&[
        json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "Par"}}),
        json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}),
        json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "never"}}),
    ]);

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let releases = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&releases);
    let mut stream = service(&server)
        .stream_completion("Hello", None)
        .await
        .unwrap()
        .on_release(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    assert_eq!(
        stream.next().await.unwrap().unwrap().text_delta(),
        Some("Par")
    );
    assert!(matches!(
        stream.next().await,
        Some(Err(LLMError::StreamError(ref message))) if message.contains("overloaded_error")
    ));
    assert!(stream.next().await.is_none());
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancel_stream_early_releases_once() {
    let server = MockServer::start().await;

    let body = sse(&[
        json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "one"}}),
        json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "two"}}),
        json!({"type": "message_stop"}),
    ]);

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let releases = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&releases);
    let mut stream = service(&server)
        .stream_completion("Hello", None)
        .await
        .unwrap()
        .on_release(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    assert!(stream.next().await.is_some());
    stream.cancel();
    assert!(stream.next().await.is_none());
    drop(stream);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stream_request_rejected_before_streaming() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })))
        .mount(&server)
        .await;

    let result = service(&server).stream_completion("Hello", None).await;
    assert!(matches!(result, Err(LLMError::Authentication(ref m)) if m.contains("invalid x-api-key")));
}

#[tokio::test]
async fn test_client_can_be_used_directly() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_response(
            json!([{"type": "text", "text": "pong"}]),
            json!({"input_tokens": 1, "output_tokens": 1}),
            "end_turn",
        )))
        .mount(&server)
        .await;

    let config = Config::default().with_base_url(format!("{}/v1/", server.uri()));
    let client = ClaudeClient::new(ServiceOptions::new(API_KEY), config);
    let request = agent_service::providers::claude::types::MessagesRequest::new(
        "claude-3-5-haiku-20241022",
        16,
        vec![agent_service::providers::claude::types::Message::user("ping")],
    );

    let response = client.create_message(&request).await.unwrap();
    assert_eq!(
        response.content,
        vec![ContentBlock::text("pong")]
    );
}
