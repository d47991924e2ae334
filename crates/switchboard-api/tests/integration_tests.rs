//! Integration tests for the HTTP surface and the polling loop.
//!
//! Each test builds its own state around a scripted completion provider and
//! a recording transport, so replies can be inspected without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use switchboard_api::handlers::{ChatResponse, HealthResponse};
use switchboard_api::telegram::UNSUPPORTED_REPLY;
use switchboard_api::{
    create_router, AppState, Poller, RecordingTransport, TransportError, Update, UpdateSource,
};
use switchboard_chat::QueryCoordinator;
use switchboard_core::config::ServerConfig;
use switchboard_core::{RouteDecision, SwitchboardConfig};
use switchboard_providers::{ScriptedCompletion, StaticSearch};
use switchboard_tools::ToolRegistry;

// =============================================================================
// Helpers
// =============================================================================

const WEBHOOK_PATH: &str = "/webhook/telegram";

fn make_state(
    provider: ScriptedCompletion,
    server: ServerConfig,
) -> (AppState, Arc<RecordingTransport>) {
    let registry = Arc::new(ToolRegistry::with_defaults(Arc::new(
        StaticSearch::with_hits(vec![]),
    )));
    let coordinator =
        QueryCoordinator::from_config(&SwitchboardConfig::default(), Arc::new(provider), registry)
            .unwrap();
    let transport = Arc::new(RecordingTransport::new());
    let state = AppState::new(Arc::new(coordinator), transport.clone(), server);
    (state, transport)
}

fn make_app(provider: ScriptedCompletion) -> (axum::Router, Arc<RecordingTransport>) {
    let (state, transport) = make_state(provider, ServerConfig::default());
    (create_router(state), transport)
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn text_update(update_id: i64, chat_id: i64, text: &str) -> Value {
    serde_json::json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "chat": {"id": chat_id, "type": "private"},
            "date": 1_700_000_000,
            "text": text
        }
    })
}

/// Wait for the background webhook task to send `count` replies.
async fn wait_for_sent(transport: &RecordingTransport, count: usize) -> Vec<(String, String)> {
    for _ in 0..200 {
        let sent = transport.sent();
        if sent.len() >= count {
            return sent;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    transport.sent()
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_status_and_conversations() {
    let (state, _) = make_state(
        ScriptedCompletion::new().reply("NO TOOL").reply("Hello!"),
        ServerConfig::default(),
    );
    let app = create_router(state.clone());

    let resp = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(health.active_conversations, 0);
    assert!(chrono::DateTime::parse_from_rfc3339(&health.started_at).is_ok());

    state.coordinator.handle("chat-1", "hi").await;

    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.active_conversations, 1);
}

// =============================================================================
// /chat
// =============================================================================

#[tokio::test]
async fn test_chat_plain_question() {
    let (app, transport) = make_app(
        ScriptedCompletion::new()
            .reply("NO TOOL")
            .reply("A cat is a small domesticated mammal."),
    );

    let resp = app
        .oneshot(post_json(
            "/chat",
            r#"{"user_id":"u1","text":"What is a cat?"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: ChatResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body.reply, "A cat is a small domesticated mammal.");
    assert_eq!(body.route, Some(RouteDecision::None));
    assert!(body.tools_used.is_empty());
    assert!(transport.sent().is_empty(), "/chat replies in the body only");
}

#[tokio::test]
async fn test_chat_reset_command() {
    let (app, _) = make_app(ScriptedCompletion::new());

    let resp = app
        .oneshot(post_json("/chat", r#"{"user_id":"u1","text":"/reset"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ChatResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body.reply, "Conversation history has been reset.");
    assert_eq!(body.route, None);
}

#[tokio::test]
async fn test_chat_requires_user_id() {
    let (app, _) = make_app(ScriptedCompletion::new());

    let resp = app
        .oneshot(post_json("/chat", r#"{"user_id":"  ","text":"hi"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_chat_provider_failure_returns_apology() {
    let (app, _) = make_app(
        ScriptedCompletion::new()
            .reply("NO TOOL")
            .fail("upstream exploded"),
    );

    let resp = app
        .oneshot(post_json("/chat", r#"{"user_id":"u1","text":"hello"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ChatResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(body.reply, switchboard_chat::APOLOGY);
    assert!(!body.reply.contains("upstream exploded"));
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let (app, _) = make_app(ScriptedCompletion::new());
    let text = "a".repeat(1024 * 1024 + 1);
    let json = serde_json::json!({"user_id": "u1", "text": text}).to_string();

    let resp = app.oneshot(post_json("/chat", &json)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// =============================================================================
// Webhook
// =============================================================================

#[tokio::test]
async fn test_webhook_text_update_replies_to_chat() {
    let (app, transport) = make_app(ScriptedCompletion::new().reply("NO TOOL").reply("Hi there!"));

    let resp = app
        .oneshot(post_json(
            WEBHOOK_PATH,
            &text_update(1, 4242, "hello").to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        wait_for_sent(&transport, 1).await,
        vec![("4242".to_string(), "Hi there!".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_webhook_acknowledges_before_answering() {
    let (app, transport) = make_app(
        ScriptedCompletion::new()
            .delayed(Duration::from_secs(20), "NO TOOL")
            .delayed(Duration::from_secs(20), "late answer"),
    );

    let resp = app
        .oneshot(post_json(
            WEBHOOK_PATH,
            &text_update(5, 9, "slow question").to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(transport.sent().is_empty(), "acknowledged before the answer");

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(
        transport.sent(),
        vec![("9".to_string(), "late answer".to_string())]
    );
}

#[tokio::test]
async fn test_webhook_photo_gets_unsupported_reply() {
    let (app, transport) = make_app(ScriptedCompletion::new());
    let update = serde_json::json!({
        "update_id": 2,
        "message": {
            "message_id": 2,
            "chat": {"id": 77},
            "photo": [{"file_id": "p", "width": 10, "height": 10}]
        }
    });

    let resp = app
        .oneshot(post_json(WEBHOOK_PATH, &update.to_string()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        wait_for_sent(&transport, 1).await,
        vec![("77".to_string(), UNSUPPORTED_REPLY.to_string())]
    );
}

#[tokio::test]
async fn test_webhook_malformed_json_rejected() {
    let (app, transport) = make_app(ScriptedCompletion::new());

    let resp = app
        .oneshot(post_json(WEBHOOK_PATH, "{not json"))
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_webhook_secret_enforced() {
    let server = ServerConfig {
        webhook_secret: Some("s3cret".into()),
        ..ServerConfig::default()
    };
    let (state, transport) = make_state(
        ScriptedCompletion::new().reply("NO TOOL").reply("ok"),
        server,
    );
    let app = create_router(state);
    let body = text_update(3, 5, "hello").to_string();

    let resp = app
        .clone()
        .oneshot(post_json(WEBHOOK_PATH, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let wrong = Request::post(WEBHOOK_PATH)
        .header("content-type", "application/json")
        .header("x-telegram-bot-api-secret-token", "nope")
        .body(Body::from(body.clone()))
        .unwrap();
    let resp = app.clone().oneshot(wrong).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(transport.sent().is_empty());

    let right = Request::post(WEBHOOK_PATH)
        .header("content-type", "application/json")
        .header("x-telegram-bot-api-secret-token", "s3cret")
        .body(Body::from(body))
        .unwrap();
    let resp = app.oneshot(right).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(wait_for_sent(&transport, 1).await.len(), 1);
}

#[tokio::test]
async fn test_secret_does_not_guard_health() {
    let server = ServerConfig {
        webhook_secret: Some("s3cret".into()),
        ..ServerConfig::default()
    };
    let (state, _) = make_state(ScriptedCompletion::new(), server);

    let resp = create_router(state)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// =============================================================================
// Rate limiting
// =============================================================================

#[tokio::test]
async fn test_rate_limit_returns_429() {
    let server = ServerConfig {
        max_requests_per_sec: 2,
        ..ServerConfig::default()
    };
    let (state, _) = make_state(ScriptedCompletion::new(), server);
    let app = create_router(state);

    let mut limited = 0;
    for _ in 0..10 {
        let resp = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        if resp.status() == StatusCode::TOO_MANY_REQUESTS {
            let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
            assert_eq!(body["error"], "too_many_requests");
            limited += 1;
        }
    }
    assert!(limited >= 6, "only {limited} of 10 requests were limited");
}

// =============================================================================
// Polling
// =============================================================================

struct ScriptedSource {
    batches: Mutex<VecDeque<Result<Vec<Update>, TransportError>>>,
    offsets: Mutex<Vec<i64>>,
}

impl ScriptedSource {
    fn new(batches: Vec<Result<Vec<Update>, TransportError>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            offsets: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl UpdateSource for ScriptedSource {
    async fn get_updates(
        &self,
        offset: i64,
        _timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        self.offsets.lock().unwrap().push(offset);
        self.batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn update(value: Value) -> Update {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_poll_once_answers_batch_and_advances_offset() {
    let (state, transport) = make_state(
        ScriptedCompletion::new()
            .reply("NO TOOL")
            .reply("first answer")
            .reply("NO TOOL")
            .reply("second answer"),
        ServerConfig::default(),
    );
    let source = Arc::new(ScriptedSource::new(vec![
        Ok(vec![
            update(text_update(100, 1, "one")),
            update(text_update(101, 2, "two")),
        ]),
        Err(TransportError::Timeout),
    ]));
    let mut poller = Poller::new(source.clone(), state, 30);

    assert_eq!(poller.poll_once().await.unwrap(), 2);
    assert_eq!(poller.offset(), 102);
    assert_eq!(
        transport.sent(),
        vec![
            ("1".to_string(), "first answer".to_string()),
            ("2".to_string(), "second answer".to_string()),
        ]
    );

    assert!(poller.poll_once().await.is_err());
    assert_eq!(poller.offset(), 102, "failed fetch keeps the offset");
    assert_eq!(*source.offsets.lock().unwrap(), vec![0, 102]);
}

#[tokio::test]
async fn test_poll_once_skips_ignored_updates() {
    let (state, transport) = make_state(ScriptedCompletion::new(), ServerConfig::default());
    let source = Arc::new(ScriptedSource::new(vec![Ok(vec![update(
        serde_json::json!({"update_id": 7}),
    )])]));
    let mut poller = Poller::new(source, state, 30);

    assert_eq!(poller.poll_once().await.unwrap(), 1);
    assert_eq!(poller.offset(), 8);
    assert!(transport.sent().is_empty());
}
