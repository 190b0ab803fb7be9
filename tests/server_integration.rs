mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use codeproxy::classifier::Category;
use codeproxy::server::router;

use common::{app_state, generated, test_config, TEST_MODEL};

const MODEL_PATH: &str = "/models/test-org/test-model";
const CODE_REPLY: &str = "Use two pointers:\n```python\ndef merge(a, b):\n    return sorted(a + b)\n```";

async fn mock_provider(reply: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(generated(reply)))
        .mount(&server)
        .await;
    server
}

fn app(server: &MockServer) -> Router {
    router(app_state(&test_config(&server.uri())))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

#[tokio::test]
async fn test_health_reports_model() {
    let server = mock_provider("unused").await;
    let app = app(&server);

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "model": TEST_MODEL}));
}

#[tokio::test]
async fn test_conversation_round_trip_and_history() {
    let server = mock_provider("Hello! What are we building today?").await;
    let app = app(&server);

    let (status, body) = post(&app, "/generate/", json!({"prompt": "hello", "session_id": "s1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "response": "Hello! What are we building today?",
            "session_id": "s1",
            "message_type": "conversation"
        })
    );

    let (status, body) = post(&app, "/get_history/", json!({"session_id": "s1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "success",
            "history": ["User: hello", "AI: Hello! What are we building today?"]
        })
    );
}

#[tokio::test]
async fn test_generate_assigns_session_id() {
    let server = mock_provider("hi").await;
    let app = app(&server);

    let (status, body) = post(&app, "/generate", json!({"prompt": "hi"})).await;
    assert_eq!(status, StatusCode::OK);
    let session_id = body["session_id"].as_str().unwrap();
    assert!(!session_id.is_empty());

    let (_, history) = post(&app, "/get_history/", json!({"session_id": session_id})).await;
    assert_eq!(history["status"], "success");
}

#[tokio::test]
async fn test_code_task_shapes() {
    let server = mock_provider(CODE_REPLY).await;
    let mut config = test_config(&server.uri());
    config.classifier.fallback = Category::Task;
    let app = router(app_state(&config));
    let prompt = "write a function that merges two sorted arrays into one sorted array";

    let (status, body) = post(&app, "/generate/", json!({"prompt": prompt, "response_type": "code"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message_type"], "code");
    assert_eq!(
        body["generated_code"],
        "def merge(a, b):\n    return sorted(a + b)"
    );
    assert!(body.get("response").is_none());

    let (_, body) = post(
        &app,
        "/generate/",
        json!({"prompt": prompt, "response_type": "explanation"}),
    )
    .await;
    assert_eq!(body["explanation"], "Use two pointers:");
    assert!(body.get("generated_code").is_none());

    let (_, body) = post(&app, "/generate/", json!({"prompt": prompt, "response_type": "both"})).await;
    assert_eq!(body["response"], CODE_REPLY);
    assert_eq!(body["message_type"], "code");
}

#[tokio::test]
async fn test_empty_prompt_is_bad_request() {
    let server = mock_provider("unused").await;
    let app = app(&server);

    let (status, body) = post(&app, "/generate/", json!({"prompt": "   ", "session_id": "s1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "Prompt cannot be empty"}));

    let (_, history) = post(&app, "/get_history/", json!({"session_id": "s1"})).await;
    assert_eq!(history["status"], "not_found");
}

#[tokio::test]
async fn test_missing_credential_is_server_error() {
    let server = mock_provider("unused").await;
    let mut config = test_config(&server.uri());
    config.provider.api_key = None;
    let app = router(app_state(&config));

    let (status, body) = post(&app, "/generate/", json!({"prompt": "hello"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "HF_API_KEY is missing."}));
}

#[tokio::test]
async fn test_upstream_errors_map_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
        .expect(1)
        .mount(&server)
        .await;
    let app = app(&server);

    let (status, body) = post(&app, "/generate/", json!({"prompt": "hello"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"detail": "Invalid API Key. Check your HF_API_KEY."}));
}

#[tokio::test]
async fn test_model_loading_surfaces_upstream_503() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("loading"))
        .expect(3)
        .mount(&server)
        .await;
    let app = app(&server);

    let (status, body) = post(&app, "/generate/", json!({"prompt": "hello", "session_id": "s9"})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"detail": "HF API Error: loading"}));

    let (_, history) = post(&app, "/get_history/", json!({"session_id": "s9"})).await;
    assert_eq!(history["status"], "not_found");
}

#[tokio::test]
async fn test_clear_history() {
    let server = mock_provider("hey").await;
    let app = app(&server);

    let (_, body) = post(&app, "/clear_history/", json!({"session_id": "ghost"})).await;
    assert_eq!(
        body,
        json!({"status": "not_found", "message": "Session ID not found"})
    );
    let (_, body) = post(&app, "/get_history/", json!({"session_id": "ghost"})).await;
    assert_eq!(body["status"], "not_found");

    post(&app, "/generate/", json!({"prompt": "hey", "session_id": "s1"})).await;
    let (status, body) = post(&app, "/clear_history/", json!({"session_id": "s1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "success", "message": "Conversation history cleared"})
    );

    let (_, body) = post(&app, "/get_history/", json!({"session_id": "s1"})).await;
    assert_eq!(body, json!({"status": "success", "history": []}));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let server = mock_provider("unused").await;
    let app = app(&server);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:8501")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = mock_provider("unused").await;
    let app = app(&server);

    let (status, _) = send(&app, Method::GET, "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_default_fallback_treats_unmatched_prompts_as_conversation() {
    let server = mock_provider(CODE_REPLY).await;
    let app = app(&server);

    let (status, body) = post(
        &app,
        "/generate/",
        json!({
            "prompt": "write a function that merges two sorted arrays into one sorted array",
            "response_type": "code"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message_type"], "conversation");
    assert_eq!(body["response"], CODE_REPLY);
}
