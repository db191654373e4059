mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use common::{build_app, test_helpers, StubCloner, StubGenerator};
use pretty_assertions::assert_eq;
use readmesmith::{
    error::CLONE_FAILED_MESSAGE,
    generator::{GenerationResponse, PromptFeedback},
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn send(router: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(Body::from(body.unwrap_or_default().to_string()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post_generate(router: &Router, body: &str) -> (StatusCode, Value) {
    send(router, Method::POST, "/api/generate", Some(body)).await
}

fn hello_generator() -> std::sync::Arc<StubGenerator> {
    StubGenerator::new(test_helpers::text_response("# Hello\n"))
}

#[tokio::test]
async fn test_generate_returns_readme_verbatim() {
    let app = build_app(
        StubCloner::with_files(&[("package.json", "{\"name\":\"x\"}"), ("index.js", "")]),
        Some(hello_generator()),
    );

    let (status, body) =
        post_generate(&app.router, r#"{"repoUrl":"https://github.com/acme/x"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"readme": "# Hello\n"}));
    assert_eq!(app.cloner.calls(), 1);
    assert_eq!(test_helpers::entries(app.temp_root.path()), 0);

    let prompts = app.generator.as_ref().unwrap().prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("https://github.com/acme/x"));
    assert!(prompts[0].contains("--- File: package.json ---"));
    assert!(prompts[0].contains("{\"name\":\"x\"}"));
}

#[tokio::test]
async fn test_clone_failure_is_500_and_cleans_up() {
    let app = build_app(
        StubCloner::failing("fatal: repository 'https://example.com/not-a-repo/' not found"),
        Some(hello_generator()),
    );

    let (status, body) =
        post_generate(&app.router, r#"{"repoUrl":"https://example.com/not-a-repo"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert_eq!(error, CLONE_FAILED_MESSAGE);
    assert!(error.to_lowercase().contains("clone"));
    assert!(!error.contains("fatal"));

    let dest = app.cloner.seen_dest().unwrap();
    assert!(!dest.exists());
    assert_eq!(test_helpers::entries(app.temp_root.path()), 0);
    assert!(app.generator.as_ref().unwrap().prompts().is_empty());
}

#[tokio::test]
async fn test_missing_repo_url_is_400_without_side_effects() {
    let app = build_app(StubCloner::with_files(&[]), Some(hello_generator()));

    for body in [r#"{}"#, r#"{"repoUrl":""}"#, r#"{"repoUrl":"   "}"#, r#"{"repoUrl":null}"#] {
        let (status, value) = post_generate(&app.router, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert!(value["error"].as_str().unwrap().contains("repoUrl"));
    }

    assert_eq!(app.cloner.calls(), 0);
    assert_eq!(test_helpers::entries(app.temp_root.path()), 0);
}

#[tokio::test]
async fn test_invalid_json_is_400() {
    let app = build_app(StubCloner::with_files(&[]), Some(hello_generator()));

    let (status, value) = post_generate(&app.router, "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["error"].as_str().unwrap().starts_with("Invalid request"));
    assert_eq!(app.cloner.calls(), 0);
}

#[tokio::test]
async fn test_non_http_url_is_400() {
    let app = build_app(StubCloner::with_files(&[]), Some(hello_generator()));

    let (status, _) = post_generate(&app.router, r#"{"repoUrl":"file:///etc"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.cloner.calls(), 0);
    assert_eq!(test_helpers::entries(app.temp_root.path()), 0);
}

#[tokio::test]
async fn test_missing_credential_is_500_before_clone() {
    let app = build_app(StubCloner::with_files(&[("a.txt", "a")]), None);

    let (status, value) =
        post_generate(&app.router, r#"{"repoUrl":"https://github.com/acme/x"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(value["error"]
        .as_str()
        .unwrap()
        .starts_with("Server configuration error"));
    assert_eq!(app.cloner.calls(), 0);

    let (status, _) = post_generate(&app.router, "{}").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_blocked_generation_reports_feedback() {
    let blocked = GenerationResponse {
        candidates: Vec::new(),
        prompt_feedback: Some(PromptFeedback {
            block_reason: Some("SAFETY".to_string()),
            safety_ratings: Vec::new(),
        }),
    };
    let app = build_app(
        StubCloner::with_files(&[("README.md", "hi")]),
        Some(StubGenerator::new(blocked)),
    );

    let (status, value) =
        post_generate(&app.router, r#"{"repoUrl":"https://github.com/acme/x"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = value["error"].as_str().unwrap();
    assert!(error.contains("no content"));
    assert!(error.contains("\"blockReason\":\"SAFETY\""));
    assert_eq!(test_helpers::entries(app.temp_root.path()), 0);
}

#[tokio::test]
async fn test_get_generate_returns_usage_hint() {
    let app = build_app(StubCloner::with_files(&[]), None);

    let (status, value) = send(&app.router, Method::GET, "/api/generate", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(value["usage"].as_str().unwrap().contains("repoUrl"));
    assert_eq!(app.cloner.calls(), 0);
}

#[tokio::test]
async fn test_health_and_index() {
    let app = build_app(StubCloner::with_files(&[]), Some(hello_generator()));

    let (status, health) = send(&app.router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["generation_configured"], true);

    let (status, index) = send(&app.router, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(index["endpoints"]["generate"], "/api/generate");
}

#[tokio::test]
async fn test_concurrent_requests_use_separate_directories() {
    let app = build_app(
        StubCloner::with_files(&[("Cargo.toml", "[package]\nname = \"x\"\n")]),
        Some(hello_generator()),
    );

    let body = r#"{"repoUrl":"https://github.com/acme/x"}"#;
    let (a, b) = tokio::join!(post_generate(&app.router, body), post_generate(&app.router, body));

    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);
    assert_eq!(app.cloner.calls(), 2);
    assert_eq!(test_helpers::entries(app.temp_root.path()), 0);
}
