//! Integration tests for the drone navigation webhook

mod common;

use aidevs_tasks::webhook::{router, Description, WebhookState};
use aidevs_tasks::ChatModel;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use common::{FailingModel, ScriptedModel};
use std::sync::Arc;
use tower::ServiceExt;

async fn call(model: Arc<dyn ChatModel>, method: Method, body: &str) -> (StatusCode, Vec<u8>) {
    let app = router(Arc::new(WebhookState::new(model)));
    let request = Request::builder()
        .method(method)
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn test_instruction_is_answered_with_description() {
    let model = Arc::new(ScriptedModel::new(&["dwa drzewa\n"]));
    let (status, body) = call(
        model.clone(),
        Method::POST,
        r#"{"instruction": "Lecimy na sam dół, potem w prawo i jedno pole do góry."}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let description: Description = serde_json::from_slice(&body).unwrap();
    assert_eq!(description.description, "dwa drzewa");

    let prompt = model.prompt(0);
    assert_eq!(prompt.len(), 2);
    assert!(prompt[0].text().contains("punkt startowy"));
    assert_eq!(
        prompt[1].text(),
        "Lecimy na sam dół, potem w prawo i jedno pole do góry."
    );
}

#[tokio::test]
async fn test_template_probe_skips_model() {
    let model = Arc::new(ScriptedModel::new(&[]));
    let (status, body) = call(
        model.clone(),
        Method::POST,
        r#"{"instruction": "{{FLG:NAME}}"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"thanks");
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_invalid_json() {
    let model = Arc::new(ScriptedModel::new(&[]));
    let (status, body) = call(model.clone(), Method::POST, "not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"Invalid JSON");
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_model_failure_is_500() {
    let (status, _) = call(Arc::new(FailingModel), Method::POST, r#"{"instruction": "w prawo"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_non_post_is_rejected() {
    let model = Arc::new(ScriptedModel::new(&[]));
    let (status, body) = call(model.clone(), Method::GET, "").await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, b"Method not allowed");
    assert_eq!(model.calls(), 0);
}
