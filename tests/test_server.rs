mod common;

use std::sync::Arc;

use common::{png_bytes, sample_post, FakeModel};
use mockito::{Matcher, Server};
use recipe_post::pipelines::GenerationContract;
use recipe_post::providers::{post_response_schema, GenerativeModel, Part, Task};
use recipe_post::server::{router, AppState, ErrorResponse};
use recipe_post::{
    AppConfig, Gateways, GenerationGateway, ImagePayload, PostContent, RequestState, Session,
};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

fn contract() -> GenerationContract {
    GenerationContract {
        system_prompt: "system prompt".to_string(),
        response_schema: post_response_schema(),
    }
}

fn wrapped_reply(post: &PostContent) -> String {
    json!({ "post_content": post }).to_string()
}

/// Serve the router on an ephemeral port and return its `/api` base URL.
async fn spawn(model: Option<Arc<dyn GenerativeModel>>) -> String {
    spawn_with(AppState::new(model, contract())).await
}

async fn spawn_with(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

#[tokio::test]
async fn test_missing_api_key_refuses_requests() {
    let base = spawn(None).await;
    let client = Client::new();

    for (path, body) in [
        ("extract-text-from-image", json!({ "image": "AAAA" })),
        ("generate-post", json!({ "text": "Рецепт", "images": [] })),
    ] {
        let response = client
            .post(format!("{}/{}", base, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let error: ErrorResponse = response.json().await.unwrap();
        assert!(error.error.contains("API key"), "{}", error.error);
    }
}

#[tokio::test]
async fn test_non_post_is_method_not_allowed() {
    let model: Arc<dyn GenerativeModel> = Arc::new(FakeModel::new("", ""));
    let base = spawn(Some(model)).await;

    let response = Client::new()
        .get(format!("{}/generate-post", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.error, "Method Not Allowed");
}

#[tokio::test]
async fn test_missing_api_key_outranks_method_check() {
    let base = spawn(None).await;

    let response = Client::new()
        .get(format!("{}/extract-text-from-image", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = response.json().await.unwrap();
    assert!(error.error.contains("API key"), "{}", error.error);
}

#[tokio::test]
async fn test_extract_rejects_missing_input() {
    let model: Arc<dyn GenerativeModel> = Arc::new(FakeModel::new("text", ""));
    let base = spawn(Some(model)).await;
    let client = Client::new();
    let url = format!("{}/extract-text-from-image", base);

    let response = client.post(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.error, "Request body is missing.");

    let response = client.post(&url).json(&json!({})).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.error, "Image data is missing from the request.");
}

#[tokio::test]
async fn test_extract_defaults_to_jpeg() {
    let fake = Arc::new(FakeModel::new("Рецепт №3\nОмлет", ""));
    let model: Arc<dyn GenerativeModel> = fake.clone();
    let base = spawn(Some(model)).await;

    let response = Client::new()
        .post(format!("{}/extract-text-from-image", base))
        .json(&json!({ "image": "AAAA" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["extractedText"], "Рецепт №3\nОмлет");

    let requests = fake.requests.lock().unwrap();
    assert_eq!(requests[0].task, Task::ExtractText);
    match &requests[0].parts[1] {
        Part::Image(image) => {
            assert_eq!(image.mime_type, "image/jpeg");
            assert_eq!(image.data, "AAAA");
        }
        other => panic!("expected image part, got {:?}", other),
    }
}

#[tokio::test]
async fn test_extract_accepts_data_uri() {
    let fake = Arc::new(FakeModel::new("Рецепт №3", ""));
    let model: Arc<dyn GenerativeModel> = fake.clone();
    let base = spawn(Some(model)).await;

    let response = Client::new()
        .post(format!("{}/extract-text-from-image", base))
        .json(&json!({ "image": "data:image/png;base64,AAAA" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let requests = fake.requests.lock().unwrap();
    match &requests[0].parts[1] {
        Part::Image(image) => {
            assert_eq!(image.mime_type, "image/png");
            assert_eq!(image.data, "AAAA");
        }
        other => panic!("expected image part, got {:?}", other),
    }
}

#[tokio::test]
async fn test_extract_model_failure() {
    let model: Arc<dyn GenerativeModel> = Arc::new(FakeModel::failing("vision model overloaded"));
    let base = spawn(Some(model)).await;

    let response = Client::new()
        .post(format!("{}/extract-text-from-image", base))
        .json(&json!({ "image": "AAAA", "mimeType": "image/png" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.error, "Failed to extract text: vision model overloaded");
}

#[tokio::test]
async fn test_generate_returns_bare_post() {
    let mut raw = sample_post();
    raw.recipe = "Свёкла<br>Отварите\\nНатрите".to_string();
    let fake = Arc::new(FakeModel::new("", &wrapped_reply(&raw)));
    let model: Arc<dyn GenerativeModel> = fake.clone();
    let base = spawn(Some(model)).await;

    let response = Client::new()
        .post(format!("{}/generate-post", base))
        .json(&json!({
            "text": "Рецепт №12: ...",
            "images": [{ "mimeType": "image/png", "data": "AAAA" }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let post: PostContent = response.json().await.unwrap();
    assert_eq!(post.number, "12");
    assert_eq!(post.recipe, "Свёкла\nОтварите\nНатрите");

    let requests = fake.requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.task, Task::GeneratePost);
    assert_eq!(request.system_instruction.as_deref(), Some("system prompt"));
    assert!(matches!(request.parts[0], Part::Image(_)));
    assert!(matches!(request.parts[1], Part::Text(_)));
}

#[tokio::test]
async fn test_generate_schema_violation() {
    let model: Arc<dyn GenerativeModel> =
        Arc::new(FakeModel::new("", r#"{"something_else": {}}"#));
    let base = spawn(Some(model)).await;

    let response = Client::new()
        .post(format!("{}/generate-post", base))
        .json(&json!({ "text": "Рецепт", "images": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = response.json().await.unwrap();
    assert!(error.error.starts_with("Failed to generate post: Invalid JSON structure"));
}

#[tokio::test]
async fn test_generate_requires_text_or_images() {
    let model: Arc<dyn GenerativeModel> = Arc::new(FakeModel::new("", ""));
    let base = spawn(Some(model)).await;

    let response = Client::new()
        .post(format!("{}/generate-post", base))
        .json(&json!({ "text": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_accepts_multi_megabyte_image() {
    let fake = Arc::new(FakeModel::new("", &wrapped_reply(&sample_post())));
    let model: Arc<dyn GenerativeModel> = fake.clone();
    let base = spawn(Some(model)).await;

    // An unresized phone photo, base64-encoded
    let photo = ImagePayload::new("image/jpeg", "A".repeat(3 * 1024 * 1024));
    let gateway = GenerationGateway::new(format!("{}/generate-post", base));
    let post = gateway
        .generate_post("Рецепт №12", std::slice::from_ref(&photo))
        .await
        .unwrap();
    assert_eq!(post, sample_post());

    let requests = fake.requests.lock().unwrap();
    match &requests[0].parts[0] {
        Part::Image(image) => assert_eq!(image.data.len(), 3 * 1024 * 1024),
        other => panic!("expected image part, got {:?}", other),
    }
}

#[tokio::test]
async fn test_oversized_body_gets_json_error() {
    let model: Arc<dyn GenerativeModel> = Arc::new(FakeModel::new("", ""));
    let base = spawn_with(AppState::new(Some(model), contract()).with_body_limit(1024)).await;

    let response = Client::new()
        .post(format!("{}/generate-post", base))
        .json(&json!({ "text": "Рецепт ".repeat(300), "images": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.error, "Request body is too large.");
}

#[tokio::test]
async fn test_session_against_live_endpoints() {
    let model: Arc<dyn GenerativeModel> = Arc::new(FakeModel::new(
        "Рецепт №12: салат из свёклы",
        &wrapped_reply(&sample_post()),
    ));
    let base = spawn(Some(model)).await;

    let mut webhook = Server::new_async().await;
    let export_mock = webhook
        .mock("POST", "/hook")
        .match_body(Matcher::PartialJson(json!({
            "post_content": { "Номер": "12" }
        })))
        .with_status(200)
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.api_base_url = base;
    config.webhook_url = format!("{}/hook", webhook.url());
    let mut session = Session::new(
        Gateways::from_config(&config),
        config.export_status_window(),
    );

    session.select_image("page.png", &png_bytes(1600, 1200)).await;
    assert_eq!(session.extraction_state(), &RequestState::Success);
    assert_eq!(session.extracted_text(), "Рецепт №12: салат из свёклы");

    session.submit().await;
    assert_eq!(session.generation_state(), &RequestState::Success);
    assert_eq!(session.post(), Some(&sample_post()));

    session.export().await;
    assert_eq!(session.export_state(), RequestState::Success);
    export_mock.assert_async().await;
}
