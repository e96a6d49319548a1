use crate::client::SubmissionClient;
use crate::config::ProviderConfig;
use crate::error::DecorError;
use crate::models::{GenerationRequest, ImageMime, RequestContext};
use crate::orchestrator::{build_prompt, GenerationSettings, VariationOrchestrator};
use crate::prepare::ImagePreparer;
use crate::provider::ImageClient;
use crate::server::{self, AppState};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use std::{io::Cursor, sync::Arc, time::Duration};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROVIDER_PATH: &str = "/v1/images/generations";

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([180, 140, 90])));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn test_request() -> GenerationRequest {
    GenerationRequest {
        subject_text: "living room".to_string(),
        style_text: "bohemian".to_string(),
        image: vec![0xFF, 0xD8, 0xFF],
        mime_type: ImageMime::Jpeg,
    }
}

fn orchestrator_for(mock_uri: &str) -> VariationOrchestrator {
    let client = ImageClient::new(
        ProviderConfig::new()
            .with_credentials("test-key")
            .with_base_url(format!("{}{}", mock_uri, PROVIDER_PATH)),
    )
    .unwrap();

    VariationOrchestrator::new(client)
        .with_settings(GenerationSettings::new().with_inter_call_delay(Duration::ZERO))
}

async fn spawn_app(mock_uri: &str) -> String {
    let state = Arc::new(AppState {
        orchestrator: orchestrator_for(mock_uri),
    });
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_batch_of_five_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PROVIDER_PATH))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "dall-e-3",
            "prompt": build_prompt("living room", "bohemian"),
            "n": 1,
            "size": "1024x1024",
            "quality": "standard",
            "style": "natural",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "url": "https://provider.example/generated.png" }]
        })))
        .expect(5)
        .mount(&mock_server)
        .await;

    let orchestrator = orchestrator_for(&mock_server.uri());
    let variations = orchestrator
        .generate_batch(&test_request(), &RequestContext::anonymous())
        .await
        .unwrap();

    assert_eq!(variations.len(), 5);
    for (i, variation) in variations.iter().enumerate() {
        assert_eq!(variation.title, format!("Design {}", i + 1));
        assert_eq!(variation.description, "living room styled with bohemian");
        assert_eq!(variation.image, "https://provider.example/generated.png");
    }
}

#[tokio::test]
async fn test_variations_follow_call_order() {
    let mock_server = MockServer::start().await;

    for i in 1..=5 {
        Mock::given(method("POST"))
            .and(path(PROVIDER_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "url": format!("https://provider.example/{}.png", i) }]
            })))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
    }

    let orchestrator = orchestrator_for(&mock_server.uri());
    let variations = orchestrator
        .generate_batch(&test_request(), &RequestContext::anonymous())
        .await
        .unwrap();

    for (i, variation) in variations.iter().enumerate() {
        assert_eq!(
            variation.image,
            format!("https://provider.example/{}.png", i + 1)
        );
    }
}

#[tokio::test]
async fn test_empty_image_fails_before_any_provider_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let orchestrator = orchestrator_for(&mock_server.uri());
    let mut request = test_request();
    request.image.clear();

    let err = orchestrator
        .generate_batch(&request, &RequestContext::anonymous())
        .await
        .unwrap_err();

    assert!(matches!(err, DecorError::ValidationError(_)));
}

#[tokio::test]
async fn test_third_call_failure_aborts_batch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PROVIDER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "url": "https://provider.example/ok.png" }]
        })))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(PROVIDER_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "message": "rate limited" }
        })))
        .mount(&mock_server)
        .await;

    let orchestrator = orchestrator_for(&mock_server.uri());
    let err = orchestrator
        .generate_batch(&test_request(), &RequestContext::for_user("u123"))
        .await
        .unwrap_err();

    assert!(matches!(err, DecorError::ProviderError(_)));

    // Earlier successes are discarded and the remaining calls never go out.
    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 3);
}

#[tokio::test]
async fn test_provider_response_without_url_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PROVIDER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&mock_server)
        .await;

    let orchestrator = orchestrator_for(&mock_server.uri());
    let err = orchestrator
        .generate_batch(&test_request(), &RequestContext::anonymous())
        .await
        .unwrap_err();

    assert!(matches!(err, DecorError::ProviderError(_)));
}

#[tokio::test]
async fn test_endpoint_full_flow_with_prepared_image() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PROVIDER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "url": "https://provider.example/design.png" }]
        })))
        .expect(5)
        .mount(&mock_server)
        .await;

    let app_url = spawn_app(&mock_server.uri()).await;

    let preparer = ImagePreparer::new();
    let prepared = preparer
        .finalize(preparer.prepare(&png_bytes(640, 480)).unwrap())
        .unwrap();

    let batch = SubmissionClient::new(&app_url)
        .submit(&prepared, "living room", "bohemian")
        .await
        .unwrap();

    assert_eq!(batch.variations.len(), 5);
    assert_eq!(batch.variations[0].title, "Design 1");
    assert_eq!(batch.variations[4].title, "Design 5");
    assert_eq!(
        batch.variations[2].description,
        "living room styled with bohemian"
    );
}

#[tokio::test]
async fn test_endpoint_missing_image_returns_400() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app_url = spawn_app(&mock_server.uri()).await;

    let form = reqwest::multipart::Form::new()
        .text("prompt", "bohemian")
        .text("textInput", "living room");

    let response = reqwest::Client::new()
        .post(format!("{}/api/generate-variations", app_url))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No image provided");
}

#[tokio::test]
async fn test_endpoint_rejects_unsupported_content_type() {
    let mock_server = MockServer::start().await;
    let app_url = spawn_app(&mock_server.uri()).await;

    let part = reqwest::multipart::Part::bytes(vec![0x47, 0x49, 0x46])
        .file_name("room.gif")
        .mime_str("image/gif")
        .unwrap();
    let form = reqwest::multipart::Form::new()
        .part("image", part)
        .text("prompt", "bohemian")
        .text("textInput", "living room");

    let response = reqwest::Client::new()
        .post(format!("{}/api/generate-variations", app_url))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Only JPEG and PNG images are accepted");
}

#[tokio::test]
async fn test_endpoint_provider_failure_returns_500_without_partial_batch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PROVIDER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "url": "https://provider.example/ok.png" }]
        })))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(PROVIDER_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&mock_server)
        .await;

    let app_url = spawn_app(&mock_server.uri()).await;

    let preparer = ImagePreparer::new();
    let prepared = preparer.prepare(&png_bytes(256, 256)).unwrap();
    let part = reqwest::multipart::Part::bytes(prepared.bytes.clone())
        .file_name("room.jpg")
        .mime_str("image/jpeg")
        .unwrap();
    let form = reqwest::multipart::Form::new()
        .part("image", part)
        .text("prompt", "bohemian")
        .text("textInput", "living room");

    let response = reqwest::Client::new()
        .post(format!("{}/api/generate-variations", app_url))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to generate variations");
    assert!(body["details"].is_string());
    assert!(body.get("variations").is_none());
}
