use std::sync::{Arc, Mutex};

use axum::Router;
use axum::http::HeaderMap;
use axum::routing::{get, post};

use whisperlog::application::ports::{FormattingProvider, ProviderError};
use whisperlog::infrastructure::llm::{GeminiConfig, GeminiProvider};

use crate::support::{format_spec, json_response, start_mock_server};

const GENERATE_PATH: &str = "/models/gemini-test:generateContent";

fn provider(base_url: &str) -> GeminiProvider {
    GeminiProvider::new(
        reqwest::Client::new(),
        GeminiConfig {
            api_key: Some("AIza-test".to_string()),
            base_url: base_url.to_string(),
            model: "gemini-test".to_string(),
            ..GeminiConfig::default()
        },
    )
}

async fn generate_server(status: u16, body: &'static str) -> (String, tokio::sync::oneshot::Sender<()>) {
    let app = Router::new().route(
        GENERATE_PATH,
        post(move || async move { json_response(status, body) }),
    );
    start_mock_server(app).await
}

#[tokio::test]
async fn given_multi_part_candidate_when_formatting_then_parts_are_joined() {
    let key: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let captured = key.clone();
    let app = Router::new().route(
        GENERATE_PATH,
        post(move |headers: HeaderMap| {
            let captured = captured.clone();
            async move {
                *captured.lock().unwrap() = headers
                    .get("x-goog-api-key")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                json_response(
                    200,
                    r##"{"candidates":[{"content":{"parts":[{"text":"# Notes\n"},{"text":"Done."}]}}]}"##,
                )
            }
        }),
    );
    let (base_url, _shutdown) = start_mock_server(app).await;

    let result = provider(&base_url)
        .format_text("notes", &format_spec("# Notes"))
        .await
        .unwrap();

    assert_eq!(result, "# Notes\nDone.");
    assert_eq!(key.lock().unwrap().as_deref(), Some("AIza-test"));
}

#[tokio::test]
async fn given_blocked_prompt_when_formatting_then_invalid_response() {
    let (base_url, _shutdown) =
        generate_server(200, r#"{"candidates":[],"promptFeedback":{"blockReason":"SAFETY"}}"#).await;

    let result = provider(&base_url)
        .format_text("notes", &format_spec("# Notes"))
        .await;

    assert!(matches!(result, Err(ProviderError::InvalidResponse(msg)) if msg.contains("SAFETY")));
}

#[tokio::test]
async fn given_resource_exhausted_when_formatting_then_quota_exceeded() {
    let (base_url, _shutdown) = generate_server(
        429,
        r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#,
    )
    .await;

    let result = provider(&base_url)
        .format_text("notes", &format_spec("# Notes"))
        .await;

    assert!(matches!(result, Err(ProviderError::QuotaExceeded(_))));
}

#[tokio::test]
async fn given_audio_when_formatting_then_recording_is_sent_inline() {
    let body: Arc<Mutex<Option<serde_json::Value>>> = Arc::new(Mutex::new(None));
    let captured = body.clone();
    let app = Router::new().route(
        GENERATE_PATH,
        post(move |raw: String| {
            let captured = captured.clone();
            async move {
                *captured.lock().unwrap() = serde_json::from_str(&raw).ok();
                json_response(
                    200,
                    r##"{"candidates":[{"content":{"parts":[{"text":"# Voice memo"}]}}]}"##,
                )
            }
        }),
    );
    let (base_url, _shutdown) = start_mock_server(app).await;

    let result = provider(&base_url)
        .format_audio(
            "data:audio/webm;base64,UklGRiQAAABXQVZF",
            &format_spec("# Notes"),
        )
        .await
        .unwrap();

    assert_eq!(result, "# Voice memo");
    let sent = body.lock().unwrap().clone().unwrap();
    let parts = &sent["contents"][0]["parts"];
    assert_eq!(parts[1]["inlineData"]["mimeType"], "audio/webm");
    assert_eq!(parts[1]["inlineData"]["data"], "UklGRiQAAABXQVZF");
    assert!(sent["generationConfig"]["maxOutputTokens"].is_number());
}

#[tokio::test]
async fn given_untranscribable_marker_when_formatting_audio_then_transcription_failed() {
    let (base_url, _shutdown) = generate_server(
        200,
        r#"{"candidates":[{"content":{"parts":[{"text":"UNABLE_TO_TRANSCRIBE"}]}}]}"#,
    )
    .await;

    let result = provider(&base_url)
        .format_audio("UklGRiQAAABXQVZF", &format_spec("# Notes"))
        .await;

    assert!(matches!(result, Err(ProviderError::TranscriptionFailed(_))));
}

#[tokio::test]
async fn given_model_metadata_endpoint_when_probing_then_available() {
    let app = Router::new().route(
        "/models/gemini-test",
        get(|| async { json_response(200, r#"{"name":"models/gemini-test"}"#) }),
    );
    let (base_url, _shutdown) = start_mock_server(app).await;

    assert!(provider(&base_url).check_availability().await);
}

#[tokio::test]
async fn given_invalid_key_detail_when_probing_then_authentication_failed() {
    let app = Router::new().route(
        "/models/gemini-test",
        get(|| async {
            json_response(
                400,
                r#"{"error":{"code":400,"status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#,
            )
        }),
    );
    let (base_url, _shutdown) = start_mock_server(app).await;

    let result = provider(&base_url).probe().await;

    assert!(matches!(result, Err(ProviderError::AuthenticationFailed(_))));
}
