use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use whisperlog::application::ports::{EmailError, EmailSender, FormattingProvider};
use whisperlog::application::services::{ProviderRoutes, RetryPolicy};
use whisperlog::infrastructure::auth::{BcryptPasswordHasher, JwtTokenService};
use whisperlog::infrastructure::llm::MockFormattingProvider;
use whisperlog::infrastructure::persistence::InMemoryRepository;
use whisperlog::presentation::{AppDependencies, AppPolicies, AppState, create_router};

#[derive(Default)]
struct CapturingEmailSender {
    codes: Mutex<Vec<String>>,
}

#[async_trait]
impl EmailSender for CapturingEmailSender {
    async fn send_welcome(&self, _to: &str, _username: &str) -> Result<(), EmailError> {
        Ok(())
    }

    async fn send_password_reset_otp(&self, _to: &str, code: &str) -> Result<(), EmailError> {
        self.codes.lock().unwrap().push(code.to_string());
        Ok(())
    }

    async fn test_connection(&self) -> Result<(), EmailError> {
        Ok(())
    }
}

struct TestApp {
    router: Router,
    email: Arc<CapturingEmailSender>,
}

impl TestApp {
    fn new() -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let email = Arc::new(CapturingEmailSender::default());
        let provider: Arc<dyn FormattingProvider> =
            Arc::new(MockFormattingProvider::new(Duration::ZERO));

        let state = AppState::new(
            AppDependencies {
                users: repo.clone(),
                otps: repo.clone(),
                templates: repo.clone(),
                contents: repo,
                providers: ProviderRoutes {
                    text: provider.clone(),
                    audio: provider,
                },
                hasher: Arc::new(BcryptPasswordHasher::new(4)),
                token_service: Arc::new(JwtTokenService::new(
                    "test-secret",
                    chrono::Duration::hours(1),
                )),
                email_sender: email.clone(),
            },
            AppPolicies {
                retry: RetryPolicy {
                    max_attempts: 1,
                    base_delay: Duration::from_millis(1),
                    max_delay: Duration::from_millis(1),
                },
                ..AppPolicies::default()
            },
            CancellationToken::new(),
        );

        Self {
            router: create_router(state),
            email,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn register(&self, username: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "secret1"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn create_format(&self, token: &str, title: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/user-formats",
                Some(token),
                Some(json!({
                    "title": title,
                    "iconName": "note",
                    "format": "## Notes\n\n**Date:** {date}\n\n{discussion}"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create format failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    async fn process_text(&self, token: &str, format_id: &str, content: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/content-processing/process",
                Some(token),
                Some(json!({
                    "formatId": format_id,
                    "contentType": "text",
                    "content": content
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "process failed: {}", body);
        body
    }
}

#[tokio::test]
async fn given_running_app_when_checking_health_then_healthy() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn given_registered_user_when_logging_in_and_reading_profile_then_identity_matches() {
    let app = TestApp::new();
    app.register("ana").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "ANA@example.com", "password": "secret1"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "ana");
    let token = body["access_token"].as_str().unwrap().to_string();

    let (status, profile) = app.send(Method::GET, "/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["username"], "ana");
    assert_eq!(profile["email"], "ana@example.com");
    assert_eq!(profile["userId"], body["user"]["id"]);
}

#[tokio::test]
async fn given_existing_email_when_registering_then_conflict() {
    let app = TestApp::new();
    app.register("ana").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({"username": "ana2", "email": "ana@example.com", "password": "secret1"})),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["type"], "conflict");
}

#[tokio::test]
async fn given_short_password_when_registering_then_validation_error_names_field() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({"username": "ana", "email": "ana@example.com", "password": "123"})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "validation_error");
    assert_eq!(body["error"]["field"], "password");
}

#[tokio::test]
async fn given_wrong_password_when_logging_in_then_unauthorized() {
    let app = TestApp::new();
    app.register("ana").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "ana@example.com", "password": "nope-nope"})),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["type"], "unauthorized");
}

#[tokio::test]
async fn given_missing_or_bad_token_when_calling_protected_route_then_unauthorized() {
    let app = TestApp::new();

    let (status, _) = app.send(Method::GET, "/user-formats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::GET, "/content-processing", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn given_forgot_password_when_resetting_with_emailed_otp_then_new_password_works() {
    let app = TestApp::new();
    app.register("ana").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/forgot-password",
            None,
            Some(json!({"email": "ana@example.com"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "If the email exists, you will receive a password reset OTP"
    );
    let code = app.email.codes.lock().unwrap().last().cloned().unwrap();

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/reset-password",
            None,
            Some(json!({"email": "ana@example.com", "otp": "000000", "newPassword": "brand-new"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "otp");

    let (status, _) = app
        .send(
            Method::POST,
            "/auth/reset-password",
            None,
            Some(json!({"email": "ana@example.com", "otp": code, "newPassword": "brand-new"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "ana@example.com", "password": "brand-new"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn given_unknown_email_when_requesting_reset_then_same_generic_message() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/forgot-password",
            None,
            Some(json!({"email": "ghost@example.com"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "If the email exists, you will receive a password reset OTP"
    );
    assert!(app.email.codes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn given_authenticated_user_when_testing_email_connection_then_success_reported() {
    let app = TestApp::new();
    let token = app.register("ana").await;

    let (status, body) = app
        .send(Method::GET, "/email/test-connection", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn given_user_formats_when_managing_crud_then_lifecycle_is_respected() {
    let app = TestApp::new();
    let token = app.register("ana").await;
    let id = app.create_format(&token, "Standup").await;

    let (status, body) = app
        .send(Method::GET, &format!("/user-formats/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Standup");
    assert_eq!(body["iconName"], "note");
    assert_eq!(body["isActive"], true);

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/user-formats/{}", id),
            Some(&token),
            Some(json!({"title": "Daily"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Daily");
    assert_eq!(body["iconName"], "note");

    let (status, body) = app
        .send(Method::DELETE, &format!("/user-formats/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User format deleted successfully");

    let (status, body) = app
        .send(Method::GET, &format!("/user-formats/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "not_found");
}

#[tokio::test]
async fn given_many_formats_when_listing_then_paginated_and_searchable() {
    let app = TestApp::new();
    let token = app.register("ana").await;
    for i in 0..12 {
        app.create_format(&token, &format!("Meeting {:02}", i)).await;
    }
    app.create_format(&token, "Journal").await;

    let (status, body) = app
        .send(
            Method::GET,
            "/user-formats?page=2&limit=5&search=meeting&sortBy=title&sortOrder=asc",
            Some(&token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 12);
    assert_eq!(body["pagination"]["totalPages"], 3);
    assert_eq!(body["pagination"]["hasNext"], true);
    assert_eq!(body["pagination"]["hasPrev"], true);
    assert_eq!(body["data"][0]["title"], "Meeting 05");

    let (status, body) = app
        .send(Method::GET, "/user-formats?sortBy=color", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "sortBy");
}

#[tokio::test]
async fn given_other_users_format_when_accessing_then_not_found() {
    let app = TestApp::new();
    let ana = app.register("ana").await;
    let bo = app.register("bo").await;
    let id = app.create_format(&ana, "Private").await;

    let (status, _) = app
        .send(Method::GET, &format!("/user-formats/{}", id), Some(&bo), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::DELETE, &format!("/user-formats/{}", id), Some(&bo), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_malformed_id_when_fetching_format_then_validation_error() {
    let app = TestApp::new();
    let token = app.register("ana").await;

    let (status, body) = app
        .send(Method::GET, "/user-formats/not-a-uuid", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "id");
}

#[tokio::test]
async fn given_text_content_when_processing_then_record_is_returned_and_listed() {
    let app = TestApp::new();
    let token = app.register("ana").await;
    let format_id = app.create_format(&token, "Standup").await;

    let record = app.process_text(&token, &format_id, "shipped the parser").await;

    assert_eq!(record["contentType"], "text");
    assert_eq!(record["originalContent"], "shipped the parser");
    assert!(
        record["processedContent"]
            .as_str()
            .unwrap()
            .ends_with("shipped the parser")
    );
    assert_eq!(record["user"]["username"], "ana");
    assert_eq!(record["format"]["id"], format_id.as_str());
    assert_eq!(record["processingMetadata"]["aiModel"], "mock-formatter");
    assert_eq!(record["isActive"], true);

    let (status, body) = app
        .send(Method::GET, "/content-processing?contentType=text", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["id"], record["id"]);

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/content-processing/format/{}", format_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["format"]["title"], "Standup");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn given_processed_record_when_editing_and_deleting_then_changes_are_visible() {
    let app = TestApp::new();
    let token = app.register("ana").await;
    let format_id = app.create_format(&token, "Standup").await;
    let record = app.process_text(&token, &format_id, "notes").await;
    let uri = format!("/content-processing/{}", record["id"].as_str().unwrap());

    let (status, body) = app
        .send(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({"processedContent": "# Edited"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processedContent"], "# Edited");
    assert_eq!(body["originalContent"], "notes");

    let (status, body) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processedContent"], "# Edited");

    let (status, body) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Processed content deleted successfully");

    let (status, _) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_processed_records_when_reading_stats_then_overview_and_top_formats_returned() {
    let app = TestApp::new();
    let token = app.register("ana").await;
    let standup = app.create_format(&token, "Standup").await;
    let journal = app.create_format(&token, "Journal").await;
    app.process_text(&token, &standup, "one").await;
    app.process_text(&token, &standup, "two").await;
    app.process_text(&token, &journal, "three").await;

    let (status, body) = app
        .send(Method::GET, "/content-processing/stats", Some(&token), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["overview"]["totalProcessed"], 3);
    assert_eq!(body["overview"]["textContent"], 3);
    assert_eq!(body["overview"]["audioContent"], 0);
    assert_eq!(body["topFormats"][0]["formatTitle"], "Standup");
    assert_eq!(body["topFormats"][0]["count"], 2);
}

#[tokio::test]
async fn given_invalid_process_request_when_submitting_then_rejected_with_field() {
    let app = TestApp::new();
    let token = app.register("ana").await;
    let format_id = app.create_format(&token, "Standup").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/content-processing/process",
            Some(&token),
            Some(json!({"formatId": format_id, "contentType": "video", "content": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "contentType");

    let (status, _) = app
        .send(
            Method::POST,
            "/content-processing/process",
            Some(&token),
            Some(json!({"formatId": format_id, "contentType": "text", "content": "   "})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_other_users_format_when_processing_then_not_found() {
    let app = TestApp::new();
    let ana = app.register("ana").await;
    let bo = app.register("bo").await;
    let format_id = app.create_format(&ana, "Private").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/content-processing/process",
            Some(&bo),
            Some(json!({"formatId": format_id, "contentType": "text", "content": "x"})),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "not_found");
}

#[tokio::test]
async fn given_inverted_date_range_when_listing_content_then_validation_error() {
    let app = TestApp::new();
    let token = app.register("ana").await;

    let (status, body) = app
        .send(
            Method::GET,
            "/content-processing?dateFrom=2025-03-10&dateTo=2025-03-01",
            Some(&token),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "dateFrom");
}
