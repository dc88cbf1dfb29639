use std::sync::Arc;

use chrono::Duration;

use whisperlog::application::ports::{TokenService, UserRepository};
use whisperlog::application::services::{
    AuthError, AuthPolicy, AuthService, EMAIL_CONNECTION_FAILED, EMAIL_CONNECTION_OK,
    FORGOT_PASSWORD_MESSAGE, OtpRejection,
};
use whisperlog::infrastructure::auth::JwtTokenService;
use whisperlog::infrastructure::persistence::InMemoryRepository;

use crate::support::{PlainTextHasher, RecordingEmailSender};

struct Fixture {
    repo: Arc<InMemoryRepository>,
    email: Arc<RecordingEmailSender>,
    tokens: Arc<JwtTokenService>,
    service: AuthService,
}

fn fixture_with(email: RecordingEmailSender) -> Fixture {
    let repo = Arc::new(InMemoryRepository::new());
    let email = Arc::new(email);
    let tokens = Arc::new(JwtTokenService::new("test-secret", Duration::hours(1)));
    let service = AuthService::new(
        repo.clone(),
        repo.clone(),
        Arc::new(PlainTextHasher),
        tokens.clone(),
        email.clone(),
        AuthPolicy::default(),
    );
    Fixture {
        repo,
        email,
        tokens,
        service,
    }
}

fn fixture() -> Fixture {
    fixture_with(RecordingEmailSender::default())
}

#[tokio::test]
async fn given_new_user_when_registering_then_token_identifies_user_and_welcome_sent() {
    let fx = fixture();

    let session = fx
        .service
        .register("ana", "Ana@Example.com", "secret1")
        .await
        .unwrap();

    assert_eq!(session.user.email, "ana@example.com");
    let claims = fx.tokens.verify(&session.access_token).unwrap();
    assert_eq!(claims.user_id, session.user.id);
    assert_eq!(claims.username, "ana");
    assert_eq!(
        fx.email.welcomes.lock().unwrap().as_slice(),
        ["ana@example.com".to_string()]
    );
}

#[tokio::test]
async fn given_email_taken_in_other_case_when_registering_then_conflict() {
    let fx = fixture();
    fx.service
        .register("ana", "ana@example.com", "secret1")
        .await
        .unwrap();

    let err = fx
        .service
        .register("ana2", "ANA@example.com", "secret1")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Conflict));

    let err = fx
        .service
        .register("ana", "other@example.com", "secret1")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Conflict));
}

#[tokio::test]
async fn given_invalid_fields_when_registering_then_validation_names_the_field() {
    let fx = fixture();

    let err = fx
        .service
        .register("ana", "not-an-email", "secret1")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation { field: "email", .. }));

    let err = fx
        .service
        .register("ana", "ana@example.com", "123")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation { field: "password", .. }));

    let err = fx
        .service
        .register("  ", "ana@example.com", "secret1")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation { field: "username", .. }));
}

#[tokio::test]
async fn given_failing_mailer_when_registering_then_registration_still_succeeds() {
    let fx = fixture_with(RecordingEmailSender::failing());

    let session = fx
        .service
        .register("ana", "ana@example.com", "secret1")
        .await;

    assert!(session.is_ok());
}

#[tokio::test]
async fn given_registered_user_when_logging_in_then_credentials_are_checked() {
    let fx = fixture();
    fx.service
        .register("ana", "ana@example.com", "secret1")
        .await
        .unwrap();

    let session = fx.service.login("ANA@example.com", "secret1").await.unwrap();
    assert_eq!(session.user.username, "ana");

    let err = fx
        .service
        .login("ana@example.com", "wrong-pass")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let err = fx
        .service
        .login("nobody@example.com", "secret1")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn given_unknown_email_when_requesting_reset_then_same_message_and_no_mail() {
    let fx = fixture();

    let message = fx
        .service
        .forgot_password("ghost@example.com")
        .await
        .unwrap();

    assert_eq!(message, FORGOT_PASSWORD_MESSAGE);
    assert!(fx.email.reset_codes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn given_valid_otp_when_resetting_then_new_password_works_and_code_is_spent() {
    let fx = fixture();
    fx.service
        .register("ana", "ana@example.com", "secret1")
        .await
        .unwrap();

    fx.service.forgot_password("ana@example.com").await.unwrap();
    let code = fx.email.last_code_for("ana@example.com").unwrap();
    assert_eq!(code.len(), 6);

    fx.service
        .reset_password("ana@example.com", &code, "brand-new")
        .await
        .unwrap();

    assert!(fx.service.login("ana@example.com", "brand-new").await.is_ok());
    assert!(fx.service.login("ana@example.com", "secret1").await.is_err());

    let err = fx
        .service
        .reset_password("ana@example.com", &code, "another1")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::InvalidOtp(OtpRejection::ExpiredOrMissing)
    ));
}

#[tokio::test]
async fn given_five_wrong_codes_when_resetting_then_real_code_is_burned() {
    let fx = fixture();
    fx.service
        .register("ana", "ana@example.com", "secret1")
        .await
        .unwrap();
    fx.service.forgot_password("ana@example.com").await.unwrap();
    let code = fx.email.last_code_for("ana@example.com").unwrap();

    for _ in 0..5 {
        let err = fx
            .service
            .reset_password("ana@example.com", "000000", "brand-new")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidOtp(OtpRejection::Mismatch)));
    }

    let err = fx
        .service
        .reset_password("ana@example.com", &code, "brand-new")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::InvalidOtp(OtpRejection::ExpiredOrMissing)
    ));
}

#[tokio::test]
async fn given_unknown_email_when_resetting_then_invalid_otp() {
    let fx = fixture();

    let err = fx
        .service
        .reset_password("ghost@example.com", "123456", "brand-new")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AuthError::InvalidOtp(OtpRejection::UnknownEmail)
    ));
}

#[tokio::test]
async fn given_mailer_down_when_requesting_reset_then_email_delivery_error() {
    let fx = fixture_with(RecordingEmailSender::failing());
    fx.service
        .register("ana", "ana@example.com", "secret1")
        .await
        .unwrap();

    let err = fx
        .service
        .forgot_password("ana@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::EmailDelivery(_)));
}

#[tokio::test]
async fn given_user_when_fetching_profile_then_current_record_returned() {
    let fx = fixture();
    let session = fx
        .service
        .register("ana", "ana@example.com", "secret1")
        .await
        .unwrap();

    let user = fx.service.profile(session.user.id).await.unwrap();
    assert_eq!(user.username, "ana");

    let stored = UserRepository::find_by_id(fx.repo.as_ref(), session.user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.password_hash.as_deref(), Some("plain:secret1"));
}

#[tokio::test]
async fn given_mailer_state_when_testing_connection_then_status_reflects_it() {
    let ok = fixture().service.test_email_connection().await;
    assert!(ok.success);
    assert_eq!(ok.message, EMAIL_CONNECTION_OK);

    let down = fixture_with(RecordingEmailSender::failing())
        .service
        .test_email_connection()
        .await;
    assert!(!down.success);
    assert_eq!(down.message, EMAIL_CONNECTION_FAILED);
}
