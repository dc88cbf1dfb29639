use std::time::Duration;

use whisperlog::infrastructure::llm::ProviderKind;
use whisperlog::infrastructure::observability::TracingConfig;
use whisperlog::presentation::Environment;
use whisperlog::presentation::config::{LoggingSettings, ProcessingSettings, Settings};

#[test]
fn given_environment_names_when_parsing_then_aliases_are_accepted() {
    assert_eq!(
        Environment::try_from("development".to_string()),
        Ok(Environment::Local)
    );
    assert_eq!(
        Environment::try_from("PRODUCTION".to_string()),
        Ok(Environment::Prod)
    );
    assert!(Environment::try_from("staging".to_string()).is_err());
    assert!(Environment::Prod.is_production());
    assert!(!Environment::Test.is_production());
}

#[test]
fn given_default_settings_when_created_then_routes_claude_for_text_and_openai_for_audio() {
    let settings = Settings::default();

    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.ai.text_provider, ProviderKind::Claude);
    assert_eq!(settings.ai.audio_provider, ProviderKind::OpenAi);
    assert!(settings.auth.jwt_secret.is_none());
    assert_eq!(settings.auth.token_lifetime(), chrono::Duration::days(7));
}

#[test]
fn given_default_auth_settings_when_building_policy_then_otp_limits_apply() {
    let policy = Settings::default().auth.policy();

    assert_eq!(policy.min_password_length, 6);
    assert_eq!(policy.otp_ttl, chrono::Duration::minutes(10));
    assert_eq!(policy.max_otp_attempts, 5);
}

#[test]
fn given_zero_attempts_when_building_retry_policy_then_at_least_one_attempt() {
    let settings = ProcessingSettings {
        max_attempts: 0,
        base_delay_ms: 50,
        max_delay_ms: 400,
        redact_audio: false,
    };

    let policy = settings.retry_policy();

    assert_eq!(policy.max_attempts, 1);
    assert_eq!(policy.base_delay, Duration::from_millis(50));
    assert_eq!(policy.max_delay, Duration::from_millis(400));
}

#[test]
fn given_logging_settings_when_building_tracing_config_then_environment_is_carried() {
    let logging = LoggingSettings {
        level: "warn".to_string(),
        enable_json: true,
    };

    let config = logging.tracing_config(Environment::Prod);

    assert_eq!(config.environment, "prod");
    assert!(config.json_format);
    assert_eq!(config.default_filter, "warn");
}

#[test]
fn given_default_tracing_config_when_created_then_plain_text_output() {
    let config = TracingConfig::default();

    assert!(!config.json_format);
    assert!(!config.environment.is_empty());
}
