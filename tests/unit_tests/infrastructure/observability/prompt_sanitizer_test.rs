use whisperlog::infrastructure::observability::sanitize_prompt;

#[test]
fn given_blank_prompt_when_sanitizing_then_placeholder() {
    assert_eq!(sanitize_prompt("  \n "), "[EMPTY]");
}

#[test]
fn given_short_prompt_when_sanitizing_then_kept_as_is() {
    assert_eq!(sanitize_prompt("  standup notes "), "standup notes");
}

#[test]
fn given_long_multibyte_prompt_when_sanitizing_then_truncated_on_char_boundary() {
    let prompt = "é".repeat(150);

    let sanitized = sanitize_prompt(&prompt);

    assert!(sanitized.starts_with(&"é".repeat(100)));
    assert!(sanitized.ends_with("... (150 chars total)"));
}

#[test]
fn given_credentials_when_sanitizing_then_redacted() {
    let sanitized = sanitize_prompt(
        "Authorization: Bearer abc.def.ghi key sk-ant-abcdef123456 password=hunter2",
    );

    assert!(sanitized.contains("Bearer [REDACTED]"));
    assert!(sanitized.contains("[REDACTED_KEY]"));
    assert!(sanitized.contains("password=[REDACTED]"));
    assert!(!sanitized.contains("hunter2"));
    assert!(!sanitized.contains("abcdef123456"));
}

#[test]
fn given_email_address_when_sanitizing_then_masked() {
    let sanitized = sanitize_prompt("mail ana@example.com about the launch");

    assert_eq!(sanitized, "mail [EMAIL] about the launch");
}
