use std::sync::LazyLock;

use regex::Regex;

const MAX_VISIBLE_CHARS: usize = 100;

static SECRET_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(r"(?i)bearer\s+[A-Za-z0-9._~+/=-]+").expect("valid bearer regex"),
            "Bearer [REDACTED]",
        ),
        (
            Regex::new(r"\b(sk-(?:ant-)?[A-Za-z0-9_-]{8,}|AIza[A-Za-z0-9_-]{20,})")
                .expect("valid api key regex"),
            "[REDACTED_KEY]",
        ),
        (
            Regex::new(r"(?i)\b(api_key|password|secret|token|otp)=[^\s&'\x22]+")
                .expect("valid key=value regex"),
            "${1}=[REDACTED]",
        ),
        (
            Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
                .expect("valid email regex"),
            "[EMAIL]",
        ),
    ]
});

/// Shortens user content for debug logs and masks credentials and email addresses.
pub fn sanitize_prompt(prompt: &str) -> String {
    let trimmed = prompt.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let total_chars = trimmed.chars().count();
    let visible = if total_chars > MAX_VISIBLE_CHARS {
        let cut: String = trimmed.chars().take(MAX_VISIBLE_CHARS).collect();
        format!("{}... ({} chars total)", cut, total_chars)
    } else {
        trimmed.to_string()
    };

    SECRET_PATTERNS
        .iter()
        .fold(visible, |text, (pattern, replacement)| {
            pattern.replace_all(&text, *replacement).into_owned()
        })
}
