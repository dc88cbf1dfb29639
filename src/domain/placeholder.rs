use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Tokens commonly found in meeting-style templates. Checked on every output
/// regardless of the template in use.
pub const WELL_KNOWN_PLACEHOLDERS: [&str; 6] = [
    "{date}",
    "{attendees}",
    "{discussion}",
    "{action_item}",
    "{topic}",
    "{next_steps}",
];

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[A-Za-z_][A-Za-z0-9_]*\}").expect("static placeholder regex"));

/// Distinct `{name}` tokens present in a template body, in order of first use.
pub fn template_placeholders(format: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    PLACEHOLDER
        .find_iter(format)
        .map(|m| m.as_str().to_string())
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

/// Placeholder tokens that survived formatting. Only tokens declared by the
/// template or in `WELL_KNOWN_PLACEHOLDERS` count, so literal braces in user
/// content are not flagged.
pub fn find_leaked_placeholders(output: &str, template_format: &str) -> Vec<String> {
    let mut candidates = template_placeholders(template_format);
    for token in WELL_KNOWN_PLACEHOLDERS {
        if !candidates.iter().any(|c| c == token) {
            candidates.push(token.to_string());
        }
    }

    candidates
        .into_iter()
        .filter(|token| output.contains(token.as_str()))
        .collect()
}
