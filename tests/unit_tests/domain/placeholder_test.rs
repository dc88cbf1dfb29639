use whisperlog::domain::{find_leaked_placeholders, template_placeholders};

const MEETING_TEMPLATE: &str =
    "# Meeting\n\n**Date:** {date}\n**Attendees:** {attendees}\n\n## Notes\n{discussion}\n\n{date}";

#[test]
fn given_template_with_repeated_tokens_when_extracting_then_each_appears_once_in_order() {
    let tokens = template_placeholders(MEETING_TEMPLATE);

    assert_eq!(tokens, vec!["{date}", "{attendees}", "{discussion}"]);
}

#[test]
fn given_fully_formatted_output_when_scanning_then_no_leaks() {
    let output = "# Meeting\n\n**Date:** March 5, 2025\n**Attendees:** Ana, Bo";

    assert!(find_leaked_placeholders(output, MEETING_TEMPLATE).is_empty());
}

#[test]
fn given_output_with_template_token_when_scanning_then_token_reported() {
    let output = "# Meeting\n\n**Date:** March 5, 2025\n**Attendees:** {attendees}";

    assert_eq!(
        find_leaked_placeholders(output, MEETING_TEMPLATE),
        vec!["{attendees}"]
    );
}

#[test]
fn given_custom_template_when_output_has_well_known_token_then_still_reported() {
    let output = "Summary\n\nNext: {next_steps}";

    assert_eq!(
        find_leaked_placeholders(output, "# Summary\n{summary}"),
        vec!["{next_steps}"]
    );
}

#[test]
fn given_user_braces_not_in_template_when_scanning_then_not_flagged() {
    let output = "The config uses {port} and {host}.";

    assert!(find_leaked_placeholders(output, "# Notes\n{body}").is_empty());
}
