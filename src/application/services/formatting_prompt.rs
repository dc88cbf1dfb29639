use chrono::NaiveDate;

use crate::application::ports::FormatSpec;

pub const DEFAULT_INSTRUCTION: &str =
    "Follow the template structure and format the content appropriately.";

/// Reply a provider gives when attached audio cannot be transcribed.
pub const UNTRANSCRIBABLE_MARKER: &str = "UNABLE_TO_TRANSCRIBE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSource {
    Text,
    TranscribedAudio,
    /// The recording travels alongside the prompt as an attachment.
    AttachedAudio,
}

impl PromptSource {
    fn label(&self) -> &'static str {
        match self {
            PromptSource::Text => "text",
            PromptSource::TranscribedAudio => "audio (transcribed)",
            PromptSource::AttachedAudio => "audio (attached recording)",
        }
    }
}

/// "March 5, 2025"
pub fn format_prompt_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Builds the formatting prompt. The output depends only on its inputs.
pub fn build_formatting_prompt(content: &str, spec: &FormatSpec, source: PromptSource) -> String {
    let date = format_prompt_date(spec.today);
    let instruction = spec
        .instruction
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .unwrap_or(DEFAULT_INSTRUCTION);

    let user_content = match source {
        PromptSource::AttachedAudio => format!(
            "The user's content is the attached audio recording. Transcribe it faithfully first, \
             then format the transcript. If the recording cannot be transcribed, reply with \
             exactly {} and nothing else.",
            UNTRANSCRIBABLE_MARKER
        ),
        _ => content.to_string(),
    };

    format!(
        "You are formatting content provided by a user. Use only the user's content and \
arrange it according to the template structure.

Do not copy any content from the template. Do not invent facts, names, dates or action items \
that the user did not state.

Current date: {date}
Content type: {label}

TEMPLATE STRUCTURE (style and layout only, its example content must not be reused):
{template}

FORMATTING INSTRUCTIONS:
{instruction}

USER CONTENT (this is the only source of facts):
{user_content}

RULES:
1. Every statement in the output must come from the user content.
2. Replace each template placeholder with information from the user content. Never leave a \
placeholder such as {{date}} or {{topic}} in the output.
3. Drop template sections the user content says nothing about, or mark them as not discussed.
4. When the user refers to \"today\" or \"this morning\", use {date}.
5. Keep the markdown style of the template.
6. If the content does not fit the template, adapt the structure to the content.

Return only the formatted markdown, without commentary.",
        label = source.label(),
        template = spec.template.trim(),
    )
}
