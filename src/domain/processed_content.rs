use chrono::{DateTime, Utc};

use super::{ContentId, ContentType, TemplateId, UserId};

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingMetadata {
    pub submission_date: DateTime<Utc>,
    pub processing_time_ms: u64,
    pub ai_model: String,
    pub placeholder_warnings: Vec<String>,
}

/// The outcome of one successful formatting request.
#[derive(Debug, Clone)]
pub struct ProcessedContent {
    pub id: ContentId,
    pub user_id: UserId,
    pub template_id: TemplateId,
    pub content_type: ContentType,
    pub original_content: String,
    pub processed_content: String,
    pub metadata: ProcessingMetadata,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProcessedContent {
    pub fn new(
        user_id: UserId,
        template_id: TemplateId,
        content_type: ContentType,
        original_content: String,
        processed_content: String,
        metadata: ProcessingMetadata,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ContentId::new(),
            user_id,
            template_id,
            content_type,
            original_content,
            processed_content,
            metadata,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSummary {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSummary {
    pub id: TemplateId,
    pub title: String,
    pub description: Option<String>,
    pub icon_name: String,
}

/// Read-side join of a record with its owner and template.
#[derive(Debug, Clone)]
pub struct ProcessedContentView {
    pub content: ProcessedContent,
    pub owner: OwnerSummary,
    pub template: TemplateSummary,
}
