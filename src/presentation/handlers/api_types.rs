use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    OwnerSummary, Page, PageInfo, ProcessedContentView, ProcessingStats, Template,
    TemplateSummary, TemplateUsage, User,
};

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl From<PageInfo> for PaginationResponse {
    fn from(info: PageInfo) -> Self {
        Self {
            page: info.page,
            limit: info.limit,
            total: info.total,
            total_pages: info.total_pages,
            has_next: info.has_next,
            has_prev: info.has_prev,
        }
    }
}

#[derive(Serialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationResponse,
}

impl<T, D> From<Page<D>> for PageResponse<T>
where
    T: From<D>,
{
    fn from(page: Page<D>) -> Self {
        Self {
            data: page.data.into_iter().map(T::from).collect(),
            pagination: page.pagination.into(),
        }
    }
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<OwnerSummary> for UserResponse {
    fn from(owner: OwnerSummary) -> Self {
        Self {
            id: owner.id.to_string(),
            username: owner.username,
            email: owner.email,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub instruction: Option<String>,
    pub icon_name: String,
    pub format: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Template> for TemplateResponse {
    fn from(t: Template) -> Self {
        Self {
            id: t.id.to_string(),
            user_id: t.user_id.to_string(),
            title: t.title,
            description: t.description,
            instruction: t.instruction,
            icon_name: t.icon_name,
            format: t.format,
            is_active: t.is_active,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummaryResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub icon_name: String,
}

impl From<TemplateSummary> for TemplateSummaryResponse {
    fn from(t: TemplateSummary) -> Self {
        Self {
            id: t.id.to_string(),
            title: t.title,
            description: t.description,
            icon_name: t.icon_name,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingMetadataResponse {
    pub submission_date: DateTime<Utc>,
    /// Milliseconds.
    pub processing_time: u64,
    pub ai_model: String,
    pub placeholder_warnings: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    pub id: String,
    pub user: UserResponse,
    pub format: TemplateSummaryResponse,
    pub content_type: String,
    pub original_content: String,
    pub processed_content: String,
    pub processing_metadata: ProcessingMetadataResponse,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProcessedContentView> for ContentResponse {
    fn from(view: ProcessedContentView) -> Self {
        let content = view.content;
        Self {
            id: content.id.to_string(),
            user: view.owner.into(),
            format: view.template.into(),
            content_type: content.content_type.to_string(),
            original_content: content.original_content,
            processed_content: content.processed_content,
            processing_metadata: ProcessingMetadataResponse {
                submission_date: content.metadata.submission_date,
                processing_time: content.metadata.processing_time_ms,
                ai_model: content.metadata.ai_model,
                placeholder_warnings: content.metadata.placeholder_warnings,
            },
            is_active: content.is_active,
            created_at: content.created_at,
            updated_at: content.updated_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOverview {
    pub total_processed: u64,
    pub text_content: u64,
    pub audio_content: u64,
    pub avg_processing_time: f64,
    pub total_processing_time: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatUsageResponse {
    pub format_id: String,
    pub format_title: String,
    pub format_icon: String,
    pub count: u64,
}

impl From<TemplateUsage> for FormatUsageResponse {
    fn from(usage: TemplateUsage) -> Self {
        Self {
            format_id: usage.template_id.to_string(),
            format_title: usage.title,
            format_icon: usage.icon_name,
            count: usage.count,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub overview: StatsOverview,
    pub top_formats: Vec<FormatUsageResponse>,
}

impl From<ProcessingStats> for StatsResponse {
    fn from(stats: ProcessingStats) -> Self {
        Self {
            overview: StatsOverview {
                total_processed: stats.total_processed,
                text_content: stats.text_content,
                audio_content: stats.audio_content,
                avg_processing_time: stats.avg_processing_time_ms,
                total_processing_time: stats.total_processing_time_ms,
            },
            top_formats: stats.top_formats.into_iter().map(Into::into).collect(),
        }
    }
}
