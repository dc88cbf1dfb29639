use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::RepositoryError;
use crate::domain::{
    ContentId, ContentType, PageRequest, ProcessedContent, ProcessedContentView, ProcessingStats,
    SortOrder, TemplateId, UserId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    ProcessingTime,
}

impl ContentSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentSortField::CreatedAt => "createdAt",
            ContentSortField::UpdatedAt => "updatedAt",
            ContentSortField::ProcessingTime => "processingTime",
        }
    }
}

impl FromStr for ContentSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(ContentSortField::CreatedAt),
            "updatedAt" => Ok(ContentSortField::UpdatedAt),
            "processingTime" => Ok(ContentSortField::ProcessingTime),
            _ => Err(format!(
                "Invalid sort field: {}. Expected: createdAt, updatedAt or processingTime",
                s
            )),
        }
    }
}

impl fmt::Display for ContentSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub content_type: Option<ContentType>,
    pub template_id: Option<TemplateId>,
    /// Matches processed output or template title, case-insensitive.
    pub search: Option<String>,
    /// Matches template title only, case-insensitive.
    pub template_name: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub date_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ContentQuery {
    pub filter: ContentFilter,
    pub page: PageRequest,
    pub sort_by: ContentSortField,
    pub sort_order: SortOrder,
}

#[async_trait]
pub trait ProcessedContentRepository: Send + Sync {
    async fn create(&self, content: &ProcessedContent) -> Result<(), RepositoryError>;

    /// Active record owned by `user_id`, joined with owner and template summaries.
    async fn find_active(
        &self,
        id: ContentId,
        user_id: UserId,
    ) -> Result<Option<ProcessedContentView>, RepositoryError>;

    /// Store inspection, ignores ownership and the active flag.
    async fn find_including_inactive(
        &self,
        id: ContentId,
    ) -> Result<Option<ProcessedContent>, RepositoryError>;

    async fn list(
        &self,
        user_id: UserId,
        query: &ContentQuery,
    ) -> Result<(Vec<ProcessedContentView>, u64), RepositoryError>;

    /// Returns false when no active record matched.
    async fn update_processed_text(
        &self,
        id: ContentId,
        user_id: UserId,
        processed_content: &str,
    ) -> Result<bool, RepositoryError>;

    async fn soft_delete(&self, id: ContentId, user_id: UserId) -> Result<bool, RepositoryError>;

    async fn stats(&self, user_id: UserId, top_n: usize) -> Result<ProcessingStats, RepositoryError>;
}
