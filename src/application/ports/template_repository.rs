use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{PageRequest, SortOrder, Template, TemplateId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
}

impl TemplateSortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateSortField::CreatedAt => "createdAt",
            TemplateSortField::UpdatedAt => "updatedAt",
            TemplateSortField::Title => "title",
        }
    }
}

impl FromStr for TemplateSortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(TemplateSortField::CreatedAt),
            "updatedAt" => Ok(TemplateSortField::UpdatedAt),
            "title" => Ok(TemplateSortField::Title),
            _ => Err(format!(
                "Invalid sort field: {}. Expected: createdAt, updatedAt or title",
                s
            )),
        }
    }
}

impl fmt::Display for TemplateSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateQuery {
    /// Case-insensitive substring matched against title and description.
    pub search: Option<String>,
    pub page: PageRequest,
    pub sort_by: TemplateSortField,
    pub sort_order: SortOrder,
}

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn create(&self, template: &Template) -> Result<(), RepositoryError>;

    /// Active template owned by `user_id`.
    async fn find_active(
        &self,
        id: TemplateId,
        user_id: UserId,
    ) -> Result<Option<Template>, RepositoryError>;

    /// Store inspection, ignores ownership and the active flag.
    async fn find_including_inactive(
        &self,
        id: TemplateId,
    ) -> Result<Option<Template>, RepositoryError>;

    /// One page of active templates plus the total match count.
    async fn list(
        &self,
        user_id: UserId,
        query: &TemplateQuery,
    ) -> Result<(Vec<Template>, u64), RepositoryError>;

    async fn update(&self, template: &Template) -> Result<(), RepositoryError>;

    /// Returns false when no active template matched.
    async fn soft_delete(&self, id: TemplateId, user_id: UserId) -> Result<bool, RepositoryError>;
}
