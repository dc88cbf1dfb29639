use std::sync::Arc;

use tracing::{info, instrument};

use crate::application::ports::{
    ContentQuery, ProcessedContentRepository, RepositoryError, TemplateRepository,
};
use crate::domain::{
    ContentId, Page, ProcessedContentView, ProcessingStats, Template, TemplateId, UserId,
};

pub const TOP_FORMATS_LIMIT: usize = 5;

pub struct ContentService {
    contents: Arc<dyn ProcessedContentRepository>,
    templates: Arc<dyn TemplateRepository>,
}

impl ContentService {
    pub fn new(
        contents: Arc<dyn ProcessedContentRepository>,
        templates: Arc<dyn TemplateRepository>,
    ) -> Self {
        Self {
            contents,
            templates,
        }
    }

    #[instrument(skip(self, query), fields(user_id = %user_id))]
    pub async fn list(
        &self,
        user_id: UserId,
        query: ContentQuery,
    ) -> Result<Page<ProcessedContentView>, ContentError> {
        let query = normalize(query)?;
        let (records, total) = self.contents.list(user_id, &query).await?;
        Ok(Page::new(records, query.page, total))
    }

    /// The template plus one page of its records.
    #[instrument(skip(self, query), fields(user_id = %user_id, template_id = %template_id))]
    pub async fn list_by_template(
        &self,
        user_id: UserId,
        template_id: TemplateId,
        mut query: ContentQuery,
    ) -> Result<(Template, Page<ProcessedContentView>), ContentError> {
        let template = self
            .templates
            .find_active(template_id, user_id)
            .await?
            .ok_or(ContentError::TemplateNotFound(template_id))?;

        query.filter.template_id = Some(template_id);
        let page = self.list(user_id, query).await?;
        Ok((template, page))
    }

    #[instrument(skip(self), fields(user_id = %user_id, content_id = %id))]
    pub async fn get(
        &self,
        user_id: UserId,
        id: ContentId,
    ) -> Result<ProcessedContentView, ContentError> {
        self.contents
            .find_active(id, user_id)
            .await?
            .ok_or(ContentError::NotFound(id))
    }

    #[instrument(skip(self, processed_content), fields(user_id = %user_id, content_id = %id))]
    pub async fn update_processed_text(
        &self,
        user_id: UserId,
        id: ContentId,
        processed_content: &str,
    ) -> Result<ProcessedContentView, ContentError> {
        if processed_content.trim().is_empty() {
            return Err(ContentError::Validation {
                field: "processedContent",
                message: "processedContent must not be empty".to_string(),
            });
        }

        if !self
            .contents
            .update_processed_text(id, user_id, processed_content)
            .await?
        {
            return Err(ContentError::NotFound(id));
        }

        info!("Processed content edited");
        self.get(user_id, id).await
    }

    #[instrument(skip(self), fields(user_id = %user_id, content_id = %id))]
    pub async fn delete(&self, user_id: UserId, id: ContentId) -> Result<(), ContentError> {
        if !self.contents.soft_delete(id, user_id).await? {
            return Err(ContentError::NotFound(id));
        }
        info!("Processed content deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn stats(&self, user_id: UserId) -> Result<ProcessingStats, ContentError> {
        Ok(self.contents.stats(user_id, TOP_FORMATS_LIMIT).await?)
    }
}

fn normalize(mut query: ContentQuery) -> Result<ContentQuery, ContentError> {
    let trim = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    query.filter.search = trim(query.filter.search);
    query.filter.template_name = trim(query.filter.template_name);

    if let (Some(from), Some(to)) = (query.filter.date_from, query.filter.date_to) {
        if from > to {
            return Err(ContentError::Validation {
                field: "dateFrom",
                message: "dateFrom must not be after dateTo".to_string(),
            });
        }
    }

    Ok(query)
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("processed content not found: {0}")]
    NotFound(ContentId),
    #[error("template not found: {0}")]
    TemplateNotFound(TemplateId),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
