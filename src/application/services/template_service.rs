use std::sync::Arc;

use tracing::{info, instrument};

use crate::application::ports::{RepositoryError, TemplateQuery, TemplateRepository};
use crate::domain::{NewTemplate, Page, Template, TemplateChanges, TemplateId, UserId};

pub struct TemplateService {
    repository: Arc<dyn TemplateRepository>,
}

impl TemplateService {
    pub fn new(repository: Arc<dyn TemplateRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, new), fields(user_id = %user_id))]
    pub async fn create(&self, user_id: UserId, new: NewTemplate) -> Result<Template, TemplateError> {
        let new = NewTemplate {
            title: required("title", new.title)?,
            description: optional(new.description),
            instruction: optional(new.instruction),
            icon_name: required("iconName", new.icon_name)?,
            format: required("format", new.format)?,
        };

        let template = Template::new(user_id, new);
        self.repository.create(&template).await?;

        info!(template_id = %template.id, "Template created");
        Ok(template)
    }

    #[instrument(skip(self, query), fields(user_id = %user_id))]
    pub async fn list(
        &self,
        user_id: UserId,
        query: TemplateQuery,
    ) -> Result<Page<Template>, TemplateError> {
        let query = TemplateQuery {
            search: optional(query.search),
            ..query
        };
        let (templates, total) = self.repository.list(user_id, &query).await?;
        Ok(Page::new(templates, query.page, total))
    }

    #[instrument(skip(self), fields(user_id = %user_id, template_id = %id))]
    pub async fn get(&self, user_id: UserId, id: TemplateId) -> Result<Template, TemplateError> {
        self.repository
            .find_active(id, user_id)
            .await?
            .ok_or(TemplateError::NotFound(id))
    }

    /// Narrow lookup for formatting requests. `None` when missing, inactive or foreign.
    pub async fn find_for_processing(
        &self,
        id: TemplateId,
        user_id: UserId,
    ) -> Result<Option<Template>, TemplateError> {
        Ok(self.repository.find_active(id, user_id).await?)
    }

    #[instrument(skip(self, changes), fields(user_id = %user_id, template_id = %id))]
    pub async fn update(
        &self,
        user_id: UserId,
        id: TemplateId,
        changes: TemplateChanges,
    ) -> Result<Template, TemplateError> {
        let changes = TemplateChanges {
            title: changes.title.map(|t| required("title", t)).transpose()?,
            description: changes.description,
            instruction: changes.instruction,
            icon_name: changes
                .icon_name
                .map(|i| required("iconName", i))
                .transpose()?,
            format: changes.format.map(|f| required("format", f)).transpose()?,
        };

        let mut template = self.get(user_id, id).await?;
        if changes.is_empty() {
            return Ok(template);
        }

        template.apply(changes);
        self.repository.update(&template).await?;

        info!("Template updated");
        Ok(template)
    }

    #[instrument(skip(self), fields(user_id = %user_id, template_id = %id))]
    pub async fn delete(&self, user_id: UserId, id: TemplateId) -> Result<(), TemplateError> {
        if !self.repository.soft_delete(id, user_id).await? {
            return Err(TemplateError::NotFound(id));
        }
        info!("Template deleted");
        Ok(())
    }
}

fn required(field: &'static str, value: String) -> Result<String, TemplateError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TemplateError::Validation {
            field,
            message: format!("{} must not be empty", field),
        });
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("template not found: {0}")]
    NotFound(TemplateId),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
