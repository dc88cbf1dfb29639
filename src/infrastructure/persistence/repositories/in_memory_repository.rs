use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::application::ports::{
    ContentQuery, ContentSortField, OtpRepository, ProcessedContentRepository, RepositoryError,
    TemplateQuery, TemplateRepository, TemplateSortField, UserRepository,
};
use crate::domain::{
    ContentId, ContentType, Otp, OtpId, OtpType, OwnerSummary, ProcessedContent, ProcessedContentView,
    ProcessingStats, SortOrder, Template, TemplateId, TemplateSummary, TemplateUsage, User, UserId,
};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    templates: HashMap<TemplateId, Template>,
    contents: HashMap<ContentId, ProcessedContent>,
    otps: Vec<Otp>,
}

/// Process-local store backing every repository port. Used in scaffold mode
/// and tests; enforces the same uniqueness and ownership rules as Postgres.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn paginate<T>(items: Vec<T>, offset: u64, limit: u32) -> Vec<T> {
    items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(limit as usize)
        .collect()
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

fn view_of(
    tables: &Tables,
    content: &ProcessedContent,
) -> Result<ProcessedContentView, RepositoryError> {
    let owner = tables.users.get(&content.user_id).ok_or_else(|| {
        RepositoryError::ConstraintViolation(format!("missing user {}", content.user_id))
    })?;
    let template = tables.templates.get(&content.template_id).ok_or_else(|| {
        RepositoryError::ConstraintViolation(format!("missing template {}", content.template_id))
    })?;

    Ok(ProcessedContentView {
        content: content.clone(),
        owner: OwnerSummary {
            id: owner.id,
            username: owner.username.clone(),
            email: owner.email.clone(),
        },
        template: TemplateSummary {
            id: template.id,
            title: template.title.clone(),
            description: template.description.clone(),
            icon_name: template.icon_name.clone(),
        },
    })
}

fn matches_filter(tables: &Tables, content: &ProcessedContent, query: &ContentQuery) -> bool {
    let filter = &query.filter;
    let template_title = tables
        .templates
        .get(&content.template_id)
        .map(|t| t.title.as_str())
        .unwrap_or_default();

    filter.content_type.is_none_or(|ct| content.content_type == ct)
        && filter.template_id.is_none_or(|id| content.template_id == id)
        && filter.search.as_deref().is_none_or(|s| {
            contains_ci(&content.processed_content, s) || contains_ci(template_title, s)
        })
        && filter
            .template_name
            .as_deref()
            .is_none_or(|name| contains_ci(template_title, name))
        && filter.date_from.is_none_or(|from| content.created_at >= from)
        && filter.date_to.is_none_or(|to| content.created_at <= to)
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .users
            .values()
            .find(|u| u.email == user.email || u.username == user.username)
        {
            let field = if existing.email == user.email {
                "email"
            } else {
                "username"
            };
            return Err(RepositoryError::Duplicate {
                field: field.to_string(),
            });
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email && u.is_active)
            .cloned())
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email || u.username == username)
            .cloned())
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        user.password_hash = Some(password_hash.to_string());
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl TemplateRepository for InMemoryRepository {
    async fn create(&self, template: &Template) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&template.user_id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "unknown user {}",
                template.user_id
            )));
        }
        tables.templates.insert(template.id, template.clone());
        Ok(())
    }

    async fn find_active(
        &self,
        id: TemplateId,
        user_id: UserId,
    ) -> Result<Option<Template>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .templates
            .get(&id)
            .filter(|t| t.is_active && t.is_owned_by(user_id))
            .cloned())
    }

    async fn find_including_inactive(
        &self,
        id: TemplateId,
    ) -> Result<Option<Template>, RepositoryError> {
        Ok(self.tables.read().await.templates.get(&id).cloned())
    }

    async fn list(
        &self,
        user_id: UserId,
        query: &TemplateQuery,
    ) -> Result<(Vec<Template>, u64), RepositoryError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<Template> = tables
            .templates
            .values()
            .filter(|t| t.is_active && t.is_owned_by(user_id))
            .filter(|t| {
                query.search.as_deref().is_none_or(|s| {
                    contains_ci(&t.title, s)
                        || t.description.as_deref().is_some_and(|d| contains_ci(d, s))
                })
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = match query.sort_by {
                TemplateSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                TemplateSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                TemplateSortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            };
            directed(ordering, query.sort_order).then_with(|| a.id.as_uuid().cmp(&b.id.as_uuid()))
        });

        let total = matching.len() as u64;
        Ok((
            paginate(matching, query.page.offset(), query.page.limit()),
            total,
        ))
    }

    async fn update(&self, template: &Template) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        match tables.templates.get_mut(&template.id) {
            Some(stored) if stored.is_active && stored.user_id == template.user_id => {
                *stored = template.clone();
                Ok(())
            }
            _ => Err(RepositoryError::NotFound(template.id.to_string())),
        }
    }

    async fn soft_delete(&self, id: TemplateId, user_id: UserId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        match tables.templates.get_mut(&id) {
            Some(t) if t.is_active && t.is_owned_by(user_id) => {
                t.is_active = false;
                t.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl ProcessedContentRepository for InMemoryRepository {
    async fn create(&self, content: &ProcessedContent) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let owned_template = tables
            .templates
            .get(&content.template_id)
            .is_some_and(|t| t.user_id == content.user_id);
        if !owned_template {
            return Err(RepositoryError::ConstraintViolation(format!(
                "template {} is not owned by user {}",
                content.template_id, content.user_id
            )));
        }
        tables.contents.insert(content.id, content.clone());
        Ok(())
    }

    async fn find_active(
        &self,
        id: ContentId,
        user_id: UserId,
    ) -> Result<Option<ProcessedContentView>, RepositoryError> {
        let tables = self.tables.read().await;
        tables
            .contents
            .get(&id)
            .filter(|c| c.is_active && c.user_id == user_id)
            .map(|c| view_of(&tables, c))
            .transpose()
    }

    async fn find_including_inactive(
        &self,
        id: ContentId,
    ) -> Result<Option<ProcessedContent>, RepositoryError> {
        Ok(self.tables.read().await.contents.get(&id).cloned())
    }

    async fn list(
        &self,
        user_id: UserId,
        query: &ContentQuery,
    ) -> Result<(Vec<ProcessedContentView>, u64), RepositoryError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<&ProcessedContent> = tables
            .contents
            .values()
            .filter(|c| c.is_active && c.user_id == user_id)
            .filter(|c| matches_filter(&tables, c, query))
            .collect();

        matching.sort_by(|a, b| {
            let ordering = match query.sort_by {
                ContentSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                ContentSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                ContentSortField::ProcessingTime => a
                    .metadata
                    .processing_time_ms
                    .cmp(&b.metadata.processing_time_ms),
            };
            directed(ordering, query.sort_order).then_with(|| a.id.as_uuid().cmp(&b.id.as_uuid()))
        });

        let total = matching.len() as u64;
        let views = paginate(matching, query.page.offset(), query.page.limit())
            .into_iter()
            .map(|c| view_of(&tables, c))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((views, total))
    }

    async fn update_processed_text(
        &self,
        id: ContentId,
        user_id: UserId,
        processed_content: &str,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        match tables.contents.get_mut(&id) {
            Some(c) if c.is_active && c.user_id == user_id => {
                c.processed_content = processed_content.to_string();
                c.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn soft_delete(&self, id: ContentId, user_id: UserId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        match tables.contents.get_mut(&id) {
            Some(c) if c.is_active && c.user_id == user_id => {
                c.is_active = false;
                c.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn stats(&self, user_id: UserId, top_n: usize) -> Result<ProcessingStats, RepositoryError> {
        let tables = self.tables.read().await;
        let active: Vec<&ProcessedContent> = tables
            .contents
            .values()
            .filter(|c| c.is_active && c.user_id == user_id)
            .collect();

        let total_processed = active.len() as u64;
        let text_content = active
            .iter()
            .filter(|c| c.content_type == ContentType::Text)
            .count() as u64;
        let total_processing_time_ms: u64 = active
            .iter()
            .map(|c| c.metadata.processing_time_ms)
            .sum();
        let avg_processing_time_ms = if total_processed == 0 {
            0.0
        } else {
            total_processing_time_ms as f64 / total_processed as f64
        };

        let mut counts: HashMap<TemplateId, u64> = HashMap::new();
        for content in &active {
            *counts.entry(content.template_id).or_default() += 1;
        }

        let mut top_formats: Vec<TemplateUsage> = counts
            .into_iter()
            .filter_map(|(template_id, count)| {
                tables.templates.get(&template_id).map(|t| TemplateUsage {
                    template_id,
                    title: t.title.clone(),
                    icon_name: t.icon_name.clone(),
                    count,
                })
            })
            .collect();
        top_formats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.title.cmp(&b.title)));
        top_formats.truncate(top_n);

        Ok(ProcessingStats {
            total_processed,
            text_content,
            audio_content: total_processed - text_content,
            avg_processing_time_ms,
            total_processing_time_ms,
            top_formats,
        })
    }
}

#[async_trait]
impl OtpRepository for InMemoryRepository {
    async fn create(&self, otp: &Otp) -> Result<(), RepositoryError> {
        self.tables.write().await.otps.push(otp.clone());
        Ok(())
    }

    async fn find_latest_redeemable(
        &self,
        email: &str,
        otp_type: OtpType,
        now: DateTime<Utc>,
    ) -> Result<Option<Otp>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .otps
            .iter()
            .filter(|o| o.email == email && o.otp_type == otp_type && o.is_redeemable(now))
            .max_by_key(|o| o.created_at)
            .cloned())
    }

    async fn record_failed_attempt(
        &self,
        id: OtpId,
        max_attempts: u32,
        _now: DateTime<Utc>,
    ) -> Result<Option<Otp>, RepositoryError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.otps.iter_mut().find(|o| o.id == id && !o.is_used) else {
            return Ok(None);
        };
        stored.register_failed_attempt(max_attempts);
        Ok(Some(stored.clone()))
    }

    async fn consume(&self, id: OtpId, now: DateTime<Utc>) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        match tables.otps.iter_mut().find(|o| o.id == id && o.is_redeemable(now)) {
            Some(stored) => {
                stored.mark_used();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
