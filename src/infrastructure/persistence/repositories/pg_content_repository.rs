use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use super::pg_error::{like_pattern, map_sqlx_error};
use crate::application::ports::{
    ContentQuery, ContentSortField, ProcessedContentRepository, RepositoryError,
};
use crate::domain::{
    ContentId, ContentType, OwnerSummary, ProcessedContent, ProcessedContentView,
    ProcessingMetadata, ProcessingStats, TemplateId, TemplateSummary, TemplateUsage, UserId,
};

const CONTENT_COLUMNS: &str = "pc.id, pc.user_id, pc.format_id, pc.content_type, \
                               pc.original_content, pc.processed_content, pc.submission_date, \
                               pc.processing_time_ms, pc.ai_model, pc.placeholder_warnings, \
                               pc.is_active, pc.created_at, pc.updated_at";

const VIEW_SELECT: &str = "SELECT pc.id, pc.user_id, pc.format_id, pc.content_type, \
                           pc.original_content, pc.processed_content, pc.submission_date, \
                           pc.processing_time_ms, pc.ai_model, pc.placeholder_warnings, \
                           pc.is_active, pc.created_at, pc.updated_at, \
                           u.username AS owner_username, u.email AS owner_email, \
                           f.title AS format_title, f.description AS format_description, \
                           f.icon_name AS format_icon_name";

const VIEW_FROM: &str = " FROM processed_contents pc \
                         JOIN users u ON u.id = pc.user_id \
                         JOIN user_formats f ON f.id = pc.format_id";

pub struct PgProcessedContentRepository {
    pool: PgPool,
}

impl PgProcessedContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ContentRow {
    id: Uuid,
    user_id: Uuid,
    format_id: Uuid,
    content_type: String,
    original_content: String,
    processed_content: String,
    submission_date: DateTime<Utc>,
    processing_time_ms: i64,
    ai_model: String,
    placeholder_warnings: Vec<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContentRow> for ProcessedContent {
    type Error = RepositoryError;

    fn try_from(r: ContentRow) -> Result<Self, Self::Error> {
        Ok(ProcessedContent {
            id: ContentId::from_uuid(r.id),
            user_id: UserId::from_uuid(r.user_id),
            template_id: TemplateId::from_uuid(r.format_id),
            content_type: r
                .content_type
                .parse::<ContentType>()
                .map_err(RepositoryError::QueryFailed)?,
            original_content: r.original_content,
            processed_content: r.processed_content,
            metadata: ProcessingMetadata {
                submission_date: r.submission_date,
                processing_time_ms: u64::try_from(r.processing_time_ms).unwrap_or(0),
                ai_model: r.ai_model,
                placeholder_warnings: r.placeholder_warnings,
            },
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ContentViewRow {
    #[sqlx(flatten)]
    content: ContentRow,
    owner_username: String,
    owner_email: String,
    format_title: String,
    format_description: Option<String>,
    format_icon_name: String,
}

impl TryFrom<ContentViewRow> for ProcessedContentView {
    type Error = RepositoryError;

    fn try_from(r: ContentViewRow) -> Result<Self, Self::Error> {
        let content = ProcessedContent::try_from(r.content)?;
        Ok(ProcessedContentView {
            owner: OwnerSummary {
                id: content.user_id,
                username: r.owner_username,
                email: r.owner_email,
            },
            template: TemplateSummary {
                id: content.template_id,
                title: r.format_title,
                description: r.format_description,
                icon_name: r.format_icon_name,
            },
            content,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OverviewRow {
    total: i64,
    text_count: i64,
    audio_count: i64,
    avg_time: f64,
    total_time: i64,
}

#[derive(sqlx::FromRow)]
struct UsageRow {
    id: Uuid,
    title: String,
    icon_name: String,
    usage_count: i64,
}

fn sort_column(field: ContentSortField) -> &'static str {
    match field {
        ContentSortField::CreatedAt => "pc.created_at",
        ContentSortField::UpdatedAt => "pc.updated_at",
        ContentSortField::ProcessingTime => "pc.processing_time_ms",
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, user_id: UserId, query: &ContentQuery) {
    let filter = &query.filter;

    qb.push(" WHERE pc.user_id = ")
        .push_bind(user_id.as_uuid())
        .push(" AND pc.is_active = TRUE");

    if let Some(content_type) = filter.content_type {
        qb.push(" AND pc.content_type = ")
            .push_bind(content_type.as_str());
    }
    if let Some(template_id) = filter.template_id {
        qb.push(" AND pc.format_id = ")
            .push_bind(template_id.as_uuid());
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (pc.processed_content ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR f.title ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(name) = &filter.template_name {
        qb.push(" AND f.title ILIKE ").push_bind(like_pattern(name));
    }
    if let Some(from) = filter.date_from {
        qb.push(" AND pc.created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.date_to {
        qb.push(" AND pc.created_at <= ").push_bind(to);
    }
}

#[async_trait]
impl ProcessedContentRepository for PgProcessedContentRepository {
    #[instrument(skip(self, content), fields(content_id = %content.id))]
    async fn create(&self, content: &ProcessedContent) -> Result<(), RepositoryError> {
        let processing_time_ms = i64::try_from(content.metadata.processing_time_ms)
            .map_err(|e| RepositoryError::ConstraintViolation(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO processed_contents (id, user_id, format_id, content_type, original_content,
                                            processed_content, submission_date, processing_time_ms,
                                            ai_model, placeholder_warnings, is_active, created_at,
                                            updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(content.id.as_uuid())
        .bind(content.user_id.as_uuid())
        .bind(content.template_id.as_uuid())
        .bind(content.content_type.as_str())
        .bind(&content.original_content)
        .bind(&content.processed_content)
        .bind(content.metadata.submission_date)
        .bind(processing_time_ms)
        .bind(&content.metadata.ai_model)
        .bind(&content.metadata.placeholder_warnings)
        .bind(content.is_active)
        .bind(content.created_at)
        .bind(content.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(content_id = %id, user_id = %user_id))]
    async fn find_active(
        &self,
        id: ContentId,
        user_id: UserId,
    ) -> Result<Option<ProcessedContentView>, RepositoryError> {
        let row = sqlx::query_as::<_, ContentViewRow>(&format!(
            "{}{} WHERE pc.id = $1 AND pc.user_id = $2 AND pc.is_active = TRUE",
            VIEW_SELECT, VIEW_FROM
        ))
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(ProcessedContentView::try_from).transpose()
    }

    #[instrument(skip(self), fields(content_id = %id))]
    async fn find_including_inactive(
        &self,
        id: ContentId,
    ) -> Result<Option<ProcessedContent>, RepositoryError> {
        let row = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {} FROM processed_contents pc WHERE pc.id = $1",
            CONTENT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(ProcessedContent::try_from).transpose()
    }

    #[instrument(skip(self, query), fields(user_id = %user_id, page = query.page.page()))]
    async fn list(
        &self,
        user_id: UserId,
        query: &ContentQuery,
    ) -> Result<(Vec<ProcessedContentView>, u64), RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*){}", VIEW_FROM));
        push_filters(&mut count, user_id, query);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let mut select = QueryBuilder::<Postgres>::new(format!("{}{}", VIEW_SELECT, VIEW_FROM));
        push_filters(&mut select, user_id, query);
        select
            .push(" ORDER BY ")
            .push(sort_column(query.sort_by))
            .push(" ")
            .push(query.sort_order.as_sql())
            .push(", pc.id ASC LIMIT ")
            .push_bind(i64::from(query.page.limit()))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.page.offset()).unwrap_or(i64::MAX));

        let rows = select
            .build_query_as::<ContentViewRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let views = rows
            .into_iter()
            .map(ProcessedContentView::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((views, u64::try_from(total).unwrap_or(0)))
    }

    #[instrument(skip(self, processed_content), fields(content_id = %id, user_id = %user_id))]
    async fn update_processed_text(
        &self,
        id: ContentId,
        user_id: UserId,
        processed_content: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE processed_contents SET processed_content = $1, updated_at = $2
            WHERE id = $3 AND user_id = $4 AND is_active = TRUE
            "#,
        )
        .bind(processed_content)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(content_id = %id, user_id = %user_id))]
    async fn soft_delete(&self, id: ContentId, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE processed_contents SET is_active = FALSE, updated_at = $1
            WHERE id = $2 AND user_id = $3 AND is_active = TRUE
            "#,
        )
        .bind(Utc::now())
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn stats(&self, user_id: UserId, top_n: usize) -> Result<ProcessingStats, RepositoryError> {
        let overview = sqlx::query_as::<_, OverviewRow>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE content_type = 'text') AS text_count,
                   COUNT(*) FILTER (WHERE content_type = 'audio') AS audio_count,
                   COALESCE(AVG(processing_time_ms), 0)::FLOAT8 AS avg_time,
                   COALESCE(SUM(processing_time_ms), 0)::BIGINT AS total_time
            FROM processed_contents
            WHERE user_id = $1 AND is_active = TRUE
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let usage = sqlx::query_as::<_, UsageRow>(
            r#"
            SELECT f.id, f.title, f.icon_name, COUNT(*) AS usage_count
            FROM processed_contents pc
            JOIN user_formats f ON f.id = pc.format_id
            WHERE pc.user_id = $1 AND pc.is_active = TRUE
            GROUP BY f.id, f.title, f.icon_name
            ORDER BY usage_count DESC, f.title ASC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(i64::try_from(top_n).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let to_u64 = |v: i64| u64::try_from(v).unwrap_or(0);

        Ok(ProcessingStats {
            total_processed: to_u64(overview.total),
            text_content: to_u64(overview.text_count),
            audio_content: to_u64(overview.audio_count),
            avg_processing_time_ms: overview.avg_time,
            total_processing_time_ms: to_u64(overview.total_time),
            top_formats: usage
                .into_iter()
                .map(|u| TemplateUsage {
                    template_id: TemplateId::from_uuid(u.id),
                    title: u.title,
                    icon_name: u.icon_name,
                    count: to_u64(u.usage_count),
                })
                .collect(),
        })
    }
}
