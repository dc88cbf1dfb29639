use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use super::pg_error::{like_pattern, map_sqlx_error};
use crate::application::ports::{
    RepositoryError, TemplateQuery, TemplateRepository, TemplateSortField,
};
use crate::domain::{Template, TemplateId, UserId};

const TEMPLATE_COLUMNS: &str = "id, user_id, title, description, instruction, icon_name, format, \
                                is_active, created_at, updated_at";

pub struct PgTemplateRepository {
    pool: PgPool,
}

impl PgTemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: Option<String>,
    instruction: Option<String>,
    icon_name: String,
    format: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TemplateRow> for Template {
    fn from(r: TemplateRow) -> Self {
        Template {
            id: TemplateId::from_uuid(r.id),
            user_id: UserId::from_uuid(r.user_id),
            title: r.title,
            description: r.description,
            instruction: r.instruction,
            icon_name: r.icon_name,
            format: r.format,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

fn sort_column(field: TemplateSortField) -> &'static str {
    match field {
        TemplateSortField::CreatedAt => "created_at",
        TemplateSortField::UpdatedAt => "updated_at",
        TemplateSortField::Title => "LOWER(title)",
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, user_id: UserId, query: &TemplateQuery) {
    qb.push(" WHERE user_id = ")
        .push_bind(user_id.as_uuid())
        .push(" AND is_active = TRUE");

    if let Some(search) = &query.search {
        let pattern = like_pattern(search);
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl TemplateRepository for PgTemplateRepository {
    #[instrument(skip(self, template), fields(template_id = %template.id))]
    async fn create(&self, template: &Template) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO user_formats (id, user_id, title, description, instruction, icon_name,
                                      format, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(template.id.as_uuid())
        .bind(template.user_id.as_uuid())
        .bind(&template.title)
        .bind(&template.description)
        .bind(&template.instruction)
        .bind(&template.icon_name)
        .bind(&template.format)
        .bind(template.is_active)
        .bind(template.created_at)
        .bind(template.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self), fields(template_id = %id, user_id = %user_id))]
    async fn find_active(
        &self,
        id: TemplateId,
        user_id: UserId,
    ) -> Result<Option<Template>, RepositoryError> {
        let row = sqlx::query_as::<_, TemplateRow>(&format!(
            "SELECT {} FROM user_formats WHERE id = $1 AND user_id = $2 AND is_active = TRUE",
            TEMPLATE_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Template::from))
    }

    #[instrument(skip(self), fields(template_id = %id))]
    async fn find_including_inactive(
        &self,
        id: TemplateId,
    ) -> Result<Option<Template>, RepositoryError> {
        let row = sqlx::query_as::<_, TemplateRow>(&format!(
            "SELECT {} FROM user_formats WHERE id = $1",
            TEMPLATE_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Template::from))
    }

    #[instrument(skip(self, query), fields(user_id = %user_id, page = query.page.page()))]
    async fn list(
        &self,
        user_id: UserId,
        query: &TemplateQuery,
    ) -> Result<(Vec<Template>, u64), RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM user_formats");
        push_filters(&mut count, user_id, query);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM user_formats",
            TEMPLATE_COLUMNS
        ));
        push_filters(&mut select, user_id, query);
        select
            .push(" ORDER BY ")
            .push(sort_column(query.sort_by))
            .push(" ")
            .push(query.sort_order.as_sql())
            .push(", id ASC LIMIT ")
            .push_bind(i64::from(query.page.limit()))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.page.offset()).unwrap_or(i64::MAX));

        let rows = select
            .build_query_as::<TemplateRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok((
            rows.into_iter().map(Template::from).collect(),
            u64::try_from(total).unwrap_or(0),
        ))
    }

    #[instrument(skip(self, template), fields(template_id = %template.id))]
    async fn update(&self, template: &Template) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE user_formats
            SET title = $1, description = $2, instruction = $3, icon_name = $4, format = $5,
                updated_at = $6
            WHERE id = $7 AND user_id = $8 AND is_active = TRUE
            "#,
        )
        .bind(&template.title)
        .bind(&template.description)
        .bind(&template.instruction)
        .bind(&template.icon_name)
        .bind(&template.format)
        .bind(template.updated_at)
        .bind(template.id.as_uuid())
        .bind(template.user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(template.id.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(template_id = %id, user_id = %user_id))]
    async fn soft_delete(&self, id: TemplateId, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE user_formats SET is_active = FALSE, updated_at = $1
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
}
