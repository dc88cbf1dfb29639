use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::pg_error::map_sqlx_error;
use crate::application::ports::{OtpRepository, RepositoryError};
use crate::domain::{Otp, OtpId, OtpType};

pub struct PgOtpRepository {
    pool: PgPool,
}

impl PgOtpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OtpRow {
    id: Uuid,
    email: String,
    otp_hash: String,
    otp_type: String,
    expires_at: DateTime<Utc>,
    is_used: bool,
    attempts: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OtpRow> for Otp {
    type Error = RepositoryError;

    fn try_from(r: OtpRow) -> Result<Self, Self::Error> {
        Ok(Otp {
            id: OtpId::from_uuid(r.id),
            email: r.email,
            code_hash: r.otp_hash,
            otp_type: r
                .otp_type
                .parse::<OtpType>()
                .map_err(RepositoryError::QueryFailed)?,
            expires_at: r.expires_at,
            is_used: r.is_used,
            attempts: u32::try_from(r.attempts).unwrap_or(0),
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[async_trait]
impl OtpRepository for PgOtpRepository {
    #[instrument(skip(self, otp), fields(otp_id = %otp.id))]
    async fn create(&self, otp: &Otp) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO otps (id, email, otp_hash, otp_type, expires_at, is_used, attempts,
                              created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(otp.id.as_uuid())
        .bind(&otp.email)
        .bind(&otp.code_hash)
        .bind(otp.otp_type.as_str())
        .bind(otp.expires_at)
        .bind(otp.is_used)
        .bind(i32::try_from(otp.attempts).unwrap_or(i32::MAX))
        .bind(otp.created_at)
        .bind(otp.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    #[instrument(skip(self, email), fields(otp_type = %otp_type))]
    async fn find_latest_redeemable(
        &self,
        email: &str,
        otp_type: OtpType,
        now: DateTime<Utc>,
    ) -> Result<Option<Otp>, RepositoryError> {
        let row = sqlx::query_as::<_, OtpRow>(
            r#"
            SELECT id, email, otp_hash, otp_type, expires_at, is_used, attempts, created_at, updated_at
            FROM otps
            WHERE email = $1 AND otp_type = $2 AND is_used = FALSE AND expires_at > $3
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(otp_type.as_str())
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(Otp::try_from).transpose()
    }

    #[instrument(skip(self), fields(otp_id = %id))]
    async fn record_failed_attempt(
        &self,
        id: OtpId,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<Otp>, RepositoryError> {
        // Right-hand sides see the pre-update row, so `attempts + 1` is the new count.
        let row = sqlx::query_as::<_, OtpRow>(
            r#"
            UPDATE otps
            SET attempts = attempts + 1,
                is_used = (attempts + 1 >= $2),
                updated_at = $3
            WHERE id = $1 AND is_used = FALSE
            RETURNING id, email, otp_hash, otp_type, expires_at, is_used, attempts, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(i32::try_from(max_attempts).unwrap_or(i32::MAX))
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(Otp::try_from).transpose()
    }

    #[instrument(skip(self), fields(otp_id = %id))]
    async fn consume(&self, id: OtpId, now: DateTime<Utc>) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE otps
            SET is_used = TRUE, updated_at = $2
            WHERE id = $1 AND is_used = FALSE AND expires_at > $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }
}
