use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::RepositoryError;
use crate::domain::{Otp, OtpId, OtpType};

#[async_trait]
pub trait OtpRepository: Send + Sync {
    async fn create(&self, otp: &Otp) -> Result<(), RepositoryError>;

    /// Most recent unused, unexpired code for the email.
    async fn find_latest_redeemable(
        &self,
        email: &str,
        otp_type: OtpType,
        now: DateTime<Utc>,
    ) -> Result<Option<Otp>, RepositoryError>;

    /// Atomically counts a wrong submission and burns the code once
    /// `max_attempts` is reached. `None` when the code was already used.
    async fn record_failed_attempt(
        &self,
        id: OtpId,
        max_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<Otp>, RepositoryError>;

    /// Marks the code used if it is still redeemable. Only one caller wins.
    async fn consume(&self, id: OtpId, now: DateTime<Utc>) -> Result<bool, RepositoryError>;
}
