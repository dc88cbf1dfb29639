use chrono::{DateTime, Duration, Utc};

use super::{OtpId, OtpType};

/// A one-time code. Only the bcrypt hash of the code is kept.
#[derive(Debug, Clone)]
pub struct Otp {
    pub id: OtpId,
    pub email: String,
    pub code_hash: String,
    pub otp_type: OtpType,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Otp {
    pub fn new(email: String, code_hash: String, otp_type: OtpType, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: OtpId::new(),
            email,
            code_hash,
            otp_type,
            expires_at: now + ttl,
            is_used: false,
            attempts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && !self.is_expired(now)
    }

    /// Counts a wrong submission. Returns true once the code is burned.
    pub fn register_failed_attempt(&mut self, max_attempts: u32) -> bool {
        self.attempts += 1;
        if self.attempts >= max_attempts {
            self.is_used = true;
        }
        self.updated_at = Utc::now();
        self.is_used
    }

    pub fn mark_used(&mut self) {
        self.is_used = true;
        self.updated_at = Utc::now();
    }
}
