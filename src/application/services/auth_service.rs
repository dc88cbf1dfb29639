use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::{error, info, instrument, warn};

use crate::application::ports::{
    EmailError, EmailSender, OtpRepository, PasswordHashError, PasswordHasher, RepositoryError,
    TokenError, TokenService, UserRepository,
};
use crate::domain::{Otp, OtpType, User, UserId, normalize_email};

pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If the email exists, you will receive a password reset OTP";
pub const PASSWORD_RESET_MESSAGE: &str = "Password reset successfully";
pub const EMAIL_CONNECTION_OK: &str = "Email service is working correctly";
pub const EMAIL_CONNECTION_FAILED: &str =
    "Email service connection failed. Check your configuration.";

#[derive(Debug, Clone, Copy)]
pub struct AuthPolicy {
    pub min_password_length: usize,
    pub otp_ttl: chrono::Duration,
    pub max_otp_attempts: u32,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            min_password_length: 6,
            otp_ttl: chrono::Duration::minutes(10),
            max_otp_attempts: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConnectionStatus {
    pub success: bool,
    pub message: String,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    otps: Arc<dyn OtpRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    email: Arc<dyn EmailSender>,
    policy: AuthPolicy,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        otps: Arc<dyn OtpRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        email: Arc<dyn EmailSender>,
        policy: AuthPolicy,
    ) -> Self {
        Self {
            users,
            otps,
            hasher,
            tokens,
            email,
            policy,
        }
    }

    #[instrument(skip(self, email, password), fields(username = %username))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::validation("username", "username must not be empty"));
        }
        let email = self.validated_email(email)?;
        self.validate_password("password", password)?;

        if self
            .users
            .find_by_email_or_username(&email, username)
            .await?
            .is_some()
        {
            return Err(AuthError::Conflict);
        }

        let password_hash = self.hasher.hash(password).await?;
        let user = User::new(username.to_string(), &email, password_hash);

        match self.users.create(&user).await {
            Ok(()) => {}
            Err(RepositoryError::Duplicate { .. }) => return Err(AuthError::Conflict),
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %user.id, "User registered");

        if let Err(e) = self.email.send_welcome(&user.email, &user.username).await {
            warn!(error = %e, user_id = %user.id, "Failed to send welcome email");
        }

        let access_token = self.tokens.issue(&user)?;
        Ok(AuthSession { access_token, user })
    }

    #[instrument(skip(self, email, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = normalize_email(email);

        let user = self
            .users
            .find_active_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let Some(hash) = user.password_hash.as_deref() else {
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.tokens.issue(&user)?;
        info!(user_id = %user.id, "User logged in");
        Ok(AuthSession { access_token, user })
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn profile(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::Unauthorized)
    }

    /// Returns the same message whether or not the email belongs to a user.
    #[instrument(skip(self, email))]
    pub async fn forgot_password(&self, email: &str) -> Result<&'static str, AuthError> {
        let email = self.validated_email(email)?;

        let Some(user) = self.users.find_active_by_email(&email).await? else {
            return Ok(FORGOT_PASSWORD_MESSAGE);
        };

        let code = generate_otp_code();
        let code_hash = self.hasher.hash(&code).await?;
        let otp = Otp::new(
            email.clone(),
            code_hash,
            OtpType::PasswordReset,
            self.policy.otp_ttl,
        );
        self.otps.create(&otp).await?;

        if let Err(e) = self.email.send_password_reset_otp(&email, &code).await {
            error!(error = %e, user_id = %user.id, "Failed to send password reset OTP");
            return Err(AuthError::EmailDelivery(e));
        }

        info!(user_id = %user.id, otp_id = %otp.id, "Password reset OTP issued");
        Ok(FORGOT_PASSWORD_MESSAGE)
    }

    #[instrument(skip(self, email, code, new_password))]
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<&'static str, AuthError> {
        let email = normalize_email(email);
        if code.trim().is_empty() {
            return Err(AuthError::validation("otp", "otp must not be empty"));
        }
        self.validate_password("newPassword", new_password)?;

        let user = self
            .users
            .find_active_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidOtp(OtpRejection::UnknownEmail))?;

        let otp = self
            .otps
            .find_latest_redeemable(&email, OtpType::PasswordReset, Utc::now())
            .await?
            .ok_or(AuthError::InvalidOtp(OtpRejection::ExpiredOrMissing))?;

        if !self.hasher.verify(code.trim(), &otp.code_hash).await? {
            let counted = self
                .otps
                .record_failed_attempt(otp.id, self.policy.max_otp_attempts, Utc::now())
                .await?;
            warn!(
                user_id = %user.id,
                attempts = ?counted.as_ref().map(|o| o.attempts),
                burned = counted.as_ref().is_none_or(|o| o.is_used),
                "Wrong password reset OTP"
            );
            return Err(AuthError::InvalidOtp(OtpRejection::Mismatch));
        }

        // A code resets the password at most once.
        if !self.otps.consume(otp.id, Utc::now()).await? {
            return Err(AuthError::InvalidOtp(OtpRejection::ExpiredOrMissing));
        }

        let password_hash = self.hasher.hash(new_password).await?;
        self.users.update_password(user.id, &password_hash).await?;

        info!(user_id = %user.id, "Password reset");
        Ok(PASSWORD_RESET_MESSAGE)
    }

    pub async fn test_email_connection(&self) -> EmailConnectionStatus {
        match self.email.test_connection().await {
            Ok(()) => EmailConnectionStatus {
                success: true,
                message: EMAIL_CONNECTION_OK.to_string(),
            },
            Err(e) => {
                warn!(error = %e, "Email connection test failed");
                EmailConnectionStatus {
                    success: false,
                    message: EMAIL_CONNECTION_FAILED.to_string(),
                }
            }
        }
    }

    fn validated_email(&self, email: &str) -> Result<String, AuthError> {
        let email = normalize_email(email);
        if !is_plausible_email(&email) {
            return Err(AuthError::validation("email", "email must be a valid address"));
        }
        Ok(email)
    }

    fn validate_password(&self, field: &'static str, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.policy.min_password_length {
            return Err(AuthError::Validation {
                field,
                message: format!(
                    "{} must be at least {} characters",
                    field, self.policy.min_password_length
                ),
            });
        }
        Ok(())
    }
}

fn generate_otp_code() -> String {
    rand::rng().random_range(100_000..1_000_000).to_string()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpRejection {
    UnknownEmail,
    ExpiredOrMissing,
    Mismatch,
}

impl OtpRejection {
    pub fn message(&self) -> &'static str {
        match self {
            OtpRejection::UnknownEmail => "Invalid email or OTP",
            OtpRejection::ExpiredOrMissing => "Invalid or expired OTP",
            OtpRejection::Mismatch => "Invalid OTP",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("User with this email or username already exists")]
    Conflict,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("unauthorized")]
    Unauthorized,
    #[error("{}", .0.message())]
    InvalidOtp(OtpRejection),
    #[error("email delivery: {0}")]
    EmailDelivery(EmailError),
    #[error("password hashing: {0}")]
    Hashing(#[from] PasswordHashError),
    #[error("token: {0}")]
    Token(#[from] TokenError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    fn validation(field: &'static str, message: &str) -> Self {
        AuthError::Validation {
            field,
            message: message.to_string(),
        }
    }
}
