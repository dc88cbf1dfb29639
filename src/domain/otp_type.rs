use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OtpType {
    EmailVerification,
    PasswordReset,
}

impl OtpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpType::EmailVerification => "email_verification",
            OtpType::PasswordReset => "password_reset",
        }
    }
}

impl FromStr for OtpType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email_verification" => Ok(OtpType::EmailVerification),
            "password_reset" => Ok(OtpType::PasswordReset),
            _ => Err(format!("Invalid otp type: {}", s)),
        }
    }
}

impl fmt::Display for OtpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
