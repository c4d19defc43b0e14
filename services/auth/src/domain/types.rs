use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Why an OTP was issued. Only signup verification exists today; the
/// string wire form leaves room for more purposes without a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    Signup,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signup => "SIGNUP",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SIGNUP" => Some(Self::Signup),
            _ => None,
        }
    }
}

/// Account lifecycle state. PENDING until OTP success; SUSPENDED is
/// terminal and administered out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Pending,
    Active,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "ACTIVE" => Some(Self::Active),
            "SUSPENDED" => Some(Self::Suspended),
            _ => None,
        }
    }
}

/// User account owned by the auth service.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub status: AccountStatus,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One issued verification code. The plaintext code is never stored —
/// only its argon2 hash.
#[derive(Debug, Clone)]
pub struct OtpRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub purpose: OtpPurpose,
    pub code_hash: String,
    pub created_at: DateTime<Utc>,
    /// Fixed at creation; a resend issues a fresh record instead of
    /// extending this one.
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub attempts: i32,
    pub last_sent_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn in_cooldown(&self, now: DateTime<Utc>) -> bool {
        now - self.last_sent_at < Duration::seconds(OTP_RESEND_COOLDOWN_SECS)
    }
}

/// OTP code length in digits.
pub const OTP_CODE_LEN: usize = 6;

/// OTP time-to-live in seconds (10 minutes).
pub const OTP_TTL_SECS: i64 = 600;

/// Maximum verification attempts per code.
pub const OTP_MAX_ATTEMPTS: i32 = 5;

/// Minimum time between successive issuances for the same (user, purpose).
pub const OTP_RESEND_COOLDOWN_SECS: i64 = 60;
