#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{Account, OtpPurpose, OtpRecord};
use crate::error::AuthServiceError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str)
    -> Result<Option<Account>, AuthServiceError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AuthServiceError>;

    async fn insert(&self, account: &Account) -> Result<(), AuthServiceError>;

    /// Transition the account to ACTIVE and stamp `email_verified_at`.
    async fn activate(&self, id: Uuid, now: DateTime<Utc>) -> Result<(), AuthServiceError>;
}

/// Repository for one-time verification codes.
///
/// Records are retained forever; "active" means unconsumed. At most one
/// active record per (user, purpose) exists after any `consume_all_and_insert`.
pub trait OtpRepository: Send + Sync {
    /// Most recent unconsumed record for (user, purpose).
    async fn find_active(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpRecord>, AuthServiceError>;

    /// Most recent record regardless of consumption. The verify path uses
    /// this so a replayed already-used code reports "already used" rather
    /// than "not found".
    async fn find_latest(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpRecord>, AuthServiceError>;

    /// Consume every active record for (user, purpose) and insert `record`,
    /// atomically (single transaction). Readers never observe zero or two
    /// active records for the pair.
    async fn consume_all_and_insert(
        &self,
        record: &OtpRecord,
        now: DateTime<Utc>,
    ) -> Result<(), AuthServiceError>;

    /// Increment `attempts` iff the record is unconsumed and under the
    /// attempt bound, in one conditional update. Returns `false` when no
    /// row qualified — concurrent callers cannot both pass the bound.
    async fn register_attempt(&self, id: Uuid) -> Result<bool, AuthServiceError>;

    /// Set `consumed_at` iff still unconsumed. Returns `false` when the
    /// record was already consumed (e.g. by a concurrent verify).
    async fn mark_consumed(&self, id: Uuid, now: DateTime<Utc>)
    -> Result<bool, AuthServiceError>;
}

/// One-way hash + verify for passwords and OTP codes (slow, salted).
pub trait SecretHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, AuthServiceError>;

    /// Constant-time comparison of `plain` against a stored hash.
    fn verify(&self, plain: &str, hash: &str) -> Result<bool, AuthServiceError>;
}

/// Delivers a plaintext code to a destination address. Best-effort; never
/// part of the transaction boundary.
pub trait CodeNotifier: Send + Sync {
    async fn send_code(&self, to: &str, code: &str) -> Result<(), AuthServiceError>;
}
