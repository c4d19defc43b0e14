use chrono::{Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use crate::domain::repository::{CodeNotifier, OtpRepository, SecretHasher, UserRepository};
use crate::domain::types::{OTP_MAX_ATTEMPTS, OTP_TTL_SECS, OtpPurpose, OtpRecord};
use crate::error::AuthServiceError;

/// Generate a uniformly random 6-digit code, zero-padded. Leading zeros
/// are significant: "042517" and "42517" are different codes.
fn generate_code() -> String {
    let mut rng = rand::rng();
    format!("{:06}", rng.random_range(0..1_000_000))
}

// ── Issue / resend ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct IssueOtpOutput {
    /// Whether the notifier accepted the code for delivery. The record is
    /// valid either way; callers decide how to surface a failed send.
    pub delivered: bool,
}

pub struct IssueOtpUseCase<O, H, N>
where
    O: OtpRepository,
    H: SecretHasher,
    N: CodeNotifier,
{
    pub otp_codes: O,
    pub hasher: H,
    pub notifier: N,
}

impl<O, H, N> IssueOtpUseCase<O, H, N>
where
    O: OtpRepository,
    H: SecretHasher,
    N: CodeNotifier,
{
    /// Issue a fresh code for (user, purpose), consuming all previously
    /// active ones atomically. Exactly one active record exists afterward.
    pub async fn execute(
        &self,
        user_id: Uuid,
        email: &str,
        purpose: OtpPurpose,
    ) -> Result<IssueOtpOutput, AuthServiceError> {
        let now = Utc::now();

        // Throttle: reject while the active record's last send is inside
        // the cooldown window. No code is generated or sent on rejection.
        if let Some(active) = self.otp_codes.find_active(user_id, purpose).await? {
            if active.in_cooldown(now) {
                return Err(AuthServiceError::Throttled);
            }
        }

        let code = generate_code();
        let record = OtpRecord {
            id: Uuid::new_v4(),
            user_id,
            purpose,
            code_hash: self.hasher.hash(&code)?,
            created_at: now,
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
            consumed_at: None,
            attempts: 0,
            last_sent_at: now,
        };
        self.otp_codes.consume_all_and_insert(&record, now).await?;

        // Delivery is best-effort and outside the transaction: a notifier
        // failure does not roll back the record. Log without the code.
        let delivered = match self.notifier.send_code(email, &code).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = ?e, user_id = %user_id, "otp delivery failed");
                false
            }
        };

        Ok(IssueOtpOutput { delivered })
    }

    /// Resend: same cooldown rule as `execute`, checked independently here
    /// as well, so the guarantee holds even when called directly. With no
    /// active record this behaves exactly like a fresh issue.
    pub async fn resend(
        &self,
        user_id: Uuid,
        email: &str,
        purpose: OtpPurpose,
    ) -> Result<IssueOtpOutput, AuthServiceError> {
        let now = Utc::now();
        if let Some(active) = self.otp_codes.find_active(user_id, purpose).await? {
            if active.in_cooldown(now) {
                return Err(AuthServiceError::Throttled);
            }
        }
        self.execute(user_id, email, purpose).await
    }
}

// ── Verify ───────────────────────────────────────────────────────────────────

pub struct VerifyOtpUseCase<O, U, H>
where
    O: OtpRepository,
    U: UserRepository,
    H: SecretHasher,
{
    pub otp_codes: O,
    pub users: U,
    pub hasher: H,
}

impl<O, U, H> VerifyOtpUseCase<O, U, H>
where
    O: OtpRepository,
    U: UserRepository,
    H: SecretHasher,
{
    /// Verify a submitted code and, on success, consume it and activate
    /// the account.
    ///
    /// Check order is fixed regardless of whether the code matches:
    /// consumed, then expired, then attempt bound. An expired-but-correct
    /// code reports expiry, never success or an attempts failure.
    pub async fn execute(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
        submitted_code: &str,
    ) -> Result<(), AuthServiceError> {
        let record = self
            .otp_codes
            .find_latest(user_id, purpose)
            .await?
            .ok_or(AuthServiceError::NoPendingCode)?;

        let now = Utc::now();
        if record.consumed_at.is_some() {
            return Err(AuthServiceError::CodeAlreadyUsed);
        }
        if record.is_expired(now) {
            return Err(AuthServiceError::CodeExpired);
        }
        if record.attempts >= OTP_MAX_ATTEMPTS {
            return Err(AuthServiceError::TooManyAttempts);
        }

        // The increment is persisted before the comparison so a failed
        // compare still counts. The conditional update re-checks the bound;
        // concurrent callers racing on the same record cannot both pass.
        if !self.otp_codes.register_attempt(record.id).await? {
            return Err(AuthServiceError::TooManyAttempts);
        }

        if !self.hasher.verify(submitted_code, &record.code_hash)? {
            return Err(AuthServiceError::InvalidCode);
        }

        // Lost the race against a concurrent successful verify.
        if !self.otp_codes.mark_consumed(record.id, now).await? {
            return Err(AuthServiceError::CodeAlreadyUsed);
        }

        self.users.activate(user_id, now).await?;
        Ok(())
    }
}
