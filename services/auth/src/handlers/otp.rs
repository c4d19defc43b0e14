use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::domain::repository::UserRepository;
use crate::domain::types::{AccountStatus, OtpPurpose};
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::otp::{IssueOtpUseCase, VerifyOtpUseCase};

#[derive(Serialize)]
pub struct OtpResponse {
    pub message: &'static str,
}

// ── POST /auth/otp/verify ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: String,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<OtpResponse>, AuthServiceError> {
    let users = state.user_repo();
    let account = users
        .find_by_email(&body.email)
        .await?
        .ok_or(AuthServiceError::UserNotFound)?;

    if account.status == AccountStatus::Active {
        return Ok(Json(OtpResponse {
            message: "already verified",
        }));
    }

    VerifyOtpUseCase {
        otp_codes: state.otp_repo(),
        users,
        hasher: state.hasher.clone(),
    }
    .execute(account.id, OtpPurpose::Signup, &body.code)
    .await?;

    Ok(Json(OtpResponse {
        message: "email verified, account activated",
    }))
}

// ── POST /auth/otp/resend ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

pub async fn resend_otp(
    State(state): State<AppState>,
    Json(body): Json<ResendOtpRequest>,
) -> Result<Json<OtpResponse>, AuthServiceError> {
    let account = state
        .user_repo()
        .find_by_email(&body.email)
        .await?
        .ok_or(AuthServiceError::UserNotFound)?;

    if account.status == AccountStatus::Active {
        return Err(AuthServiceError::AlreadyVerified);
    }

    let issued = IssueOtpUseCase {
        otp_codes: state.otp_repo(),
        hasher: state.hasher.clone(),
        notifier: state.mailer.clone(),
    }
    .resend(account.id, &account.email, OtpPurpose::Signup)
    .await?;

    Ok(Json(OtpResponse {
        message: if issued.delivered {
            "verification code re-sent"
        } else {
            "verification code issued, delivery pending"
        },
    }))
}
