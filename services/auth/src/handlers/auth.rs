use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::domain::types::OtpPurpose;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::otp::IssueOtpUseCase;
use crate::usecase::signup::{SignupInput, SignupUseCase};
use crate::usecase::token::{LoginInput, LoginUseCase};

// ── POST /auth/signup ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
    /// False when the verification mail could not be handed off. The code
    /// was still issued; the client may retry via resend after the cooldown.
    pub delivered: bool,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let account = SignupUseCase {
        users: state.user_repo(),
        hasher: state.hasher.clone(),
    }
    .execute(SignupInput {
        username: body.username,
        email: body.email,
        password: body.password,
    })
    .await?;

    let issued = IssueOtpUseCase {
        otp_codes: state.otp_repo(),
        hasher: state.hasher.clone(),
        notifier: state.mailer.clone(),
    }
    .execute(account.id, &account.email, OtpPurpose::Signup)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "user registered, verification code sent",
            delivered: issued.delivered,
        }),
    ))
}

// ── POST /auth/login ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: u64,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthServiceError> {
    let out = LoginUseCase {
        users: state.user_repo(),
        hasher: state.hasher.clone(),
        jwt_secret: state.jwt_secret.clone(),
    }
    .execute(LoginInput {
        username: body.username,
        password: body.password,
    })
    .await?;

    Ok(Json(LoginResponse {
        token: out.token,
        expires_at: out.expires_at,
    }))
}

// ── POST /auth/logout ─────────────────────────────────────────────────────────

/// Tokens are validated statelessly, so logout is a client-side discard.
pub async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}
