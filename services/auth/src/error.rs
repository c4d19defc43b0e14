use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
///
/// Domain errors are always surfaced to the caller as distinct outcomes;
/// only `Internal` may be retried at the boundary. Messages never contain
/// secret material (codes, tokens, hashes).
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("username already taken")]
    UsernameTaken,
    #[error("email already taken")]
    EmailTaken,
    #[error("user not found")]
    UserNotFound,
    #[error("no pending verification code")]
    NoPendingCode,
    #[error("please wait before requesting another code")]
    Throttled,
    #[error("code already used")]
    CodeAlreadyUsed,
    #[error("code expired")]
    CodeExpired,
    #[error("too many attempts, request a new code")]
    TooManyAttempts,
    #[error("invalid code")]
    InvalidCode,
    #[error("account already verified")]
    AlreadyVerified,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("account is suspended")]
    AccountSuspended,
    #[error("account is not yet activated")]
    AccountNotActivated,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::NoPendingCode => "NO_PENDING_CODE",
            Self::Throttled => "THROTTLED",
            Self::CodeAlreadyUsed => "CODE_ALREADY_USED",
            Self::CodeExpired => "CODE_EXPIRED",
            Self::TooManyAttempts => "TOO_MANY_ATTEMPTS",
            Self::InvalidCode => "INVALID_CODE",
            Self::AlreadyVerified => "ALREADY_VERIFIED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountSuspended => "ACCOUNT_SUSPENDED",
            Self::AccountNotActivated => "ACCOUNT_NOT_ACTIVATED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound | Self::NoPendingCode => StatusCode::NOT_FOUND,
            Self::UsernameTaken
            | Self::EmailTaken
            | Self::CodeAlreadyUsed
            | Self::AlreadyVerified => StatusCode::CONFLICT,
            Self::Throttled | Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            Self::CodeExpired | Self::InvalidCode => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AccountSuspended | Self::AccountNotActivated => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable;
        // the alternate format renders every cause, not just the outermost context.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
