use axum::{Json, extract::State};
use serde::Serialize;
use uuid::Uuid;

use signet_auth_types::token::Principal;

use crate::domain::repository::UserRepository;
use crate::error::AuthServiceError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub status: &'static str,
}

/// GET /auth/me
///
/// `Principal` is populated by the gate layer; the extractor rejects
/// unauthenticated requests with 401 before this body runs.
pub async fn get_me(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<MeResponse>, AuthServiceError> {
    let account = state
        .user_repo()
        .find_by_id(principal.user_id)
        .await?
        .ok_or(AuthServiceError::UserNotFound)?;

    Ok(Json(MeResponse {
        id: account.id,
        username: account.username,
        email: account.email,
        status: account.status.as_str(),
    }))
}
