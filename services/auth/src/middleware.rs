use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use signet_auth_types::{principal::bearer_token, token::validate_access_token};

use crate::state::AppState;

/// Routes that skip token validation entirely — they perform their own
/// checks internally. The allow-list lives only here.
const PUBLIC_PATHS: &[&str] = &[
    "/healthz",
    "/readyz",
    "/auth/signup",
    "/auth/login",
    "/auth/logout",
    "/auth/otp/verify",
    "/auth/otp/resend",
];

/// Populate (or withhold) the request's `Principal`.
///
/// This layer never rejects. A missing, malformed, expired, or badly
/// signed token just leaves the request unauthenticated; the `Principal`
/// extractor returns 401 at the handler seam. Separating "who is this"
/// from "is this endpoint allowed" keeps the filter side-effect-free
/// beyond extension population.
pub async fn auth_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if PUBLIC_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    if let Some(token) = bearer_token(request.headers()) {
        match validate_access_token(token, &state.jwt_secret) {
            Ok(principal) => {
                request.extensions_mut().insert(principal);
            }
            // Reason only — never the token itself.
            Err(e) => tracing::debug!(reason = %e, "bearer token rejected"),
        }
    }

    next.run(request).await
}
