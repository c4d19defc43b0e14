//! Bearer-header parsing and the `Principal` request extractor.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::header::AUTHORIZATION;
use http::request::Parts;

pub use crate::token::Principal;

/// Exact scheme prefix the gate accepts. Anything else — missing header,
/// lowercase scheme, no trailing space — counts as "no token presented".
const BEARER_PREFIX: &str = "Bearer ";

/// Extract the bearer token from an `Authorization` header map.
pub fn bearer_token(headers: &http::HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
}

/// The authenticated principal, inserted into request extensions by the
/// auth gate.
///
/// Returns 401 if the gate left the request unauthenticated. Rejection
/// happens here, at the authorization seam — never inside the gate itself.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let principal = parts.extensions.get::<Principal>().cloned();
        async move { principal.ok_or(StatusCode::UNAUTHORIZED) }
    }
}
