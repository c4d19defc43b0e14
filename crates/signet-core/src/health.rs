use axum::http::StatusCode;

/// Handler for `GET /healthz` — process liveness.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz` — readiness. Services that depend on external
/// resources should replace this with their own probe.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
