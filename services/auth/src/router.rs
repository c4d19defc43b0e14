use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use signet_core::health::{healthz, readyz};
use signet_core::middleware::request_id_layer;

use crate::handlers::{
    auth::{login, logout, signup},
    otp::{resend_otp, verify_otp},
    user::get_me,
};
use crate::middleware::auth_gate;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Account lifecycle
        .route("/auth/signup", post(signup))
        .route("/auth/otp/verify", post(verify_otp))
        .route("/auth/otp/resend", post(resend_otp))
        // Sessions
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(get_me))
        .layer(middleware::from_fn_with_state(state.clone(), auth_gate))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
