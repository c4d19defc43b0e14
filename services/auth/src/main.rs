use sea_orm::Database;
use tracing::info;

use signet_auth::config::AuthConfig;
use signet_auth::infra::hash::ArgonHasher;
use signet_auth::infra::mailer::SmtpMailer;
use signet_auth::router::build_router;
use signet_auth::state::AppState;
use signet_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let mailer = SmtpMailer::new(
        &config.smtp_host,
        config.smtp_port,
        config.smtp_username,
        config.smtp_password,
        &config.mail_from,
    )
    .expect("invalid SMTP configuration");

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret,
        hasher: ArgonHasher::default(),
        mailer,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
