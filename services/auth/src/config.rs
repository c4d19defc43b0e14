/// Auth service configuration loaded from environment variables.
#[derive(Debug)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing bearer tokens. Loaded once; never rotated
    /// within a process lifetime.
    pub jwt_secret: String,
    /// SMTP relay host for OTP delivery.
    pub smtp_host: String,
    /// SMTP relay port (default 587). Env var: `SMTP_PORT`.
    pub smtp_port: u16,
    /// SMTP username.
    pub smtp_username: String,
    /// SMTP password.
    pub smtp_password: String,
    /// Sender address for OTP mails (e.g. "noreply@example.com").
    pub mail_from: String,
    /// TCP port to listen on (default 3100). Env var: `AUTH_PORT`.
    pub auth_port: u16,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET"),
            smtp_host: std::env::var("SMTP_HOST").expect("SMTP_HOST"),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(587),
            smtp_username: std::env::var("SMTP_USERNAME").expect("SMTP_USERNAME"),
            smtp_password: std::env::var("SMTP_PASSWORD").expect("SMTP_PASSWORD"),
            mail_from: std::env::var("MAIL_FROM").expect("MAIL_FROM"),
            auth_port: std::env::var("AUTH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3100),
        }
    }
}
