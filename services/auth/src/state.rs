use sea_orm::DatabaseConnection;

use crate::infra::db::{DbOtpRepository, DbUserRepository};
use crate::infra::hash::ArgonHasher;
use crate::infra::mailer::SmtpMailer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub hasher: ArgonHasher,
    pub mailer: SmtpMailer,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_repo(&self) -> DbOtpRepository {
        DbOtpRepository {
            db: self.db.clone(),
        }
    }
}
