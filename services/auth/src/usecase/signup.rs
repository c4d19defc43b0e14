use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{SecretHasher, UserRepository};
use crate::domain::types::{Account, AccountStatus};
use crate::error::AuthServiceError;

pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub struct SignupUseCase<U, H>
where
    U: UserRepository,
    H: SecretHasher,
{
    pub users: U,
    pub hasher: H,
}

impl<U, H> SignupUseCase<U, H>
where
    U: UserRepository,
    H: SecretHasher,
{
    /// Create a PENDING account with a hashed password. The caller issues
    /// the signup OTP afterwards.
    pub async fn execute(&self, input: SignupInput) -> Result<Account, AuthServiceError> {
        if self.users.find_by_username(&input.username).await?.is_some() {
            return Err(AuthServiceError::UsernameTaken);
        }
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(AuthServiceError::EmailTaken);
        }

        let account = Account {
            id: Uuid::new_v4(),
            username: input.username,
            email: input.email,
            password_hash: self.hasher.hash(&input.password)?,
            status: AccountStatus::Pending,
            email_verified_at: None,
            created_at: Utc::now(),
        };
        self.users.insert(&account).await?;
        Ok(account)
    }
}
