use signet_auth_types::token::issue_access_token;

use crate::domain::repository::{SecretHasher, UserRepository};
use crate::domain::types::{Account, AccountStatus};
use crate::error::AuthServiceError;

pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub account: Account,
    pub token: String,
    pub expires_at: u64,
}

pub struct LoginUseCase<U, H>
where
    U: UserRepository,
    H: SecretHasher,
{
    pub users: U,
    pub hasher: H,
    pub jwt_secret: String,
}

impl<U, H> LoginUseCase<U, H>
where
    U: UserRepository,
    H: SecretHasher,
{
    /// Authenticate credentials and issue a bearer token.
    ///
    /// Unknown username and wrong password are indistinguishable to the
    /// caller. Status checks come after the password check so a probe
    /// cannot learn an account's state without its password.
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, AuthServiceError> {
        let Some(account) = self.users.find_by_username(&input.username).await? else {
            return Err(AuthServiceError::InvalidCredentials);
        };

        if !self.hasher.verify(&input.password, &account.password_hash)? {
            return Err(AuthServiceError::InvalidCredentials);
        }

        match account.status {
            AccountStatus::Suspended => return Err(AuthServiceError::AccountSuspended),
            AccountStatus::Pending => return Err(AuthServiceError::AccountNotActivated),
            AccountStatus::Active => {}
        }

        let (token, expires_at) = issue_access_token(account.id, &self.jwt_secret)
            .map_err(|e| AuthServiceError::Internal(e.into()))?;

        Ok(LoginOutput {
            account,
            token,
            expires_at,
        })
    }
}
