use signet_auth::domain::types::AccountStatus;
use signet_auth::error::AuthServiceError;
use signet_auth::usecase::token::{LoginInput, LoginUseCase};
use signet_auth_types::token::validate_access_token;

use crate::helpers::{FakeHasher, MockUserRepo, TEST_JWT_SECRET, active_user, pending_user};

#[tokio::test]
async fn should_login_and_issue_token_that_validates() {
    let user = active_user();

    let uc = LoginUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        hasher: FakeHasher,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let out = uc
        .execute(LoginInput {
            username: user.username.clone(),
            password: "correct-password".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(out.account.id, user.id);
    assert!(!out.token.is_empty());

    let principal = validate_access_token(&out.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(principal.user_id, user.id);
    assert_eq!(principal.expires_at, out.expires_at);
}

#[tokio::test]
async fn should_reject_unknown_username() {
    let uc = LoginUseCase {
        users: MockUserRepo::empty(),
        hasher: FakeHasher,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc
        .execute(LoginInput {
            username: "nobody".to_owned(),
            password: "whatever".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_wrong_password() {
    let user = active_user();

    let uc = LoginUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        hasher: FakeHasher,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc
        .execute(LoginInput {
            username: user.username,
            password: "wrong-password".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_pending_account_with_correct_password() {
    let user = pending_user();

    let uc = LoginUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        hasher: FakeHasher,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc
        .execute(LoginInput {
            username: user.username,
            password: "correct-password".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::AccountNotActivated)),
        "expected AccountNotActivated, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_suspended_account_with_correct_password() {
    let mut user = active_user();
    user.status = AccountStatus::Suspended;

    let uc = LoginUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        hasher: FakeHasher,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc
        .execute(LoginInput {
            username: user.username,
            password: "correct-password".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::AccountSuspended)),
        "expected AccountSuspended, got {result:?}"
    );
}

#[tokio::test]
async fn should_not_leak_account_state_on_wrong_password() {
    let mut user = active_user();
    user.status = AccountStatus::Suspended;

    let uc = LoginUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        hasher: FakeHasher,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    // Wrong password on a suspended account reads like any bad login.
    let result = uc
        .execute(LoginInput {
            username: user.username,
            password: "wrong-password".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}
