use signet_auth::domain::types::AccountStatus;
use signet_auth::error::AuthServiceError;
use signet_auth::usecase::signup::{SignupInput, SignupUseCase};

use crate::helpers::{FakeHasher, MockUserRepo, active_user, fake_hash};

#[tokio::test]
async fn should_create_pending_account_with_hashed_password() {
    let repo = MockUserRepo::empty();
    let users_handle = repo.users_handle();

    let uc = SignupUseCase {
        users: repo,
        hasher: FakeHasher,
    };

    let account = uc
        .execute(SignupInput {
            username: "carol".to_owned(),
            email: "carol@example.com".to_owned(),
            password: "hunter2hunter2".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(account.status, AccountStatus::Pending);
    assert!(account.email_verified_at.is_none());
    assert_eq!(account.password_hash, fake_hash("hunter2hunter2"));
    assert_ne!(account.password_hash, "hunter2hunter2");

    let users = users_handle.lock().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, account.id);
}

#[tokio::test]
async fn should_reject_taken_username() {
    let existing = active_user();

    let uc = SignupUseCase {
        users: MockUserRepo::new(vec![existing.clone()]),
        hasher: FakeHasher,
    };

    let result = uc
        .execute(SignupInput {
            username: existing.username,
            email: "other@example.com".to_owned(),
            password: "hunter2hunter2".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::UsernameTaken)),
        "expected UsernameTaken, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_taken_email() {
    let existing = active_user();

    let uc = SignupUseCase {
        users: MockUserRepo::new(vec![existing.clone()]),
        hasher: FakeHasher,
    };

    let result = uc
        .execute(SignupInput {
            username: "someone-else".to_owned(),
            email: existing.email,
            password: "hunter2hunter2".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::EmailTaken)),
        "expected EmailTaken, got {result:?}"
    );
}
