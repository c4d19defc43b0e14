use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use signet_auth::domain::types::{AccountStatus, OtpPurpose};
use signet_auth::error::AuthServiceError;
use signet_auth::usecase::otp::{IssueOtpUseCase, VerifyOtpUseCase};

use crate::helpers::{
    FakeHasher, MockNotifier, MockOtpRepo, MockUserRepo, fake_hash, otp_record, pending_user,
};

// ── Issue ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_code_and_send_six_digits() {
    let user = pending_user();

    let repo = MockOtpRepo::empty();
    let codes_handle = repo.codes_handle();
    let notifier = MockNotifier::new();
    let sent_handle = notifier.sent_handle();

    let uc = IssueOtpUseCase {
        otp_codes: repo,
        hasher: FakeHasher,
        notifier,
    };

    let out = uc
        .execute(user.id, &user.email, OtpPurpose::Signup)
        .await
        .unwrap();
    assert!(out.delivered);

    let sent = sent_handle.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (to, code) = &sent[0];
    assert_eq!(to, &user.email);
    assert_eq!(code.len(), 6, "code should be exactly six digits");
    assert!(code.bytes().all(|b| b.is_ascii_digit()));

    let codes = codes_handle.lock().unwrap();
    assert_eq!(codes.len(), 1);
    let record = &codes[0];
    assert_eq!(record.user_id, user.id);
    assert_eq!(record.attempts, 0);
    assert!(record.consumed_at.is_none());
    assert!(record.expires_at > Utc::now() + Duration::seconds(590));
    // The plaintext is never persisted.
    assert_eq!(record.code_hash, fake_hash(code));
    assert_ne!(&record.code_hash, code);
}

#[tokio::test]
async fn should_throttle_reissue_inside_cooldown() {
    let user = pending_user();
    let existing = otp_record(user.id, "111111"); // last_sent_at = now

    let repo = MockOtpRepo::new(vec![existing]);
    let codes_handle = repo.codes_handle();
    let notifier = MockNotifier::new();
    let sent_handle = notifier.sent_handle();

    let uc = IssueOtpUseCase {
        otp_codes: repo,
        hasher: FakeHasher,
        notifier,
    };

    let result = uc.execute(user.id, &user.email, OtpPurpose::Signup).await;
    assert!(
        matches!(result, Err(AuthServiceError::Throttled)),
        "expected Throttled, got {result:?}"
    );

    // Nothing was generated or sent on rejection.
    assert_eq!(codes_handle.lock().unwrap().len(), 1);
    assert!(sent_handle.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reissue_after_cooldown_leaving_one_active_record() {
    let user = pending_user();
    let mut existing = otp_record(user.id, "111111");
    existing.last_sent_at = Utc::now() - Duration::seconds(61);
    existing.created_at = existing.last_sent_at;

    let repo = MockOtpRepo::new(vec![existing]);
    let codes_handle = repo.codes_handle();

    let uc = IssueOtpUseCase {
        otp_codes: repo,
        hasher: FakeHasher,
        notifier: MockNotifier::new(),
    };

    uc.resend(user.id, &user.email, OtpPurpose::Signup)
        .await
        .unwrap();

    let codes = codes_handle.lock().unwrap();
    assert_eq!(codes.len(), 2);
    let active: Vec<_> = codes.iter().filter(|c| c.consumed_at.is_none()).collect();
    assert_eq!(active.len(), 1, "exactly one record may be active");
    assert!(active[0].attempts == 0, "the new record starts fresh");
}

#[tokio::test]
async fn should_treat_resend_without_active_record_as_fresh_issue() {
    let user = pending_user();
    let repo = MockOtpRepo::empty();
    let codes_handle = repo.codes_handle();

    let uc = IssueOtpUseCase {
        otp_codes: repo,
        hasher: FakeHasher,
        notifier: MockNotifier::new(),
    };

    uc.resend(user.id, &user.email, OtpPurpose::Signup)
        .await
        .unwrap();

    assert_eq!(codes_handle.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_keep_single_active_record_when_issues_race() {
    let user = pending_user();
    let shared = Arc::new(Mutex::new(vec![]));

    // Two issuers over the same store, as two racing requests would be.
    // Supersede-and-insert is atomic per call, so whichever lands second
    // consumes the first's record.
    let first = IssueOtpUseCase {
        otp_codes: MockOtpRepo {
            codes: Arc::clone(&shared),
        },
        hasher: FakeHasher,
        notifier: MockNotifier::new(),
    };
    let second = IssueOtpUseCase {
        otp_codes: MockOtpRepo {
            codes: Arc::clone(&shared),
        },
        hasher: FakeHasher,
        notifier: MockNotifier::new(),
    };

    let (a, b) = tokio::join!(
        first.execute(user.id, &user.email, OtpPurpose::Signup),
        second.execute(user.id, &user.email, OtpPurpose::Signup),
    );

    // Whichever way the calls interleave, each either issues or gets
    // throttled; the loser never half-commits.
    assert!(a.is_ok() || b.is_ok());
    for result in [&a, &b] {
        if let Err(e) = result {
            assert!(
                matches!(e, AuthServiceError::Throttled),
                "expected Throttled, got {e:?}"
            );
        }
    }

    let codes = shared.lock().unwrap();
    let active = codes.iter().filter(|c| c.consumed_at.is_none()).count();
    assert_eq!(active, 1, "racing issues may not both stay active");
}

#[tokio::test]
async fn should_keep_record_when_delivery_fails() {
    let user = pending_user();
    let repo = MockOtpRepo::empty();
    let codes_handle = repo.codes_handle();

    let uc = IssueOtpUseCase {
        otp_codes: repo,
        hasher: FakeHasher,
        notifier: MockNotifier::failing(),
    };

    let out = uc
        .execute(user.id, &user.email, OtpPurpose::Signup)
        .await
        .unwrap();

    assert!(!out.delivered, "a failed send is reported, not swallowed");
    assert_eq!(
        codes_handle.lock().unwrap().len(),
        1,
        "the record survives a notifier failure"
    );
}

// ── Verify ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_no_pending_code_when_none_issued() {
    let user = pending_user();

    let uc = VerifyOtpUseCase {
        otp_codes: MockOtpRepo::empty(),
        users: MockUserRepo::new(vec![user.clone()]),
        hasher: FakeHasher,
    };

    let result = uc.execute(user.id, OtpPurpose::Signup, "123456").await;
    assert!(
        matches!(result, Err(AuthServiceError::NoPendingCode)),
        "expected NoPendingCode, got {result:?}"
    );
}

#[tokio::test]
async fn should_report_expired_even_when_code_matches() {
    let user = pending_user();
    let mut record = otp_record(user.id, "123456");
    record.expires_at = Utc::now() - Duration::seconds(1);

    let repo = MockOtpRepo::new(vec![record]);
    let codes_handle = repo.codes_handle();

    let uc = VerifyOtpUseCase {
        otp_codes: repo,
        users: MockUserRepo::new(vec![user.clone()]),
        hasher: FakeHasher,
    };

    let result = uc.execute(user.id, OtpPurpose::Signup, "123456").await;
    assert!(
        matches!(result, Err(AuthServiceError::CodeExpired)),
        "expected CodeExpired, got {result:?}"
    );

    // Expiry is checked before the attempt counter moves.
    assert_eq!(codes_handle.lock().unwrap()[0].attempts, 0);
}

#[tokio::test]
async fn should_count_every_failed_attempt() {
    let user = pending_user();
    let record = otp_record(user.id, "123456");

    let repo = MockOtpRepo::new(vec![record]);
    let codes_handle = repo.codes_handle();

    let uc = VerifyOtpUseCase {
        otp_codes: repo,
        users: MockUserRepo::new(vec![user.clone()]),
        hasher: FakeHasher,
    };

    for _ in 0..3 {
        let result = uc.execute(user.id, OtpPurpose::Signup, "000000").await;
        assert!(
            matches!(result, Err(AuthServiceError::InvalidCode)),
            "expected InvalidCode, got {result:?}"
        );
    }

    assert_eq!(codes_handle.lock().unwrap()[0].attempts, 3);
}

#[tokio::test]
async fn should_reject_correct_code_after_attempts_exhausted() {
    let user = pending_user();
    let record = otp_record(user.id, "123456");

    let repo = MockOtpRepo::new(vec![record]);
    let codes_handle = repo.codes_handle();

    let uc = VerifyOtpUseCase {
        otp_codes: repo,
        users: MockUserRepo::new(vec![user.clone()]),
        hasher: FakeHasher,
    };

    for _ in 0..5 {
        let result = uc.execute(user.id, OtpPurpose::Signup, "000000").await;
        assert!(matches!(result, Err(AuthServiceError::InvalidCode)));
    }

    // Sixth submission fails on the bound even though the code is right.
    let result = uc.execute(user.id, OtpPurpose::Signup, "123456").await;
    assert!(
        matches!(result, Err(AuthServiceError::TooManyAttempts)),
        "expected TooManyAttempts, got {result:?}"
    );
    assert_eq!(
        codes_handle.lock().unwrap()[0].attempts,
        5,
        "the counter never passes the bound"
    );
}

#[tokio::test]
async fn should_reject_sixth_attempt_without_incrementing() {
    let user = pending_user();
    let mut record = otp_record(user.id, "123456");
    record.attempts = 5;

    let repo = MockOtpRepo::new(vec![record]);
    let codes_handle = repo.codes_handle();

    let uc = VerifyOtpUseCase {
        otp_codes: repo,
        users: MockUserRepo::new(vec![user.clone()]),
        hasher: FakeHasher,
    };

    let result = uc.execute(user.id, OtpPurpose::Signup, "123456").await;
    assert!(
        matches!(result, Err(AuthServiceError::TooManyAttempts)),
        "expected TooManyAttempts, got {result:?}"
    );
    assert_eq!(codes_handle.lock().unwrap()[0].attempts, 5);
}

#[tokio::test]
async fn should_consume_code_and_activate_account_on_success() {
    let user = pending_user();
    let record = otp_record(user.id, "042517");

    let otp_repo = MockOtpRepo::new(vec![record]);
    let codes_handle = otp_repo.codes_handle();
    let user_repo = MockUserRepo::new(vec![user.clone()]);
    let users_handle = user_repo.users_handle();

    let uc = VerifyOtpUseCase {
        otp_codes: otp_repo,
        users: user_repo,
        hasher: FakeHasher,
    };

    uc.execute(user.id, OtpPurpose::Signup, "042517")
        .await
        .unwrap();

    let codes = codes_handle.lock().unwrap();
    assert!(codes[0].consumed_at.is_some(), "success consumes the code");
    assert_eq!(codes[0].attempts, 1, "the successful attempt also counts");

    let users = users_handle.lock().unwrap();
    let activated = users.iter().find(|u| u.id == user.id).unwrap();
    assert_eq!(activated.status, AccountStatus::Active);
    assert!(activated.email_verified_at.is_some());
}

#[tokio::test]
async fn should_reject_replay_of_consumed_code() {
    let user = pending_user();
    let record = otp_record(user.id, "042517");

    let uc = VerifyOtpUseCase {
        otp_codes: MockOtpRepo::new(vec![record]),
        users: MockUserRepo::new(vec![user.clone()]),
        hasher: FakeHasher,
    };

    uc.execute(user.id, OtpPurpose::Signup, "042517")
        .await
        .unwrap();

    let result = uc.execute(user.id, OtpPurpose::Signup, "042517").await;
    assert!(
        matches!(result, Err(AuthServiceError::CodeAlreadyUsed)),
        "expected CodeAlreadyUsed, got {result:?}"
    );
}

#[tokio::test]
async fn should_only_verify_against_latest_record() {
    let user = pending_user();
    let mut old = otp_record(user.id, "111111");
    old.created_at = Utc::now() - Duration::seconds(120);
    old.last_sent_at = old.created_at;
    old.consumed_at = Some(Utc::now() - Duration::seconds(60));
    let fresh = otp_record(user.id, "222222");

    let uc = VerifyOtpUseCase {
        otp_codes: MockOtpRepo::new(vec![old, fresh]),
        users: MockUserRepo::new(vec![user.clone()]),
        hasher: FakeHasher,
    };

    // The superseded code no longer matches anything.
    let result = uc.execute(user.id, OtpPurpose::Signup, "111111").await;
    assert!(
        matches!(result, Err(AuthServiceError::InvalidCode)),
        "expected InvalidCode, got {result:?}"
    );

    // The fresh one does.
    uc.execute(user.id, OtpPurpose::Signup, "222222")
        .await
        .unwrap();
}
