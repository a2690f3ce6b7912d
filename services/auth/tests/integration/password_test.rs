use portal_auth::error::AuthServiceError;
use portal_auth::usecase::password::{
    ChangePasswordInput, ChangePasswordUseCase, RequestPasswordResetUseCase, ResetPasswordInput,
    ResetPasswordUseCase, verify_password,
};
use portal_domain::channel::Destination;
use portal_domain::verification::VerificationPurpose;

use crate::helpers::{
    MockSender, MockUserRepo, MockVerificationRepo, TEST_PASSWORD, WRONG_CODE, dispatch,
    test_user, verify,
};

const NEW_PASSWORD: &str = "tr0ub4dor&3-rotated";

fn request_uc(
    users: &MockUserRepo,
    store: &MockVerificationRepo,
    sender: &MockSender,
) -> RequestPasswordResetUseCase<MockUserRepo, MockVerificationRepo, MockSender> {
    RequestPasswordResetUseCase {
        users: users.clone(),
        dispatch: dispatch(store, sender),
    }
}

fn reset_uc(
    users: &MockUserRepo,
    store: &MockVerificationRepo,
) -> ResetPasswordUseCase<MockUserRepo, MockVerificationRepo> {
    ResetPasswordUseCase {
        users: users.clone(),
        verify: verify(store),
    }
}

fn reset_input(code: &str) -> ResetPasswordInput {
    ResetPasswordInput {
        email: "jane@example.com".to_owned(),
        code: code.to_owned(),
        new_password: NEW_PASSWORD.to_owned(),
    }
}

fn current_hash(users: &MockUserRepo) -> String {
    users.get(test_user().id).unwrap().password_hash
}

// ── Request ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_email_reset_code_to_account() {
    let users = MockUserRepo::new(vec![test_user()]);
    let store = MockVerificationRepo::empty();
    let sender = MockSender::new();

    request_uc(&users, &store, &sender)
        .execute("JANE@example.com")
        .await
        .unwrap();

    let sent = sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].purpose, VerificationPurpose::PasswordReset);
    assert_eq!(sent[0].destination, Destination::email("jane@example.com"));
}

#[tokio::test]
async fn should_succeed_silently_for_unknown_email() {
    let users = MockUserRepo::empty();
    let store = MockVerificationRepo::empty();
    let sender = MockSender::new();

    request_uc(&users, &store, &sender)
        .execute("nobody@example.com")
        .await
        .unwrap();

    assert!(sender.sent().is_empty());
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn should_hide_delivery_failure_from_reset_requester() {
    let users = MockUserRepo::new(vec![test_user()]);
    let store = MockVerificationRepo::empty();
    let sender = MockSender::failing();

    let result = request_uc(&users, &store, &sender)
        .execute("jane@example.com")
        .await;

    assert!(result.is_ok());
}

// ── Reset ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reset_password_with_emailed_code() {
    let users = MockUserRepo::new(vec![test_user()]);
    let store = MockVerificationRepo::empty();
    let sender = MockSender::new();
    request_uc(&users, &store, &sender)
        .execute("jane@example.com")
        .await
        .unwrap();

    reset_uc(&users, &store)
        .execute(reset_input(&sender.last_code()))
        .await
        .unwrap();

    let hash = current_hash(&users);
    assert!(verify_password(NEW_PASSWORD, &hash).unwrap());
    assert!(!verify_password(TEST_PASSWORD, &hash).unwrap());
}

#[tokio::test]
async fn should_keep_password_when_reset_code_is_wrong() {
    let users = MockUserRepo::new(vec![test_user()]);
    let store = MockVerificationRepo::empty();
    let sender = MockSender::new();
    request_uc(&users, &store, &sender)
        .execute("jane@example.com")
        .await
        .unwrap();

    let result = reset_uc(&users, &store).execute(reset_input(WRONG_CODE)).await;

    assert!(matches!(result, Err(AuthServiceError::InvalidCode)));
    assert!(verify_password(TEST_PASSWORD, &current_hash(&users)).unwrap());
}

#[tokio::test]
async fn should_reject_short_new_password_before_consuming_code() {
    let users = MockUserRepo::new(vec![test_user()]);
    let store = MockVerificationRepo::empty();
    let sender = MockSender::new();
    request_uc(&users, &store, &sender)
        .execute("jane@example.com")
        .await
        .unwrap();

    let result = reset_uc(&users, &store)
        .execute(ResetPasswordInput {
            new_password: "short".to_owned(),
            ..reset_input(&sender.last_code())
        })
        .await;

    assert!(matches!(result, Err(AuthServiceError::InvalidInput(_))));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn should_not_accept_two_factor_code_for_reset() {
    let users = MockUserRepo::new(vec![test_user()]);
    let store = MockVerificationRepo::empty();
    let sender = MockSender::new();
    dispatch(&store, &sender)
        .execute(portal_auth::usecase::verification::DispatchInput {
            subject_id: test_user().id,
            purpose: VerificationPurpose::EmailTwoFactor,
            destination: Destination::email("jane@example.com"),
            payload: None,
        })
        .await
        .unwrap();

    let result = reset_uc(&users, &store)
        .execute(reset_input(&sender.last_code()))
        .await;

    assert!(matches!(result, Err(AuthServiceError::InvalidCode)));
}

// ── Change ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_change_password_with_current_password() {
    let users = MockUserRepo::new(vec![test_user()]);
    let uc = ChangePasswordUseCase {
        users: users.clone(),
    };

    uc.execute(ChangePasswordInput {
        user_id: test_user().id,
        current_password: TEST_PASSWORD.to_owned(),
        new_password: NEW_PASSWORD.to_owned(),
    })
    .await
    .unwrap();

    assert!(verify_password(NEW_PASSWORD, &current_hash(&users)).unwrap());
}

#[tokio::test]
async fn should_refuse_change_with_wrong_current_password() {
    let users = MockUserRepo::new(vec![test_user()]);
    let uc = ChangePasswordUseCase {
        users: users.clone(),
    };

    let result = uc
        .execute(ChangePasswordInput {
            user_id: test_user().id,
            current_password: "guess".to_owned(),
            new_password: NEW_PASSWORD.to_owned(),
        })
        .await;

    assert!(matches!(result, Err(AuthServiceError::InvalidCredentials)));
    assert!(verify_password(TEST_PASSWORD, &current_hash(&users)).unwrap());
}
