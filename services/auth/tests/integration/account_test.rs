use portal_auth::error::AuthServiceError;
use portal_auth::usecase::account::{
    GetAccountUseCase, SetTwoFactorUseCase, SignUpInput, SignUpUseCase, UpdateAccountInput,
    UpdateAccountUseCase, VerifyEmailUseCase,
};
use portal_domain::channel::Destination;
use portal_domain::verification::VerificationPurpose;

use crate::helpers::{
    MockSender, MockUserRepo, MockVerificationRepo, WRONG_CODE, dispatch, test_user, verify,
};

fn sign_up_uc(
    users: &MockUserRepo,
    store: &MockVerificationRepo,
    sender: &MockSender,
) -> SignUpUseCase<MockUserRepo, MockVerificationRepo, MockSender> {
    SignUpUseCase {
        users: users.clone(),
        dispatch: dispatch(store, sender),
    }
}

fn sign_up_input() -> SignUpInput {
    SignUpInput {
        name: "  Sam Lee ".to_owned(),
        email: "Sam@Example.com".to_owned(),
        password: "long enough password".to_owned(),
        phone: None,
    }
}

// ── SignUp ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_account_and_send_email_verification_code() {
    let users = MockUserRepo::empty();
    let store = MockVerificationRepo::empty();
    let sender = MockSender::new();

    let user = sign_up_uc(&users, &store, &sender)
        .execute(sign_up_input())
        .await
        .unwrap();

    assert_eq!(user.name, "Sam Lee");
    assert_eq!(user.email, "sam@example.com");
    assert!(!user.email_verified);
    assert!(!user.two_factor_enabled);
    assert!(user.password_hash.starts_with("$argon2id$"));

    let sent = sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].purpose, VerificationPurpose::EmailVerification);
    assert_eq!(sent[0].destination, Destination::email("sam@example.com"));
}

#[tokio::test]
async fn should_keep_account_when_verification_email_fails() {
    let users = MockUserRepo::empty();
    let store = MockVerificationRepo::empty();
    let sender = MockSender::failing();

    let user = sign_up_uc(&users, &store, &sender)
        .execute(sign_up_input())
        .await
        .unwrap();

    assert!(users.get(user.id).is_some());
}

#[tokio::test]
async fn should_reject_duplicate_email() {
    let users = MockUserRepo::new(vec![test_user()]);
    let store = MockVerificationRepo::empty();
    let sender = MockSender::new();

    let result = sign_up_uc(&users, &store, &sender)
        .execute(SignUpInput {
            email: "JANE@example.com".to_owned(),
            ..sign_up_input()
        })
        .await;

    assert!(matches!(result, Err(AuthServiceError::EmailTaken)));
    assert!(sender.sent().is_empty());
}

#[tokio::test]
async fn should_validate_sign_up_fields() {
    let users = MockUserRepo::empty();
    let store = MockVerificationRepo::empty();
    let sender = MockSender::new();
    let uc = sign_up_uc(&users, &store, &sender);

    let cases = [
        (
            SignUpInput {
                name: " ".to_owned(),
                ..sign_up_input()
            },
            "Name is required",
        ),
        (
            SignUpInput {
                email: "not-an-email".to_owned(),
                ..sign_up_input()
            },
            "Invalid email address",
        ),
        (
            SignUpInput {
                password: "short".to_owned(),
                ..sign_up_input()
            },
            "Password must be at least 8 characters",
        ),
        (
            SignUpInput {
                phone: Some("5551234".to_owned()),
                ..sign_up_input()
            },
            "Invalid phone number",
        ),
    ];

    for (input, expected) in cases {
        match uc.execute(input).await {
            Err(AuthServiceError::InvalidInput(message)) => assert_eq!(message, expected),
            other => panic!("expected InvalidInput({expected}), got {other:?}"),
        }
    }
    assert!(users.users.lock().unwrap().is_empty());
}

// ── VerifyEmail ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_mark_email_verified_with_code() {
    let users = MockUserRepo::empty();
    let store = MockVerificationRepo::empty();
    let sender = MockSender::new();
    let user = sign_up_uc(&users, &store, &sender)
        .execute(sign_up_input())
        .await
        .unwrap();
    let uc = VerifyEmailUseCase {
        users: users.clone(),
        verify: verify(&store),
    };

    uc.execute("sam@example.com", &sender.last_code())
        .await
        .unwrap();

    assert!(users.get(user.id).unwrap().email_verified);
}

#[tokio::test]
async fn should_leave_email_unverified_for_wrong_code() {
    let users = MockUserRepo::empty();
    let store = MockVerificationRepo::empty();
    let sender = MockSender::new();
    let user = sign_up_uc(&users, &store, &sender)
        .execute(sign_up_input())
        .await
        .unwrap();
    let uc = VerifyEmailUseCase {
        users: users.clone(),
        verify: verify(&store),
    };

    let result = uc.execute("sam@example.com", WRONG_CODE).await;

    assert!(matches!(result, Err(AuthServiceError::InvalidCode)));
    assert!(!users.get(user.id).unwrap().email_verified);
}

// ── Profile ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_not_found_for_missing_account() {
    let uc = GetAccountUseCase {
        users: MockUserRepo::empty(),
    };

    let result = uc.execute(test_user().id).await;

    assert!(matches!(result, Err(AuthServiceError::UserNotFound)));
}

#[tokio::test]
async fn should_update_name_and_phone() {
    let users = MockUserRepo::new(vec![test_user()]);
    let uc = UpdateAccountUseCase {
        users: users.clone(),
    };

    let updated = uc
        .execute(UpdateAccountInput {
            user_id: test_user().id,
            name: Some("Jane Q. Doe".to_owned()),
            phone: Some(Some(" +15551234567 ".to_owned())),
        })
        .await
        .unwrap();

    assert_eq!(updated.name, "Jane Q. Doe");
    assert_eq!(updated.phone.as_deref(), Some("+15551234567"));
}

#[tokio::test]
async fn should_clear_phone_with_empty_value() {
    let mut user = test_user();
    user.phone = Some("+15551234567".to_owned());
    let users = MockUserRepo::new(vec![user.clone()]);
    let uc = UpdateAccountUseCase {
        users: users.clone(),
    };

    let updated = uc
        .execute(UpdateAccountInput {
            user_id: user.id,
            name: None,
            phone: Some(Some(String::new())),
        })
        .await
        .unwrap();

    assert!(updated.phone.is_none());
    assert_eq!(updated.name, "Jane Doe");
}

#[tokio::test]
async fn should_leave_phone_untouched_when_omitted() {
    let mut user = test_user();
    user.phone = Some("+15551234567".to_owned());
    let users = MockUserRepo::new(vec![user.clone()]);
    let uc = UpdateAccountUseCase {
        users: users.clone(),
    };

    let updated = uc
        .execute(UpdateAccountInput {
            user_id: user.id,
            name: Some("J. Doe".to_owned()),
            phone: None,
        })
        .await
        .unwrap();

    assert_eq!(updated.phone.as_deref(), Some("+15551234567"));
}

#[tokio::test]
async fn should_toggle_two_factor() {
    let users = MockUserRepo::new(vec![test_user()]);
    let uc = SetTwoFactorUseCase {
        users: users.clone(),
    };

    let enabled = uc.execute(test_user().id, true).await.unwrap();
    assert!(enabled.two_factor_enabled);

    let disabled = uc.execute(test_user().id, false).await.unwrap();
    assert!(!disabled.two_factor_enabled);
}
