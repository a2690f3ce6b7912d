//! Message templates for one-time codes.

use portal_domain::verification::{CODE_TTL_SECS, VerificationPurpose};

use crate::domain::delivery::{EmailMessage, SmsMessage};

fn headline(purpose: VerificationPurpose) -> &'static str {
    match purpose {
        VerificationPurpose::EmailTwoFactor | VerificationPurpose::SmsTwoFactor => {
            "sign-in verification code"
        }
        VerificationPurpose::PasswordReset => "password reset code",
        VerificationPurpose::EmailVerification => "email verification code",
    }
}

fn ttl_minutes() -> i64 {
    CODE_TTL_SECS / 60
}

pub fn render_email(
    app_name: &str,
    to: &str,
    purpose: VerificationPurpose,
    code: &str,
) -> EmailMessage {
    let headline = headline(purpose);
    let minutes = ttl_minutes();
    EmailMessage {
        to: to.to_owned(),
        subject: format!("Your {app_name} {headline}"),
        html: format!(
            "<p>Your {headline} is:</p>\
             <p style=\"font-size:24px;font-weight:bold;letter-spacing:4px\">{code}</p>\
             <p>This code expires in {minutes} minutes. If you did not request it, you can ignore this email.</p>"
        ),
        text: format!(
            "Your {headline} is {code}. It expires in {minutes} minutes. \
             If you did not request it, you can ignore this email."
        ),
    }
}

pub fn render_sms(app_name: &str, to: &str, purpose: VerificationPurpose, code: &str) -> SmsMessage {
    SmsMessage {
        to: to.to_owned(),
        body: format!(
            "{app_name}: your {} is {code}. It expires in {} minutes.",
            headline(purpose),
            ttl_minutes()
        ),
    }
}
