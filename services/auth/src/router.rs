use axum::{
    Router,
    routing::{get, patch, post, put},
};

use portal_core::health::{healthz, readyz};
use portal_core::middleware::{
    catch_panic_layer, propagate_request_id_layer, request_id_layer, trace_layer,
};

use crate::handlers::{
    account::{get_account, set_two_factor, sign_up, update_account, verify_email},
    password::{change_password, request_password_reset, reset_password},
    session::{check_session, refresh_session, sign_in, sign_out},
    two_factor::{send_2fa_code, send_sms_code, verify_2fa_code, verify_sms_code},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Account lifecycle
        .route("/api/auth/sign-up", post(sign_up))
        .route("/api/auth/email-verification", post(verify_email))
        // Sign-in
        .route("/api/auth/sign-in", post(sign_in))
        // Two-factor codes
        .route("/api/auth/send-2fa-code", post(send_2fa_code))
        .route("/api/auth/verify-2fa-code", post(verify_2fa_code))
        .route("/api/auth/sms/send-code", post(send_sms_code))
        .route("/api/auth/sms/verify-code", put(verify_sms_code))
        // Session
        .route(
            "/api/auth/session",
            get(check_session).patch(refresh_session).delete(sign_out),
        )
        // Password reset
        .route(
            "/api/auth/password-reset",
            post(request_password_reset).put(reset_password),
        )
        // Signed-in account
        .route("/api/account", get(get_account).patch(update_account))
        .route("/api/account/password", put(change_password))
        .route("/api/account/two-factor", patch(set_two_factor))
        .with_state(state)
        .layer(catch_panic_layer())
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
}
