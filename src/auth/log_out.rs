//! Defines the route handler for ending a session.

use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use serde_json::{Value, json};

use crate::{
    audit::{AuditAction, record_audit_event},
    auth::{
        cookie::invalidate_session_cookie,
        gateway::{AuthState, current_user},
    },
};

/// Invalidate the session cookie.
///
/// Always succeeds. The log out is only recorded in the audit log when the
/// request carried a valid session.
pub async fn log_out_endpoint(
    State(state): State<AuthState>,
    jar: CookieJar,
) -> (CookieJar, Json<Value>) {
    if let Some(user) = current_user(&jar, &state) {
        match state.db_connection.lock() {
            Ok(connection) => {
                if let Err(error) =
                    record_audit_event(user.id, AuditAction::LogOut, None, None, &connection)
                {
                    tracing::error!("Could not record log out for user {}: {error}", user.id);
                }
            }
            Err(error) => tracing::error!("Could not acquire database lock: {error}"),
        }

        tracing::info!("User {} logged out", user.id);
    }

    (
        invalidate_session_cookie(jar, state.secure_cookies),
        Json(json!({ "ok": true })),
    )
}
