//! Resolves the user behind a request's session cookie and guards routes that need one.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::cookie::get_session_token,
    endpoints,
    session::{SessionKey, verify_token},
    user::{User, get_user_by_id},
};

/// The state needed to authenticate requests.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The key used to verify session tokens.
    pub session_key: SessionKey,
    /// Whether the session cookie is only sent over HTTPS.
    pub secure_cookies: bool,
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            session_key: state.session_key.clone(),
            secure_cookies: state.secure_cookies,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Get the user whose session token is in `jar`.
///
/// Returns `None` if there is no session cookie, the token is invalid or
/// expired, or the user no longer exists. The reason is never reported to the
/// client, database errors are only logged.
pub fn current_user(jar: &CookieJar, state: &AuthState) -> Option<User> {
    let token = get_session_token(jar)?;
    let payload = verify_token(&token, &state.session_key).ok()?;

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return None;
        }
    };

    match get_user_by_id(payload.user_id, &connection) {
        Ok(user) => Some(user),
        Err(Error::NotFound) => {
            tracing::debug!("Session token for unknown user {}", payload.user_id);
            None
        }
        Err(error) => {
            tracing::error!("Could not look up the user for a session: {error}");
            None
        }
    }
}

/// Middleware for API routes that need a logged in user.
///
/// The [User] is placed into the request extensions if the session is valid,
/// otherwise a 401 JSON error is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user): Extension<User>` to receive the user.
pub async fn api_auth_guard(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match current_user(&jar, &state) {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => Error::Unauthenticated.into_response(),
    }
}

/// Middleware for pages that need a logged in user.
///
/// Redirects to the log in page if the session is missing or invalid.
pub async fn page_auth_guard(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match current_user(&jar, &state) {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => Redirect::to(endpoints::LOG_IN_VIEW).into_response(),
    }
}

/// Middleware for the log in page that sends logged in users to the dashboard.
pub async fn redirect_if_authenticated(
    State(state): State<AuthState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    match current_user(&jar, &state) {
        Some(_) => Redirect::to(endpoints::DASHBOARD_VIEW).into_response(),
        None => next.run(request).await,
    }
}
