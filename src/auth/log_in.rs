//! This file defines the routes for displaying the log-in page and handling log-in requests.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use axum_extra::extract::CookieJar;
use maud::{Markup, PreEscaped, html};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    Error,
    audit::{AuditAction, record_audit_event},
    auth::{cookie::set_session_cookie, gateway::AuthState},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, log_in_layout},
    session::create_token,
    user::get_user_by_email,
};

/// The JSON body of a log in request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LogInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Handler for log-in requests.
///
/// On success the session cookie is set and `{"ok": true}` is returned.
///
/// # Errors
///
/// - [Error::Validation] if the email or password is missing.
/// - [Error::InvalidCredentials] if the email is unknown or the password is
///   wrong. Both cases produce the same response.
pub async fn log_in_endpoint(
    State(state): State<AuthState>,
    jar: CookieJar,
    payload: Result<Json<LogInRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<Value>), Error> {
    let Json(request) = payload?;

    let email = request
        .email
        .map(|email| email.trim().to_owned())
        .filter(|email| !email.is_empty());
    let password = request.password.filter(|password| !password.is_empty());
    let (Some(email), Some(password)) = (email.as_deref(), password.as_deref()) else {
        return Err(Error::Validation(
            "email and password are required".to_owned(),
        ));
    };

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("Could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let user = match get_user_by_email(email, &connection) {
        Ok(user) => user,
        Err(Error::NotFound) => {
            tracing::debug!("Log in attempt for unknown email");
            return Err(Error::InvalidCredentials);
        }
        Err(error) => return Err(error),
    };

    let is_password_valid = user.password_hash.verify(password).map_err(|error| {
        tracing::error!("Unhandled error while verifying credentials: {error}");
        Error::HashingError(error.to_string())
    })?;

    if !is_password_valid {
        tracing::debug!("Wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let token = create_token(user.id, &state.session_key)?;
    record_audit_event(user.id, AuditAction::LogIn, None, None, &connection)?;

    tracing::info!("User {} logged in", user.id);

    Ok((
        set_session_cookie(jar, token, state.secure_cookies),
        Json(json!({ "ok": true })),
    ))
}

const LOG_IN_SCRIPT: &str = r#"
document.getElementById("log-in-form").addEventListener("submit", async (event) => {
    event.preventDefault();
    const form = event.target;
    const error = document.getElementById("log-in-error");
    const response = await fetch(form.action, {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify({ email: form.email.value, password: form.password.value }),
    });
    if (response.ok) {
        window.location.href = form.dataset.redirect;
    } else {
        const body = await response.json().catch(() => ({}));
        error.textContent = body.error || "Não foi possível entrar.";
    }
});
"#;

fn log_in_form() -> Markup {
    html! {
        form
            id="log-in-form"
            action=(endpoints::LOG_IN_API)
            method="post"
            data-redirect=(endpoints::DASHBOARD_VIEW)
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "E-mail" }

                input
                    type="email"
                    name="email"
                    id="email"
                    placeholder="secretaria@escola.com.br"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus;
            }

            div
            {
                label for="password" class=(FORM_LABEL_STYLE) { "Senha" }

                input
                    type="password"
                    name="password"
                    id="password"
                    placeholder="••••••••"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required;
            }

            p id="log-in-error" class="text-red-600" {}

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Entrar" }
        }

        script { (PreEscaped(LOG_IN_SCRIPT)) }
    }
}

/// Display the log-in page.
pub async fn get_log_in_page() -> Markup {
    base("Entrar", &log_in_layout("Acesse sua conta", &log_in_form()))
}

#[cfg(test)]
mod log_in_tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        AppState,
        audit::get_recent_audit_log,
        auth::{cookie::COOKIE_SESSION, gateway::AuthState},
        endpoints,
        session::verify_token,
        test_utils::{
            TEST_PASSWORD, assert_valid_html, get_test_app_state, insert_test_user,
            parse_html_document,
        },
    };

    use super::{get_log_in_page, log_in_endpoint};

    fn get_test_server(state: &AppState) -> TestServer {
        let auth_state = AuthState {
            session_key: state.session_key.clone(),
            secure_cookies: state.secure_cookies,
            db_connection: state.db_connection.clone(),
        };
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(log_in_endpoint))
            .route(endpoints::LOG_IN_VIEW, axum::routing::get(get_log_in_page))
            .with_state(auth_state);

        TestServer::new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn log_in_sets_session_cookie() {
        let state = get_test_app_state();
        let user = insert_test_user(&state.db_connection.lock().unwrap());
        let server = get_test_server(&state);

        let response = server
            .post(endpoints::LOG_IN_API)
            .json(&json!({"email": "secretaria@escola.test", "password": TEST_PASSWORD}))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({"ok": true}));
        let cookie = response.cookie(COOKIE_SESSION);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        let payload = verify_token(cookie.value(), &state.session_key).unwrap();
        assert_eq!(payload.user_id, user.id);

        let connection = state.db_connection.lock().unwrap();
        let audit_log = get_recent_audit_log(10, &connection).unwrap();
        assert_eq!(audit_log[0].action, "LOG_IN");
        assert_eq!(audit_log[0].user_id, user.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_get_same_response() {
        let state = get_test_app_state();
        insert_test_user(&state.db_connection.lock().unwrap());
        let server = get_test_server(&state);

        let wrong_password = server
            .post(endpoints::LOG_IN_API)
            .json(&json!({"email": "secretaria@escola.test", "password": "wrong"}))
            .await;
        let unknown_email = server
            .post(endpoints::LOG_IN_API)
            .json(&json!({"email": "ninguem@escola.test", "password": TEST_PASSWORD}))
            .await;

        wrong_password.assert_status(StatusCode::UNAUTHORIZED);
        unknown_email.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.text(), unknown_email.text());
        wrong_password.assert_json(&json!({"error": "Invalid email or password"}));
        assert!(wrong_password.maybe_cookie(COOKIE_SESSION).is_none());
    }

    #[tokio::test]
    async fn missing_password_is_bad_request() {
        let state = get_test_app_state();
        let server = get_test_server(&state);

        let response = server
            .post(endpoints::LOG_IN_API)
            .json(&json!({"email": "secretaria@escola.test"}))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({"error": "email and password are required"}));
    }

    #[tokio::test]
    async fn log_in_page_has_form() {
        let state = get_test_app_state();
        let server = get_test_server(&state);

        let response = server.get(endpoints::LOG_IN_VIEW).await;

        response.assert_status_ok();
        let document = parse_html_document(&response);
        assert_valid_html(&document);
        let selector = scraper::Selector::parse("form#log-in-form").unwrap();
        let form = document.select(&selector).next().expect("No log in form");
        assert_eq!(form.value().attr("action"), Some(endpoints::LOG_IN_API));
        let password_selector = scraper::Selector::parse("input[type=password]").unwrap();
        assert!(document.select(&password_selector).next().is_some());
    }
}
