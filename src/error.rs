//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The message sent to clients when a request needs a logged in user.
pub const NOT_AUTHENTICATED_MESSAGE: &str = "Not authenticated";

/// The message sent to clients when log in fails for any reason.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

const NOT_FOUND_MESSAGE: &str = "The requested resource could not be found";

const INTERNAL_ERROR_MESSAGE: &str =
    "An unexpected error occurred, check the server logs for more details.";

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The secret used to sign session tokens is not set.
    #[error("the session secret must be set to a non-empty string")]
    MissingSecret,

    /// The email address is unknown or the password is wrong.
    ///
    /// The two cases are deliberately not distinguished.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a valid session.
    #[error("not authenticated")]
    Unauthenticated,

    /// The request was malformed. The message is shown to the client.
    #[error("{0}")]
    Validation(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A user with the email address already exists.
    #[error("a user with the email \"{0}\" already exists")]
    DuplicateEmail(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl Error {
    /// A validation error listing the request fields that were missing.
    pub fn missing_fields(fields: &[&str]) -> Self {
        Error::Validation(format!("missing required fields: {}", fields.join(", ")))
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Error::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                NOT_AUTHENTICATED_MESSAGE.to_owned(),
            ),
            Error::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                INVALID_CREDENTIALS_MESSAGE.to_owned(),
            ),
            Error::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Error::TooWeak(_) | Error::DuplicateEmail(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Error::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_owned()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_owned(),
                )
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod error_response_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::{Value, json};

    use super::Error;

    async fn get_status_and_body(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not get response body");

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn unauthenticated_is_401() {
        let (status, body) = get_status_and_body(Error::Unauthenticated).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Not authenticated"}));
    }

    #[tokio::test]
    async fn validation_message_is_shown_to_client() {
        let (status, body) =
            get_status_and_body(Error::Validation("amount must be positive".to_owned())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "amount must be positive"}));
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let (status, _) = get_status_and_body(Error::NotFound).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) =
            get_status_and_body(Error::HashingError("bcrypt exploded".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("bcrypt"));
    }

    #[test]
    fn missing_fields_are_listed() {
        assert_eq!(
            Error::missing_fields(&["category", "amount"]),
            Error::Validation("missing required fields: category, amount".to_owned())
        );
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }
}
