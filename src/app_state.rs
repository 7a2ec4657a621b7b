//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::FromRef;
use rusqlite::Connection;
use time::UtcOffset;

use crate::{Error, db::initialize, session::SessionKey, timezone::get_local_offset};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key used to sign and verify session tokens.
    pub session_key: SessionKey,

    /// Whether the session cookie is only sent over HTTPS.
    pub secure_cookies: bool,

    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "America/Sao_Paulo".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        session_key: SessionKey,
        local_timezone: &str,
        secure_cookies: bool,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            session_key,
            secure_cookies,
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

/// The state needed by the handlers that read and write the school's finances.
#[derive(Debug, Clone)]
pub struct FinanceState {
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FinanceState {
    /// The current UTC offset of the local timezone.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidTimezoneError] if the timezone name is not known.
    pub fn local_offset(&self) -> Result<UtcOffset, Error> {
        get_local_offset(&self.local_timezone)
            .ok_or_else(|| Error::InvalidTimezoneError(self.local_timezone.clone()))
    }

    /// Lock the database connection for the rest of the request.
    ///
    /// # Errors
    ///
    /// Returns [Error::DatabaseLockError] if the lock is poisoned.
    pub fn lock_connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.db_connection.lock().map_err(|error| {
            tracing::error!("Could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

impl FromRef<AppState> for FinanceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}
