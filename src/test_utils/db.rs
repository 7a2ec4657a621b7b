use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    AppState, PasswordHash,
    app_state::FinanceState,
    db::initialize,
    session::SessionKey,
    user::{NewUser, Role, User, create_user},
};

pub(crate) const TEST_SECRET: &str = "a secret that is only used in tests";

/// The password for the user created by [insert_test_user].
pub(crate) const TEST_PASSWORD: &str = "okon";

#[track_caller]
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

#[track_caller]
pub(crate) fn insert_test_user(connection: &Connection) -> User {
    create_user(
        NewUser {
            email: "secretaria@escola.test".to_owned(),
            name: "Secretaria".to_owned(),
            // The bcrypt hash for "okon".
            password_hash: PasswordHash::new_unchecked(
                "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm",
            ),
            role: Role::Admin,
        },
        connection,
    )
    .expect("Could not create test user")
}

pub(crate) fn get_finance_state(connection: Connection) -> FinanceState {
    FinanceState {
        local_timezone: "Etc/UTC".to_owned(),
        db_connection: Arc::new(Mutex::new(connection)),
    }
}

#[track_caller]
pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not create in-memory SQLite database");

    AppState::new(
        connection,
        SessionKey::new(TEST_SECRET).expect("Could not create session key"),
        "Etc/UTC",
        true,
    )
    .expect("Could not create app state")
}
