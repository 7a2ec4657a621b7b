//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error, PasswordHash,
    text_enum::text_enum,
    timestamp::{get_timestamp, to_millis},
};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

text_enum! {
    /// What a user is allowed to do.
    pub enum Role: "role" {
        /// Full access to the school's finances.
        Admin => "ADMIN",
        /// Office staff.
        Staff => "STAFF",
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The email address the user logs in with.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// What the user is allowed to do.
    pub role: Role,
    /// When the user was created.
    pub created_at: OffsetDateTime,
}

/// The fields needed to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The email address the user logs in with.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// What the user is allowed to do.
    pub role: Role,
}

/// The parts of a [User] that are safe to send to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    /// The user's ID.
    pub id: UserID,
    /// The email address the user logs in with.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// What the user is allowed to do.
    pub role: Role,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                password TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at INTEGER NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        role: row.get(4)?,
        created_at: get_timestamp(row, 5)?,
    })
}

/// Create and insert a new user into the database.
///
/// Emails are stored trimmed and lowercased.
///
/// # Errors
///
/// Returns a:
/// - [Error::DuplicateEmail] if a user with the same email already exists,
/// - [Error::SqlError] if some other SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let email = normalize_email(&new_user.email);
    let created_at = OffsetDateTime::now_utc();

    connection
        .execute(
            "INSERT INTO user (email, name, password, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                &email,
                &new_user.name,
                new_user.password_hash.as_ref(),
                new_user.role,
                to_millis(created_at),
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    && desc.contains("user.email") =>
            {
                Error::DuplicateEmail(email.clone())
            }
            error => error.into(),
        })?;

    let id = UserID::new(connection.last_insert_rowid());

    get_user_by_id(id, connection)
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare("SELECT id, email, name, password, role, created_at FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user that logs in with `email`, ignoring case and surrounding whitespace.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has the email address.
pub fn get_user_by_email(email: &str, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(
            "SELECT id, email, name, password, role, created_at FROM user WHERE email = :email",
        )?
        .query_row(&[(":email", &normalize_email(email))], map_user_row)
        .map_err(|error| error.into())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
