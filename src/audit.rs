//! The append-only audit log of changes made through the API.

use rusqlite::Connection;
use serde_json::Value;
use time::OffsetDateTime;

use crate::{Error, database_id::DatabaseID, timestamp::to_millis, user::UserID};

/// What a user did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    LogIn,
    LogOut,
    CreateExpense,
    UpdateExpense,
    CreateRevenue,
    UpdateRevenue,
    UpdateFinancialSettings,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::LogIn => "LOG_IN",
            AuditAction::LogOut => "LOG_OUT",
            AuditAction::CreateExpense => "CREATE_EXPENSE",
            AuditAction::UpdateExpense => "UPDATE_EXPENSE",
            AuditAction::CreateRevenue => "CREATE_REVENUE",
            AuditAction::UpdateRevenue => "UPDATE_REVENUE",
            AuditAction::UpdateFinancialSettings => "UPDATE_FINANCIAL_SETTINGS",
        }
    }

    /// The type of entity the action applies to.
    pub fn entity(&self) -> &'static str {
        match self {
            AuditAction::LogIn | AuditAction::LogOut => "Auth",
            AuditAction::CreateExpense | AuditAction::UpdateExpense => "Expense",
            AuditAction::CreateRevenue | AuditAction::UpdateRevenue => "Revenue",
            AuditAction::UpdateFinancialSettings => "FinancialSettings",
        }
    }
}

/// A row in the audit log.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogEntry {
    pub id: DatabaseID,
    pub user_id: UserID,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<DatabaseID>,
    pub metadata: Option<Value>,
    pub created_at: OffsetDateTime,
}

pub fn create_audit_log_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS audit_log (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            action TEXT NOT NULL,
            entity TEXT NOT NULL,
            entity_id INTEGER,
            metadata TEXT,
            created_at INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Append an entry to the audit log.
///
/// Call this with the same transaction as the change being recorded so that
/// both are committed together.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the entry could not be inserted.
pub fn record_audit_event(
    user_id: UserID,
    action: AuditAction,
    entity_id: Option<DatabaseID>,
    metadata: Option<Value>,
    connection: &Connection,
) -> Result<(), Error> {
    let metadata = metadata.map(|metadata| metadata.to_string());

    connection.execute(
        "INSERT INTO audit_log (user_id, action, entity, entity_id, metadata, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            user_id.as_i64(),
            action.as_str(),
            action.entity(),
            entity_id,
            metadata,
            to_millis(OffsetDateTime::now_utc()),
        ),
    )?;

    tracing::debug!(
        "Recorded {} on {} {:?} by user {user_id}",
        action.as_str(),
        action.entity(),
        entity_id
    );

    Ok(())
}

#[cfg(test)]
fn map_audit_log_row(row: &rusqlite::Row) -> Result<AuditLogEntry, rusqlite::Error> {
    use crate::timestamp::get_timestamp;

    let metadata: Option<String> = row.get(5)?;
    let metadata = metadata
        .map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(error))
        })?;

    Ok(AuditLogEntry {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        action: row.get(2)?,
        entity: row.get(3)?,
        entity_id: row.get(4)?,
        metadata,
        created_at: get_timestamp(row, 6)?,
    })
}

/// Get the most recent audit log entries, newest first.
#[cfg(test)]
pub fn get_recent_audit_log(limit: u32, connection: &Connection) -> Result<Vec<AuditLogEntry>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, action, entity, entity_id, metadata, created_at
             FROM audit_log ORDER BY id DESC LIMIT ?1",
        )?
        .query_map([limit], map_audit_log_row)?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}
