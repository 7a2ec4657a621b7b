//! The school's emergency reserve settings, stored as a single row.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    app_state::FinanceState,
    audit::{AuditAction, record_audit_event},
    money::Money,
    timestamp::{get_timestamp, to_millis},
    user::User,
};

/// The emergency reserve the school holds and the amount it is saving towards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSettings {
    pub emergency_reserve: Money,
    pub emergency_reserve_goal: Money,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub fn create_financial_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS financial_settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            emergency_reserve INTEGER NOT NULL DEFAULT 0,
            emergency_reserve_goal INTEGER NOT NULL DEFAULT 0,
            updated_at INTEGER NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Get the financial settings, creating them with a zero reserve and goal if
/// they do not exist yet.
pub fn get_financial_settings(connection: &Connection) -> Result<FinancialSettings, Error> {
    connection.execute(
        "INSERT OR IGNORE INTO financial_settings (id, updated_at) VALUES (1, ?1)",
        (to_millis(OffsetDateTime::now_utc()),),
    )?;

    connection
        .query_row(
            "SELECT emergency_reserve, emergency_reserve_goal, updated_at
             FROM financial_settings WHERE id = 1",
            [],
            |row| {
                Ok(FinancialSettings {
                    emergency_reserve: row.get(0)?,
                    emergency_reserve_goal: row.get(1)?,
                    updated_at: get_timestamp(row, 2)?,
                })
            },
        )
        .map_err(Error::from)
}

/// The changes to make to the financial settings. Absent fields are left as is.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_reserve: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_reserve_goal: Option<Money>,
}

/// Apply `update` to the financial settings.
///
/// # Errors
///
/// Returns [Error::Validation] if either amount is negative or above [Money::MAX].
pub fn update_financial_settings(
    update: &FinancialSettingsUpdate,
    connection: &Connection,
) -> Result<FinancialSettings, Error> {
    for (field, amount) in [
        ("emergencyReserve", update.emergency_reserve),
        ("emergencyReserveGoal", update.emergency_reserve_goal),
    ] {
        if amount.is_some_and(|amount| amount.is_negative()) {
            return Err(Error::Validation(format!("{field} must not be negative")));
        }
        if amount.is_some_and(|amount| !amount.is_within_limit()) {
            return Err(Error::Validation(format!(
                "{field} must not be greater than {}",
                Money::MAX
            )));
        }
    }

    let current = get_financial_settings(connection)?;

    connection.execute(
        "UPDATE financial_settings
         SET emergency_reserve = ?1, emergency_reserve_goal = ?2, updated_at = ?3
         WHERE id = 1",
        (
            update.emergency_reserve.unwrap_or(current.emergency_reserve),
            update
                .emergency_reserve_goal
                .unwrap_or(current.emergency_reserve_goal),
            to_millis(OffsetDateTime::now_utc()),
        ),
    )?;

    get_financial_settings(connection)
}

/// A route handler for getting the emergency reserve settings.
pub async fn get_financial_settings_endpoint(
    State(state): State<FinanceState>,
) -> Result<Json<FinancialSettings>, Error> {
    let connection = state.lock_connection()?;

    get_financial_settings(&connection).map(Json)
}

/// A route handler for changing the emergency reserve or its goal.
pub async fn update_financial_settings_endpoint(
    State(state): State<FinanceState>,
    Extension(user): Extension<User>,
    payload: Result<Json<FinancialSettingsUpdate>, JsonRejection>,
) -> Result<Json<FinancialSettings>, Error> {
    let Json(update) = payload?;

    let mut connection = state.lock_connection()?;
    let transaction = connection.transaction()?;

    let settings = update_financial_settings(&update, &transaction)?;
    let metadata = serde_json::to_value(&update)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;
    record_audit_event(
        user.id,
        AuditAction::UpdateFinancialSettings,
        None,
        Some(metadata),
        &transaction,
    )?;

    transaction.commit()?;

    tracing::info!("User {} updated the financial settings", user.id);

    Ok(Json(settings))
}
