//! The revenue model and the queries for storing and fetching revenues.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::DatabaseID,
    money::Money,
    payment_method::PaymentMethod,
    period::DateWindow,
    text_enum::text_enum,
    timestamp::{get_timestamp, to_millis},
};

text_enum! {
    /// Where the school's money came from.
    pub enum RevenueCategory: "revenue category" {
        Enrollment => "MATRICULA",
        MonthlyFee => "MENSALIDADE",
        Installment => "PARCELAMENTO",
        ExtraFee => "TAXA_EXTRA",
        OneOffPayment => "PAGAMENTO_AVULSO",
        Other => "OUTRAS_RECEITAS",
    }
}

/// Money the school has received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revenue {
    pub id: DatabaseID,
    pub category: RevenueCategory,
    pub description: String,
    pub amount: Money,
    /// When the money was received.
    #[serde(with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
    /// The first day of the month the payment is for, e.g. the month a
    /// monthly fee covers.
    pub reference_month: Date,
    pub payment_method: Option<PaymentMethod>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The validated, editable fields of a revenue.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueData {
    pub category: RevenueCategory,
    pub description: String,
    pub amount: Money,
    pub received_at: OffsetDateTime,
    pub reference_month: Date,
    pub payment_method: Option<PaymentMethod>,
}

pub fn create_revenue_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS revenue (
            id INTEGER PRIMARY KEY,
            category TEXT NOT NULL,
            description TEXT NOT NULL,
            amount INTEGER NOT NULL CHECK (amount > 0),
            received_at INTEGER NOT NULL,
            reference_month TEXT NOT NULL,
            payment_method TEXT,
            created_at INTEGER NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_revenue_received_at ON revenue(received_at)",
        (),
    )?;

    Ok(())
}

const REVENUE_COLUMNS: &str =
    "id, category, description, amount, received_at, reference_month, payment_method, created_at";

fn map_revenue_row(row: &Row) -> Result<Revenue, rusqlite::Error> {
    Ok(Revenue {
        id: row.get(0)?,
        category: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        received_at: get_timestamp(row, 4)?,
        reference_month: row.get(5)?,
        payment_method: row.get(6)?,
        created_at: get_timestamp(row, 7)?,
    })
}

/// Insert a new revenue.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the revenue could not be inserted.
pub fn create_revenue(data: RevenueData, connection: &Connection) -> Result<Revenue, Error> {
    connection.execute(
        "INSERT INTO revenue (category, description, amount, received_at, reference_month, payment_method, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            data.category,
            &data.description,
            data.amount,
            to_millis(data.received_at),
            data.reference_month,
            data.payment_method,
            to_millis(OffsetDateTime::now_utc()),
        ),
    )?;

    get_revenue(connection.last_insert_rowid(), connection)
}

/// Replace the editable fields of the revenue with the ID `id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no revenue with the ID `id`.
pub fn update_revenue(
    id: DatabaseID,
    data: RevenueData,
    connection: &Connection,
) -> Result<Revenue, Error> {
    let rows_affected = connection.execute(
        "UPDATE revenue
         SET category = ?1, description = ?2, amount = ?3, received_at = ?4,
             reference_month = ?5, payment_method = ?6
         WHERE id = ?7",
        (
            data.category,
            &data.description,
            data.amount,
            to_millis(data.received_at),
            data.reference_month,
            data.payment_method,
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_revenue(id, connection)
}

/// Get the revenue with the ID `id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such revenue.
pub fn get_revenue(id: DatabaseID, connection: &Connection) -> Result<Revenue, Error> {
    connection
        .prepare(&format!("SELECT {REVENUE_COLUMNS} FROM revenue WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_revenue_row)
        .map_err(|error| error.into())
}

/// Get the revenues received within `window`, newest first.
pub fn get_revenues_received_in(
    window: &DateWindow,
    connection: &Connection,
) -> Result<Vec<Revenue>, Error> {
    connection
        .prepare(&format!(
            "SELECT {REVENUE_COLUMNS} FROM revenue
             WHERE received_at BETWEEN ?1 AND ?2
             ORDER BY received_at DESC, id DESC"
        ))?
        .query_map((window.start_millis(), window.end_millis()), map_revenue_row)?
        .map(|maybe_revenue| maybe_revenue.map_err(Error::from))
        .collect()
}
