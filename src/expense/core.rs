//! The expense model and the queries for storing and fetching expenses.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::DatabaseID,
    money::Money,
    payment_method::PaymentMethod,
    period::DateWindow,
    text_enum::text_enum,
    timestamp::{get_optional_timestamp, get_timestamp, to_millis},
};

text_enum! {
    /// What the school spent money on.
    pub enum ExpenseCategory: "expense category" {
        Salaries => "SALARIOS",
        Rent => "ALUGUEL",
        Supplies => "MATERIAIS",
        Utilities => "AGUA_LUZ_INTERNET",
        Marketing => "MARKETING",
        Maintenance => "MANUTENCAO",
        Operational => "OPERACIONAL",
        Other => "OUTROS",
    }
}

text_enum! {
    /// Where an expense is in its payment lifecycle.
    pub enum ExpenseStatus: "expense status" {
        /// Not paid yet.
        Pending => "PENDENTE",
        /// Paid, `paid_at` is set.
        Paid => "PAGO",
        /// Not paid and past its due date.
        Overdue => "ATRASADO",
    }
}

/// Money the school owes or has paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID of the expense.
    pub id: DatabaseID,
    /// What the money was spent on.
    pub category: ExpenseCategory,
    /// A short description, e.g. "Conta de luz".
    pub description: String,
    /// The amount owed, always positive.
    pub amount: Money,
    /// When the expense must be paid.
    #[serde(with = "time::serde::rfc3339")]
    pub due_date: OffsetDateTime,
    /// When the expense was paid, if it has been.
    #[serde(with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
    /// The stored payment status.
    pub status: ExpenseStatus,
    /// Who the money is owed to.
    pub vendor: Option<String>,
    /// How the expense was paid.
    pub payment_method: Option<PaymentMethod>,
    /// When the expense was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Expense {
    /// The status as of `now`: a pending expense whose due date has passed is overdue.
    pub fn effective_status(&self, now: OffsetDateTime) -> ExpenseStatus {
        match self.status {
            ExpenseStatus::Pending if self.due_date < now => ExpenseStatus::Overdue,
            status => status,
        }
    }

    /// Replace the stored status with the status as of `now`.
    pub fn with_effective_status(mut self, now: OffsetDateTime) -> Self {
        self.status = self.effective_status(now);
        self
    }
}

/// The validated fields for a new expense.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: Money,
    pub due_date: OffsetDateTime,
    pub paid_at: Option<OffsetDateTime>,
    pub vendor: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            category TEXT NOT NULL,
            description TEXT NOT NULL,
            amount INTEGER NOT NULL CHECK (amount > 0),
            due_date INTEGER NOT NULL,
            paid_at INTEGER,
            status TEXT NOT NULL,
            vendor TEXT,
            payment_method TEXT,
            created_at INTEGER NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_due_date ON expense(due_date)",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_paid_at ON expense(paid_at)",
        (),
    )?;

    Ok(())
}

const EXPENSE_COLUMNS: &str = "id, category, description, amount, due_date, paid_at, status, \
    vendor, payment_method, created_at";

fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        category: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        due_date: get_timestamp(row, 4)?,
        paid_at: get_optional_timestamp(row, 5)?,
        status: row.get(6)?,
        vendor: row.get(7)?,
        payment_method: row.get(8)?,
        created_at: get_timestamp(row, 9)?,
    })
}

/// Insert a new expense.
///
/// The expense is created as paid if `paid_at` is set, otherwise as pending.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the expense could not be inserted.
pub fn create_expense(new_expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    let status = match new_expense.paid_at {
        Some(_) => ExpenseStatus::Paid,
        None => ExpenseStatus::Pending,
    };

    connection.execute(
        "INSERT INTO expense (category, description, amount, due_date, paid_at, status, vendor, payment_method, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        (
            new_expense.category,
            &new_expense.description,
            new_expense.amount,
            to_millis(new_expense.due_date),
            new_expense.paid_at.map(to_millis),
            status,
            &new_expense.vendor,
            new_expense.payment_method,
            to_millis(OffsetDateTime::now_utc()),
        ),
    )?;

    get_expense(connection.last_insert_rowid(), connection)
}

/// Get the expense with the ID `id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such expense.
pub fn get_expense(id: DatabaseID, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(&format!("SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_expense_row)
        .map_err(|error| error.into())
}

/// Get the expenses due within `window`, earliest due date first.
pub fn get_expenses_due_in(window: &DateWindow, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expense
             WHERE due_date BETWEEN ?1 AND ?2
             ORDER BY due_date ASC, id ASC"
        ))?
        .query_map((window.start_millis(), window.end_millis()), map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// Set the status of an expense in a single statement.
///
/// A paid expense keeps `paid_at`; any other status clears it.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no expense with the ID `id`.
pub fn set_expense_status(
    id: DatabaseID,
    status: ExpenseStatus,
    paid_at: Option<OffsetDateTime>,
    connection: &Connection,
) -> Result<Expense, Error> {
    let paid_at = match status {
        ExpenseStatus::Paid => paid_at,
        _ => None,
    };

    let rows_affected = connection.execute(
        "UPDATE expense SET status = ?1, paid_at = ?2 WHERE id = ?3",
        (status, paid_at.map(to_millis), id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_expense(id, connection)
}
