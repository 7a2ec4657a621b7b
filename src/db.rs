//! Creates the application's database schema.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, audit::create_audit_log_table, expense::create_expense_table,
    financial_settings::create_financial_settings_table, revenue::create_revenue_table,
    user::create_user_table,
};

/// Create the tables for all of the domain models.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
///
/// Returns an [Error::SqlError] if any of the tables could not be created.
/// No tables are created if an error is returned.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_audit_log_table(&transaction)?;
    create_expense_table(&transaction)?;
    create_revenue_table(&transaction)?;
    create_financial_settings_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
