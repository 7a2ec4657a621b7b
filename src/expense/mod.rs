mod core;
mod create_endpoint;
mod list_endpoint;
mod update_endpoint;

pub use core::{
    Expense, ExpenseCategory, ExpenseStatus, NewExpense, create_expense, create_expense_table,
    get_expenses_due_in, set_expense_status,
};
pub use create_endpoint::create_expense_endpoint;
pub use list_endpoint::list_expenses_endpoint;
pub use update_endpoint::update_expense_status_endpoint;

#[cfg(test)]
pub use core::get_expense;
