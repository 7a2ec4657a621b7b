//! Defines the endpoint for recording a new expense.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use time::UtcOffset;

use crate::{
    Error,
    app_state::FinanceState,
    audit::{AuditAction, record_audit_event},
    expense::{Expense, ExpenseCategory, NewExpense, create_expense},
    money::Money,
    payment_method::PaymentMethod,
    timestamp::parse_timestamp_field,
    user::User,
};

/// The JSON body for creating an expense.
///
/// Every field is optional here so that missing fields can be reported together.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRequest {
    pub category: Option<ExpenseCategory>,
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub due_date: Option<String>,
    pub paid_at: Option<String>,
    pub vendor: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

impl ExpenseRequest {
    fn validate(self, local_offset: UtcOffset) -> Result<NewExpense, Error> {
        let description = self
            .description
            .map(|description| description.trim().to_owned())
            .filter(|description| !description.is_empty());

        let (Some(category), Some(description), Some(amount), Some(due_date)) =
            (self.category, description.clone(), self.amount, self.due_date.as_deref())
        else {
            let mut missing = Vec::new();
            if self.category.is_none() {
                missing.push("category");
            }
            if description.is_none() {
                missing.push("description");
            }
            if self.amount.is_none() {
                missing.push("amount");
            }
            if self.due_date.is_none() {
                missing.push("dueDate");
            }
            return Err(Error::missing_fields(&missing));
        };

        if !amount.is_positive() {
            return Err(Error::Validation(
                "amount must be greater than zero".to_owned(),
            ));
        }
        if !amount.is_within_limit() {
            return Err(Error::Validation(format!(
                "amount must not be greater than {}",
                Money::MAX
            )));
        }

        let due_date = parse_timestamp_field("dueDate", due_date, local_offset)?;
        let paid_at = self
            .paid_at
            .as_deref()
            .map(|paid_at| parse_timestamp_field("paidAt", paid_at, local_offset))
            .transpose()?;
        let vendor = self
            .vendor
            .map(|vendor| vendor.trim().to_owned())
            .filter(|vendor| !vendor.is_empty());

        Ok(NewExpense {
            category,
            description,
            amount,
            due_date,
            paid_at,
            vendor,
            payment_method: self.payment_method,
        })
    }
}

/// A route handler for recording a new expense.
///
/// The expense is created as paid when `paidAt` is given, otherwise as pending.
pub async fn create_expense_endpoint(
    State(state): State<FinanceState>,
    Extension(user): Extension<User>,
    payload: Result<Json<ExpenseRequest>, JsonRejection>,
) -> Result<Json<Expense>, Error> {
    let Json(request) = payload?;
    let new_expense = request.validate(state.local_offset()?)?;

    let mut connection = state.lock_connection()?;
    let transaction = connection.transaction()?;

    let expense = create_expense(new_expense, &transaction)?;
    record_audit_event(
        user.id,
        AuditAction::CreateExpense,
        Some(expense.id),
        None,
        &transaction,
    )?;

    transaction.commit()?;

    tracing::info!("User {} recorded expense {}", user.id, expense.id);

    Ok(Json(expense))
}
