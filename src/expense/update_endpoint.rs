//! Defines the endpoint for changing the payment status of an expense.

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
};
use serde::Deserialize;
use serde_json::json;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    Error,
    app_state::FinanceState,
    audit::{AuditAction, record_audit_event},
    database_id::DatabaseID,
    expense::{Expense, ExpenseStatus, set_expense_status},
    timestamp::parse_timestamp_field,
    user::User,
};

/// The JSON body for changing the status of an expense.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStatusRequest {
    /// The new status. Defaults to paid.
    pub status: Option<ExpenseStatus>,
    /// When the expense was paid. Defaults to now when marking an expense as paid.
    pub paid_at: Option<String>,
}

/// A route handler for changing the status of an expense, e.g. marking it as paid.
///
/// Marking an expense as paid sets `paidAt`, any other status clears it.
pub async fn update_expense_status_endpoint(
    State(state): State<FinanceState>,
    Extension(user): Extension<User>,
    expense_id: Result<Path<DatabaseID>, PathRejection>,
    payload: Result<Json<ExpenseStatusRequest>, JsonRejection>,
) -> Result<Json<Expense>, Error> {
    let Path(expense_id) = expense_id?;
    let Json(request) = payload?;

    let status = request.status.unwrap_or(ExpenseStatus::Paid);
    let paid_at = match (status, request.paid_at.as_deref()) {
        (ExpenseStatus::Paid, Some(paid_at)) => Some(parse_timestamp_field(
            "paidAt",
            paid_at,
            state.local_offset()?,
        )?),
        (ExpenseStatus::Paid, None) => Some(OffsetDateTime::now_utc()),
        _ => None,
    };

    let mut connection = state.lock_connection()?;
    let transaction = connection.transaction()?;

    let expense = set_expense_status(expense_id, status, paid_at, &transaction)?;
    let paid_at = expense
        .paid_at
        .map(|paid_at| paid_at.format(&Rfc3339))
        .transpose()
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;
    record_audit_event(
        user.id,
        AuditAction::UpdateExpense,
        Some(expense.id),
        Some(json!({ "status": status, "paidAt": paid_at })),
        &transaction,
    )?;

    transaction.commit()?;

    tracing::info!(
        "User {} set the status of expense {} to {status}",
        user.id,
        expense.id
    );

    Ok(Json(expense))
}

#[cfg(test)]
mod tests {
    use axum::{
        Extension, Json,
        extract::{Path, State},
    };
    use serde_json::json;
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        audit::get_recent_audit_log,
        expense::{ExpenseCategory, ExpenseStatus, NewExpense, create_expense, get_expense},
        money::Money,
        test_utils::{get_finance_state, get_test_connection, insert_test_user},
    };

    use super::{ExpenseStatusRequest, update_expense_status_endpoint};

    fn new_expense() -> NewExpense {
        NewExpense {
            category: ExpenseCategory::Maintenance,
            description: "Conserto do portão".to_owned(),
            amount: Money::from_cents(3000),
            due_date: datetime!(2026-01-20 00:00 UTC),
            paid_at: None,
            vendor: None,
            payment_method: None,
        }
    }

    #[tokio::test]
    async fn status_defaults_to_paid_now() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection);
        let expense = create_expense(new_expense(), &connection).unwrap();
        let state = get_finance_state(connection);
        let before = OffsetDateTime::now_utc();

        let Json(updated) = update_expense_status_endpoint(
            State(state),
            Extension(user),
            Ok(Path(expense.id)),
            Ok(Json(ExpenseStatusRequest::default())),
        )
        .await
        .unwrap();

        assert_eq!(updated.status, ExpenseStatus::Paid);
        let paid_at = updated.paid_at.expect("paid_at should be set");
        assert!(paid_at >= before - time::Duration::milliseconds(1));
    }

    #[tokio::test]
    async fn repeating_the_same_update_does_not_change_the_expense() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection);
        let expense = create_expense(new_expense(), &connection).unwrap();
        let state = get_finance_state(connection);
        let request = || ExpenseStatusRequest {
            status: Some(ExpenseStatus::Paid),
            paid_at: Some("2026-01-18T10:00:00Z".to_owned()),
        };

        let Json(first) = update_expense_status_endpoint(
            State(state.clone()),
            Extension(user.clone()),
            Ok(Path(expense.id)),
            Ok(Json(request())),
        )
        .await
        .unwrap();
        let Json(second) = update_expense_status_endpoint(
            State(state.clone()),
            Extension(user),
            Ok(Path(expense.id)),
            Ok(Json(request())),
        )
        .await
        .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.paid_at, Some(datetime!(2026-01-18 10:00 UTC)));
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_expense(expense.id, &connection).unwrap(), second);
    }

    #[tokio::test]
    async fn writes_audit_entry_with_new_status() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection);
        let expense = create_expense(new_expense(), &connection).unwrap();
        let state = get_finance_state(connection);

        update_expense_status_endpoint(
            State(state.clone()),
            Extension(user),
            Ok(Path(expense.id)),
            Ok(Json(ExpenseStatusRequest {
                status: Some(ExpenseStatus::Paid),
                paid_at: Some("2026-01-18T10:00:00Z".to_owned()),
            })),
        )
        .await
        .unwrap();

        let connection = state.db_connection.lock().unwrap();
        let audit_log = get_recent_audit_log(10, &connection).unwrap();
        assert_eq!(audit_log[0].action, "UPDATE_EXPENSE");
        assert_eq!(audit_log[0].entity_id, Some(expense.id));
        assert_eq!(
            audit_log[0].metadata,
            Some(json!({"status": "PAGO", "paidAt": "2026-01-18T10:00:00Z"}))
        );
    }

    #[tokio::test]
    async fn setting_pending_clears_paid_at() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection);
        let mut expense = new_expense();
        expense.paid_at = Some(datetime!(2026-01-18 10:00 UTC));
        let expense = create_expense(expense, &connection).unwrap();
        let state = get_finance_state(connection);

        let Json(updated) = update_expense_status_endpoint(
            State(state.clone()),
            Extension(user),
            Ok(Path(expense.id)),
            Ok(Json(ExpenseStatusRequest {
                status: Some(ExpenseStatus::Pending),
                paid_at: Some("2026-01-18T10:00:00Z".to_owned()),
            })),
        )
        .await
        .unwrap();

        assert_eq!(updated.status, ExpenseStatus::Pending);
        assert_eq!(updated.paid_at, None);
        let connection = state.db_connection.lock().unwrap();
        let audit_log = get_recent_audit_log(10, &connection).unwrap();
        assert_eq!(
            audit_log[0].metadata,
            Some(json!({"status": "PENDENTE", "paidAt": null}))
        );
    }

    #[tokio::test]
    async fn unknown_expense_is_not_found() {
        let connection = get_test_connection();
        let user = insert_test_user(&connection);
        let state = get_finance_state(connection);

        let result = update_expense_status_endpoint(
            State(state),
            Extension(user),
            Ok(Path(999)),
            Ok(Json(ExpenseStatusRequest::default())),
        )
        .await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}
