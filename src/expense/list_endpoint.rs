//! Defines the endpoint for listing the expenses due in a month or year.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use time::OffsetDateTime;

use crate::{
    Error,
    app_state::FinanceState,
    expense::{Expense, get_expenses_due_in},
    period::{Period, PeriodQuery},
};

/// A route handler for listing the expenses due in the requested period.
///
/// Each expense is reported with its status as of now, so a pending expense
/// past its due date is listed as overdue.
pub async fn list_expenses_endpoint(
    State(state): State<FinanceState>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<Vec<Expense>>, Error> {
    let Query(query) = query?;
    let local_offset = state.local_offset()?;
    let now = OffsetDateTime::now_utc();
    let period = Period::from_query(&query, now.to_offset(local_offset).date())?;
    let window = period.window(local_offset)?;

    let connection = state.lock_connection()?;
    let expenses = get_expenses_due_in(&window, &connection)?
        .into_iter()
        .map(|expense| expense.with_effective_status(now))
        .collect();

    Ok(Json(expenses))
}

#[cfg(test)]
mod tests {
    use axum::{
        Json,
        extract::{Query, State, rejection::QueryRejection},
    };
    use time::{Duration, OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        expense::{ExpenseCategory, ExpenseStatus, NewExpense, create_expense},
        money::Money,
        period::PeriodQuery,
        test_utils::{get_finance_state, get_test_connection},
    };

    use super::list_expenses_endpoint;

    fn new_expense(description: &str, due_date: OffsetDateTime) -> NewExpense {
        NewExpense {
            category: ExpenseCategory::Supplies,
            description: description.to_owned(),
            amount: Money::from_cents(1000),
            due_date,
            paid_at: None,
            vendor: None,
            payment_method: None,
        }
    }

    fn query(year: &str, month: Option<&str>) -> Result<Query<PeriodQuery>, QueryRejection> {
        Ok(Query(PeriodQuery {
            year: Some(year.to_owned()),
            month: month.map(str::to_owned),
        }))
    }

    #[tokio::test]
    async fn lists_expenses_for_month() {
        let connection = get_test_connection();
        create_expense(new_expense("janeiro", datetime!(2026-01-15 12:00 UTC)), &connection)
            .unwrap();
        create_expense(new_expense("fevereiro", datetime!(2026-02-15 12:00 UTC)), &connection)
            .unwrap();
        let state = get_finance_state(connection);

        let Json(expenses) = list_expenses_endpoint(State(state), query("2026", Some("1")))
            .await
            .unwrap();

        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].description, "janeiro");
    }

    #[tokio::test]
    async fn lists_expenses_for_year() {
        let connection = get_test_connection();
        create_expense(new_expense("janeiro", datetime!(2026-01-15 12:00 UTC)), &connection)
            .unwrap();
        create_expense(new_expense("fevereiro", datetime!(2026-02-15 12:00 UTC)), &connection)
            .unwrap();
        create_expense(new_expense("ano novo", datetime!(2027-01-01 00:00 UTC)), &connection)
            .unwrap();
        let state = get_finance_state(connection);

        let Json(expenses) = list_expenses_endpoint(State(state), query("2026", None))
            .await
            .unwrap();

        let descriptions: Vec<_> = expenses.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, ["janeiro", "fevereiro"]);
    }

    #[tokio::test]
    async fn reports_past_due_pending_expense_as_overdue() {
        let connection = get_test_connection();
        let now = OffsetDateTime::now_utc();
        let due_date = now - Duration::hours(1);
        create_expense(new_expense("atrasada", due_date), &connection).unwrap();
        let state = get_finance_state(connection);

        let Json(expenses) = list_expenses_endpoint(
            State(state),
            query(
                &due_date.year().to_string(),
                Some(&u8::from(due_date.month()).to_string()),
            ),
        )
        .await
        .unwrap();

        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].status, ExpenseStatus::Overdue);
    }

    #[tokio::test]
    async fn invalid_month_is_rejected() {
        let state = get_finance_state(get_test_connection());

        let result = list_expenses_endpoint(State(state), query("2026", Some("13"))).await;

        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
