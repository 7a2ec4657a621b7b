//! Sums of revenues and expenses over a month or a year.
//!
//! The revenue, paid and pending totals are bound to the requested window.
//! The overdue total counts every unpaid expense due before now, whatever
//! window was requested.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use rusqlite::{Connection, Params};
use serde::Serialize;
use time::{Month, OffsetDateTime, UtcOffset};

use crate::{
    Error,
    app_state::FinanceState,
    financial_settings::get_financial_settings,
    money::Money,
    period::{DateWindow, Period, PeriodQuery},
    timestamp::to_millis,
};

/// The totals for a period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    pub total_revenues: Money,
    pub total_expenses_paid: Money,
    pub total_expenses_pending: Money,
    pub total_expenses_overdue: Money,
    /// Revenues minus paid expenses.
    pub balance: Money,
    pub revenues_count: i64,
    pub expenses_paid_count: i64,
    pub expenses_pending_count: i64,
    pub expenses_overdue_count: i64,
}

struct Total {
    amount: Money,
    count: i64,
}

fn query_total<P: Params>(sql: &str, params: P, connection: &Connection) -> Result<Total, Error> {
    connection
        .query_row(sql, params, |row| {
            Ok(Total {
                amount: Money::from_cents(row.get(0)?),
                count: row.get(1)?,
            })
        })
        .map_err(Error::from)
}

/// Calculate the totals for `window`, using `now` to find overdue expenses.
pub fn get_balance_summary(
    window: &DateWindow,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<BalanceSummary, Error> {
    let range = (window.start_millis(), window.end_millis());

    let revenues = query_total(
        "SELECT COALESCE(SUM(amount), 0), COUNT(*) FROM revenue
         WHERE received_at BETWEEN ?1 AND ?2",
        range,
        connection,
    )?;
    let paid = query_total(
        "SELECT COALESCE(SUM(amount), 0), COUNT(*) FROM expense
         WHERE status = 'PAGO' AND paid_at BETWEEN ?1 AND ?2",
        range,
        connection,
    )?;
    let pending = query_total(
        "SELECT COALESCE(SUM(amount), 0), COUNT(*) FROM expense
         WHERE status = 'PENDENTE' AND due_date BETWEEN ?1 AND ?2",
        range,
        connection,
    )?;
    let overdue = query_total(
        "SELECT COALESCE(SUM(amount), 0), COUNT(*) FROM expense
         WHERE status IN ('PENDENTE', 'ATRASADO') AND due_date < ?1",
        (to_millis(now),),
        connection,
    )?;

    Ok(BalanceSummary {
        total_revenues: revenues.amount,
        total_expenses_paid: paid.amount,
        total_expenses_pending: pending.amount,
        total_expenses_overdue: overdue.amount,
        balance: revenues.amount - paid.amount,
        revenues_count: revenues.count,
        expenses_paid_count: paid.count,
        expenses_pending_count: pending.count,
        expenses_overdue_count: overdue.count,
    })
}

/// The totals for one month of an [AnnualBalance].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBalance {
    /// The month number from 1 to 12.
    pub month: u8,
    #[serde(flatten)]
    pub summary: BalanceSummary,
}

/// A year's totals broken down by month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualBalance {
    pub year: i32,
    pub months: Vec<MonthlyBalance>,
    pub total: BalanceSummary,
    /// The earliest month with the highest balance.
    pub best_month: u8,
    /// The earliest month with the lowest balance.
    pub worst_month: u8,
    pub emergency_reserve: Money,
    /// The year's balance minus the emergency reserve.
    pub available_balance: Money,
}

/// Calculate the totals for `year` and each of its months.
pub fn get_annual_balance(
    year: i32,
    local_offset: UtcOffset,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<AnnualBalance, Error> {
    let mut months = Vec::with_capacity(12);
    let mut month = Month::January;

    for _ in 0..12 {
        let window = Period::month(year, month).window(local_offset)?;
        months.push(MonthlyBalance {
            month: month.into(),
            summary: get_balance_summary(&window, now, connection)?,
        });
        month = month.next();
    }

    let total = get_balance_summary(&Period::year(year).window(local_offset)?, now, connection)?;

    let mut best = &months[0];
    let mut worst = &months[0];
    for monthly in &months[1..] {
        if monthly.summary.balance > best.summary.balance {
            best = monthly;
        }
        if monthly.summary.balance < worst.summary.balance {
            worst = monthly;
        }
    }
    let (best_month, worst_month) = (best.month, worst.month);

    let emergency_reserve = get_financial_settings(connection)?.emergency_reserve;

    Ok(AnnualBalance {
        year,
        months,
        total,
        best_month,
        worst_month,
        emergency_reserve,
        available_balance: total.balance - emergency_reserve,
    })
}

/// A route handler for the totals of a month or a year.
pub async fn get_balance_endpoint(
    State(state): State<FinanceState>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<BalanceSummary>, Error> {
    let Query(query) = query?;
    let local_offset = state.local_offset()?;
    let now = OffsetDateTime::now_utc();
    let period = Period::from_query(&query, now.to_offset(local_offset).date())?;
    let window = period.window(local_offset)?;

    let connection = state.lock_connection()?;

    get_balance_summary(&window, now, &connection).map(Json)
}

/// A route handler for a year's totals broken down by month.
///
/// The `month` query parameter is ignored.
pub async fn get_annual_balance_endpoint(
    State(state): State<FinanceState>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<AnnualBalance>, Error> {
    let Query(query) = query?;
    let local_offset = state.local_offset()?;
    let now = OffsetDateTime::now_utc();
    let period = Period::from_query(&query, now.to_offset(local_offset).date())?;

    let connection = state.lock_connection()?;

    get_annual_balance(period.year, local_offset, now, &connection).map(Json)
}
