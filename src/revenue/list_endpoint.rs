//! Defines the endpoint for listing the revenues received in a month or year.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use time::OffsetDateTime;

use crate::{
    Error,
    app_state::FinanceState,
    period::{Period, PeriodQuery},
    revenue::{Revenue, get_revenues_received_in},
};

/// A route handler for listing the revenues received in the requested period, newest first.
pub async fn list_revenues_endpoint(
    State(state): State<FinanceState>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Result<Json<Vec<Revenue>>, Error> {
    let Query(query) = query?;
    let local_offset = state.local_offset()?;
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();
    let window = Period::from_query(&query, today)?.window(local_offset)?;

    let connection = state.lock_connection()?;
    let revenues = get_revenues_received_in(&window, &connection)?;

    Ok(Json(revenues))
}
