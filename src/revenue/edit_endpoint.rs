//! Defines the endpoint for editing a revenue.

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
};

use crate::{
    Error,
    app_state::FinanceState,
    audit::{AuditAction, record_audit_event},
    database_id::DatabaseID,
    revenue::{Revenue, RevenueRequest, update_revenue},
    user::User,
};

/// A route handler for replacing the details of a revenue.
///
/// The body is validated the same way as when creating a revenue.
pub async fn edit_revenue_endpoint(
    State(state): State<FinanceState>,
    Extension(user): Extension<User>,
    revenue_id: Result<Path<DatabaseID>, PathRejection>,
    payload: Result<Json<RevenueRequest>, JsonRejection>,
) -> Result<Json<Revenue>, Error> {
    let Path(revenue_id) = revenue_id?;
    let Json(request) = payload?;
    let data = request.validate(state.local_offset()?)?;

    let mut connection = state.lock_connection()?;
    let transaction = connection.transaction()?;

    let revenue = update_revenue(revenue_id, data, &transaction)?;
    record_audit_event(
        user.id,
        AuditAction::UpdateRevenue,
        Some(revenue.id),
        None,
        &transaction,
    )?;

    transaction.commit()?;

    tracing::info!("User {} edited revenue {}", user.id, revenue.id);

    Ok(Json(revenue))
}
