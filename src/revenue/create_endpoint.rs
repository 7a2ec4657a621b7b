//! Defines the endpoint for recording a new revenue and the request body shared with editing.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use time::{Date, UtcOffset};

use crate::{
    Error,
    app_state::FinanceState,
    audit::{AuditAction, record_audit_event},
    money::Money,
    payment_method::PaymentMethod,
    revenue::{Revenue, RevenueCategory, RevenueData, create_revenue},
    timestamp::parse_timestamp_field,
    user::User,
};

/// The JSON body for creating or editing a revenue.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueRequest {
    pub category: Option<RevenueCategory>,
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub received_at: Option<String>,
    /// Any date in the month the revenue is for. Defaults to the month of `receivedAt`.
    pub reference_month: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

impl RevenueRequest {
    pub(super) fn validate(self, local_offset: UtcOffset) -> Result<RevenueData, Error> {
        let description = self
            .description
            .map(|description| description.trim().to_owned())
            .filter(|description| !description.is_empty());

        let (Some(category), Some(description), Some(amount), Some(received_at)) = (
            self.category,
            description.clone(),
            self.amount,
            self.received_at.as_deref(),
        ) else {
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
            if self.received_at.is_none() {
                missing.push("receivedAt");
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

        let received_at = parse_timestamp_field("receivedAt", received_at, local_offset)?;
        let reference_date = match self.reference_month.as_deref() {
            Some(reference_month) => {
                parse_timestamp_field("referenceMonth", reference_month, local_offset)?
            }
            None => received_at,
        };

        Ok(RevenueData {
            category,
            description,
            amount,
            received_at,
            reference_month: first_of_month(reference_date.to_offset(local_offset).date()),
            payment_method: self.payment_method,
        })
    }
}

fn first_of_month(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

/// A route handler for recording money the school received.
pub async fn create_revenue_endpoint(
    State(state): State<FinanceState>,
    Extension(user): Extension<User>,
    payload: Result<Json<RevenueRequest>, JsonRejection>,
) -> Result<Json<Revenue>, Error> {
    let Json(request) = payload?;
    let data = request.validate(state.local_offset()?)?;

    let mut connection = state.lock_connection()?;
    let transaction = connection.transaction()?;

    let revenue = create_revenue(data, &transaction)?;
    record_audit_event(
        user.id,
        AuditAction::CreateRevenue,
        Some(revenue.id),
        None,
        &transaction,
    )?;

    transaction.commit()?;

    tracing::info!("User {} recorded revenue {}", user.id, revenue.id);

    Ok(Json(revenue))
}
