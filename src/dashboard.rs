//! The dashboard page: the current month's totals and the emergency reserve.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::OffsetDateTime;

use crate::{
    Error,
    app_state::FinanceState,
    balance::{BalanceSummary, get_balance_summary},
    financial_settings::{FinancialSettings, get_financial_settings},
    html::{
        CARD_STYLE, CARD_TITLE_STYLE, CARD_VALUE_STYLE, PAGE_CONTAINER_STYLE, base, error_view,
        format_currency,
    },
    money::Money,
    period::Period,
    user::User,
};

struct DashboardData {
    year: i32,
    month: u8,
    summary: BalanceSummary,
    settings: FinancialSettings,
}

impl DashboardData {
    fn available_balance(&self) -> Money {
        self.summary.balance - self.settings.emergency_reserve
    }
}

fn get_dashboard_data(state: &FinanceState) -> Result<DashboardData, Error> {
    let local_offset = state.local_offset()?;
    let now = OffsetDateTime::now_utc();
    let today = now.to_offset(local_offset).date();
    let window = Period::month(today.year(), today.month()).window(local_offset)?;

    let connection = state.lock_connection()?;

    Ok(DashboardData {
        year: today.year(),
        month: today.month().into(),
        summary: get_balance_summary(&window, now, &connection)?,
        settings: get_financial_settings(&connection)?,
    })
}

fn card(id: &str, title: &str, amount: Money, count: Option<i64>, colour: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) data-card=(id)
        {
            h3 class=(CARD_TITLE_STYLE) { (title) }
            p class={ (CARD_VALUE_STYLE) " " (colour) } { (format_currency(amount)) }

            @if let Some(count) = count
            {
                p class="text-xs" { (count) " lançamento(s)" }
            }
        }
    }
}

fn dashboard_view(user: &User, data: &DashboardData) -> Markup {
    let summary = &data.summary;
    let balance_colour = if summary.balance.is_negative() {
        "text-red-600"
    } else {
        "text-blue-600"
    };
    let available_balance = data.available_balance();

    let content = html! {
        div class=(PAGE_CONTAINER_STYLE)
        {
            header class="w-full flex justify-between items-center mb-6"
            {
                h1 class="text-2xl font-bold" { "Painel financeiro" }
                p { (user.name) }
            }

            h2 class="text-xl font-semibold mb-4" { "Mês " (data.month) "/" (data.year) }

            section class="grid mb-8"
            {
                (card("revenues", "Receitas", summary.total_revenues, Some(summary.revenues_count), "text-green-600"))
                (card("expenses-paid", "Despesas pagas", summary.total_expenses_paid, Some(summary.expenses_paid_count), "text-red-600"))
                (card("expenses-pending", "Despesas pendentes", summary.total_expenses_pending, Some(summary.expenses_pending_count), "text-amber-600"))
                (card("expenses-overdue", "Despesas atrasadas", summary.total_expenses_overdue, Some(summary.expenses_overdue_count), "text-red-600"))
                (card("balance", "Saldo do mês", summary.balance, None, balance_colour))
            }

            section class="grid"
            {
                (card("emergency-reserve", "Reserva de emergência", data.settings.emergency_reserve, None, "text-blue-600"))
                (card("emergency-reserve-goal", "Meta da reserva", data.settings.emergency_reserve_goal, None, "text-blue-600"))
                (card("available-balance", "Saldo disponível", available_balance, None, if available_balance.is_negative() { "text-red-600" } else { "text-green-600" }))
            }
        }
    };

    base("Painel", &content)
}

/// Display the dashboard for the current month in the local timezone.
pub async fn get_dashboard_page(
    State(state): State<FinanceState>,
    Extension(user): Extension<User>,
) -> Response {
    match get_dashboard_data(&state) {
        Ok(data) => dashboard_view(&user, &data).into_response(),
        Err(error) => {
            tracing::error!("Could not load the dashboard: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_view(
                    "Erro",
                    "500",
                    "Não foi possível carregar o painel.",
                    "Tente novamente mais tarde.",
                ),
            )
                .into_response()
        }
    }
}
