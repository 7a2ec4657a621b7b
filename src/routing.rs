//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, patch, post, put},
};

use crate::{
    AppState,
    auth::{
        api_auth_guard, get_current_user_endpoint, get_log_in_page, log_in_endpoint,
        log_out_endpoint, page_auth_guard, redirect_if_authenticated,
    },
    balance::{get_annual_balance_endpoint, get_balance_endpoint},
    dashboard::get_dashboard_page,
    endpoints,
    expense::{create_expense_endpoint, list_expenses_endpoint, update_expense_status_endpoint},
    financial_settings::{get_financial_settings_endpoint, update_financial_settings_endpoint},
    not_found::get_404_not_found,
    revenue::{create_revenue_endpoint, edit_revenue_endpoint, list_revenues_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(
            endpoints::LOG_IN_VIEW,
            get(get_log_in_page).layer(middleware::from_fn_with_state(
                state.clone(),
                redirect_if_authenticated,
            )),
        )
        .route(endpoints::LOG_IN_API, post(log_in_endpoint))
        .route(endpoints::LOG_OUT_API, post(log_out_endpoint));

    let protected_pages = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .layer(middleware::from_fn_with_state(state.clone(), page_auth_guard));

    let protected_api = Router::new()
        .route(endpoints::CURRENT_USER_API, get(get_current_user_endpoint))
        .route(endpoints::BALANCE_API, get(get_balance_endpoint))
        .route(endpoints::ANNUAL_BALANCE_API, get(get_annual_balance_endpoint))
        .route(
            endpoints::EXPENSES_API,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(endpoints::EXPENSE_API, patch(update_expense_status_endpoint))
        .route(
            endpoints::REVENUES_API,
            get(list_revenues_endpoint).post(create_revenue_endpoint),
        )
        .route(endpoints::REVENUE_API, put(edit_revenue_endpoint))
        .route(
            endpoints::FINANCIAL_SETTINGS_API,
            get(get_financial_settings_endpoint).put(update_financial_settings_endpoint),
        )
        .layer(middleware::from_fn_with_state(state.clone(), api_auth_guard));

    protected_pages
        .merge(protected_api)
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod routing_tests {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        auth::COOKIE_SESSION,
        endpoints,
        test_utils::{TEST_PASSWORD, get_test_app_state, insert_test_user},
    };

    use super::build_router;

    fn get_test_server() -> TestServer {
        let state = get_test_app_state();
        insert_test_user(&state.db_connection.lock().unwrap());

        TestServer::new(build_router(state)).expect("Could not create test server.")
    }

    async fn log_in(server: &TestServer) -> Cookie<'static> {
        let response = server
            .post(endpoints::LOG_IN_API)
            .json(&json!({"email": "secretaria@escola.test", "password": TEST_PASSWORD}))
            .await;
        response.assert_status_ok();

        response.cookie(COOKIE_SESSION)
    }

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let server = get_test_server();
        let cookie = log_in(&server).await;

        let response = server.get(endpoints::ROOT).add_cookie(cookie).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn dashboard_redirects_to_log_in_without_session() {
        let server = get_test_server();

        let response = server.get(endpoints::DASHBOARD_VIEW).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::LOG_IN_VIEW);
    }

    #[tokio::test]
    async fn api_routes_need_session() {
        let server = get_test_server();

        for path in [
            endpoints::CURRENT_USER_API,
            endpoints::BALANCE_API,
            endpoints::ANNUAL_BALANCE_API,
            endpoints::EXPENSES_API,
            endpoints::REVENUES_API,
            endpoints::FINANCIAL_SETTINGS_API,
        ] {
            let response = server.get(path).await;

            response.assert_status(StatusCode::UNAUTHORIZED);
            response.assert_json(&json!({"error": "Not authenticated"}));
        }
    }

    #[tokio::test]
    async fn current_user_is_returned() {
        let server = get_test_server();
        let cookie = log_in(&server).await;

        let response = server
            .get(endpoints::CURRENT_USER_API)
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["email"], "secretaria@escola.test");
        assert_eq!(body["role"], "ADMIN");
    }

    #[tokio::test]
    async fn balance_follows_expense_and_revenue_changes() {
        let server = get_test_server();
        let cookie = log_in(&server).await;

        server
            .post(endpoints::REVENUES_API)
            .add_cookie(cookie.clone())
            .json(&json!({
                "category": "MENSALIDADE",
                "description": "Mensalidade de janeiro",
                "amount": 100,
                "receivedAt": "2026-01-05",
            }))
            .await
            .assert_status_ok();
        server
            .post(endpoints::EXPENSES_API)
            .add_cookie(cookie.clone())
            .json(&json!({
                "category": "ALUGUEL",
                "description": "Aluguel",
                "amount": 50,
                "dueDate": "2026-01-10",
                "paidAt": "2026-01-10",
            }))
            .await
            .assert_status_ok();
        let pending: Value = server
            .post(endpoints::EXPENSES_API)
            .add_cookie(cookie.clone())
            .json(&json!({
                "category": "MATERIAIS",
                "description": "Material escolar",
                "amount": 30,
                "dueDate": "2026-01-20",
            }))
            .await
            .json();

        let balance: Value = server
            .get(endpoints::BALANCE_API)
            .add_query_params(&[("year", "2026"), ("month", "1")])
            .add_cookie(cookie.clone())
            .await
            .json();

        assert_eq!(balance["totalRevenues"], 100.0);
        assert_eq!(balance["totalExpensesPaid"], 50.0);
        assert_eq!(balance["totalExpensesPending"], 30.0);
        assert_eq!(balance["balance"], 50.0);

        let expense_path = format!("{}/{}", endpoints::EXPENSES_API, pending["id"]);
        let updated: Value = server
            .patch(&expense_path)
            .add_cookie(cookie.clone())
            .json(&json!({"status": "PAGO", "paidAt": "2026-01-21T12:00:00Z"}))
            .await
            .json();
        assert_eq!(updated["status"], "PAGO");
        assert_eq!(updated["paidAt"], "2026-01-21T12:00:00Z");

        let balance: Value = server
            .get(endpoints::BALANCE_API)
            .add_query_params(&[("year", "2026"), ("month", "1")])
            .add_cookie(cookie)
            .await
            .json();

        assert_eq!(balance["totalExpensesPaid"], 80.0);
        assert_eq!(balance["totalExpensesPending"], 0.0);
        assert_eq!(balance["balance"], 20.0);
    }

    #[tokio::test]
    async fn invalid_month_is_bad_request() {
        let server = get_test_server();
        let cookie = log_in(&server).await;

        let response = server
            .get(endpoints::BALANCE_API)
            .add_query_params(&[("year", "2026"), ("month", "13")])
            .add_cookie(cookie)
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn repeated_query_parameter_is_json_bad_request() {
        let server = get_test_server();
        let cookie = log_in(&server).await;

        let response = server
            .get(&format!("{}?year=2026&year=2027", endpoints::BALANCE_API))
            .add_cookie(cookie)
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn oversized_amounts_are_rejected_and_balance_still_loads() {
        let server = get_test_server();
        let cookie = log_in(&server).await;

        for amount in [1e17, 5e16, 5e16] {
            let response = server
                .post(endpoints::REVENUES_API)
                .add_cookie(cookie.clone())
                .json(&json!({
                    "category": "MENSALIDADE",
                    "description": "Mensalidade",
                    "amount": amount,
                    "receivedAt": "2026-01-05",
                }))
                .await;

            response.assert_status_bad_request();
            let body: Value = response.json();
            assert!(body["error"].is_string());
        }

        let response = server
            .get(endpoints::BALANCE_API)
            .add_query_params(&[("year", "2026"), ("month", "1")])
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let balance: Value = response.json();
        assert_eq!(balance["totalRevenues"], 0.0);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let server = get_test_server();
        let cookie = log_in(&server).await;

        let response = server
            .post(endpoints::EXPENSES_API)
            .add_cookie(cookie)
            .json(&json!({"category": "NOT_A_CATEGORY"}))
            .await;

        response.assert_status_bad_request();
        let body: Value = response.json();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_expense_is_not_found() {
        let server = get_test_server();
        let cookie = log_in(&server).await;

        let response = server
            .patch(&format!("{}/999", endpoints::EXPENSES_API))
            .add_cookie(cookie)
            .json(&json!({}))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn financial_settings_round_trip_through_api() {
        let server = get_test_server();
        let cookie = log_in(&server).await;

        let settings: Value = server
            .get(endpoints::FINANCIAL_SETTINGS_API)
            .add_cookie(cookie.clone())
            .await
            .json();
        assert_eq!(settings["emergencyReserve"], 0.0);

        server
            .put(endpoints::FINANCIAL_SETTINGS_API)
            .add_cookie(cookie.clone())
            .json(&json!({"emergencyReserveGoal": 5000.5}))
            .await
            .assert_status_ok();
        let response = server
            .put(endpoints::FINANCIAL_SETTINGS_API)
            .add_cookie(cookie)
            .json(&json!({"emergencyReserve": -1}))
            .await;

        response.assert_status_bad_request();
    }
}
