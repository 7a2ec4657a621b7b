//! The URIs for the pages and the JSON API.
//!
//! Paths with a parameter, e.g. '/api/expenses/{expense_id}', use axum's brace syntax.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/login";

/// The route for logging in with an email and password.
pub const LOG_IN_API: &str = "/api/auth/login";
/// The route for ending the current session.
pub const LOG_OUT_API: &str = "/api/auth/logout";
/// The route for getting the logged in user.
pub const CURRENT_USER_API: &str = "/api/auth/me";
/// The route for the totals of a month or a year.
pub const BALANCE_API: &str = "/api/balance";
/// The route for a year's totals broken down by month.
pub const ANNUAL_BALANCE_API: &str = "/api/balance/annual";
/// The route for listing and creating expenses.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route for changing the status of a single expense.
pub const EXPENSE_API: &str = "/api/expenses/{expense_id}";
/// The route for listing and creating revenues.
pub const REVENUES_API: &str = "/api/revenues";
/// The route for editing a single revenue.
pub const REVENUE_API: &str = "/api/revenues/{revenue_id}";
/// The route for the emergency reserve settings.
pub const FINANCIAL_SETTINGS_API: &str = "/api/financial-settings";
