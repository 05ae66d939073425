use axum::{
    routing::{delete, get, post},
    Router,
};
use crate::backend::{handlers, AppState};
use crate::backend::handlers::{auth, budgets, expenses, incomes, reports};

/// Every route the server answers, as (methods, path). Printed by `list-routes`.
pub const ROUTES: &[(&str, &str)] = &[
    ("GET", "/health"),
    ("GET", "/api/ping"),
    ("POST", "/api/auth/register"),
    ("POST", "/api/auth/login"),
    ("GET", "/api/auth/me"),
    ("POST", "/api/auth/change-password"),
    ("GET, POST", "/api/expenses"),
    ("GET, PUT, DELETE", "/api/expenses/:id"),
    ("GET, POST", "/api/incomes"),
    ("GET, PUT, DELETE", "/api/incomes/:id"),
    ("GET, POST", "/api/budgets"),
    ("DELETE", "/api/budgets/:id"),
    ("GET", "/api/budgets/status"),
    ("GET", "/api/budgets/rules-status"),
    ("GET", "/api/reports/weekly-snapshot"),
    ("GET, POST", "/api/reports/weekly-focus"),
    ("GET", "/api/reports/monthly"),
    ("GET", "/api/reports/monthly/csv"),
];

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/ping", get(handlers::ping))
        .merge(auth_routes())
        .merge(entry_routes())
        .merge(budget_routes())
        .merge(report_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/change-password", post(auth::change_password))
}

fn entry_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/expenses",
            get(expenses::list_expenses).post(expenses::create_expense),
        )
        .route(
            "/api/expenses/:id",
            get(expenses::get_expense)
                .put(expenses::update_expense)
                .delete(expenses::delete_expense),
        )
        .route(
            "/api/incomes",
            get(incomes::list_incomes).post(incomes::create_income),
        )
        .route(
            "/api/incomes/:id",
            get(incomes::get_income)
                .put(incomes::update_income)
                .delete(incomes::delete_income),
        )
}

fn budget_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/budgets",
            get(budgets::list_budgets).post(budgets::upsert_budget),
        )
        .route("/api/budgets/:id", delete(budgets::delete_budget))
        .route("/api/budgets/status", get(budgets::budget_status_for_month))
        .route("/api/budgets/rules-status", get(budgets::rules_status_for_month))
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reports/weekly-snapshot", get(reports::weekly_snapshot_report))
        .route(
            "/api/reports/weekly-focus",
            get(reports::get_weekly_focus).post(reports::set_weekly_focus),
        )
        .route("/api/reports/monthly", get(reports::monthly))
        .route("/api/reports/monthly/csv", get(reports::monthly_csv))
}
