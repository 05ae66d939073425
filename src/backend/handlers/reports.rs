use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{load_entries, unwrap_body, PeriodQuery};
use crate::backend::auth::AuthUser;
use crate::backend::AppState;
use crate::database::db::queries;
use crate::database::models::WeeklyFocus;
use crate::error::{Error, Result};
use crate::finance::{
    budget_status, monthly_report, rule_status, week_start, weekly_snapshot, DateRange,
    MonthlyReport, Period, WeeklySnapshot,
};
use crate::util::{checked_total, today};

const MAX_FOCUS_LEN: usize = 255;

pub async fn weekly_snapshot_report(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<WeeklySnapshot>> {
    let today = today();
    let range = DateRange::last_7_days(today);
    let (expenses, incomes) = load_entries(&state, user.id(), range).await?;
    let focus = queries::get_focus_for_week(&state.db, user.id(), week_start(today)).await?;

    debug!(user_id = user.id(), expenses = expenses.len(), incomes = incomes.len(), "weekly snapshot");
    let snapshot = weekly_snapshot(&expenses, &incomes, range, focus.map(|f| f.focus_text))?;
    Ok(Json(snapshot))
}

pub async fn get_weekly_focus(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Option<WeeklyFocus>>> {
    let focus = queries::get_focus_for_week(&state.db, user.id(), week_start(today())).await?;
    Ok(Json(focus))
}

#[derive(Debug, Deserialize)]
pub struct FocusPayload {
    #[serde(rename = "focusText")]
    pub focus_text: Option<String>,
}

pub async fn set_weekly_focus(
    State(state): State<AppState>,
    user: AuthUser,
    body: std::result::Result<Json<FocusPayload>, JsonRejection>,
) -> Result<Response> {
    let text = unwrap_body(body)?
        .focus_text
        .ok_or_else(|| Error::invalid_field("focusText", "Missing data for required field."))?;
    let text = text.trim();
    if text.chars().count() > MAX_FOCUS_LEN {
        return Err(Error::invalid_field(
            "focusText",
            format!("Length must be at most {MAX_FOCUS_LEN}."),
        ));
    }

    let week = week_start(today());
    if text.is_empty() {
        queries::delete_focus_for_week(&state.db, user.id(), week).await?;
        info!(user_id = user.id(), week = %week, "cleared weekly focus");
        let body: Value = json!({ "message": "Weekly focus cleared successfully" });
        return Ok(Json(body).into_response());
    }

    let focus = queries::upsert_focus(&state.db, user.id(), week, text).await?;
    info!(user_id = user.id(), week = %week, "set weekly focus");
    Ok(Json(focus).into_response())
}

async fn build_monthly_report(state: &AppState, user_id: i64, period: Period) -> Result<MonthlyReport> {
    let (expenses, incomes) = load_entries(state, user_id, period.range()).await?;
    let budgets =
        queries::list_budgets_for_month(&state.db, user_id, period.year(), period.month_number())
            .await?;

    let total_income = checked_total(incomes.iter().map(|i| i.amount))?;
    let budgets = budget_status(&budgets, &expenses)?;
    let rules = rule_status(&expenses, total_income)?;
    monthly_report(period, expenses, incomes, budgets, rules)
}

pub async fn monthly(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<MonthlyReport>> {
    let period = query.resolve()?;
    let report = build_monthly_report(&state, user.id(), period).await?;
    Ok(Json(report))
}

pub async fn monthly_csv(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Response> {
    let period = query.resolve()?;
    let report = build_monthly_report(&state, user.id(), period).await?;

    let mut body = Vec::new();
    report.write_csv(&mut body)?;
    info!(user_id = user.id(), period = %period.label(), bytes = body.len(), "exported monthly report");

    let disposition = format!("attachment; filename=\"{}\"", report.csv_file_name());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
