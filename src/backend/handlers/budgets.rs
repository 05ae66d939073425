use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use super::{load_entries, required_amount, required_text, unwrap_body, PeriodQuery};
use crate::backend::auth::AuthUser;
use crate::backend::AppState;
use crate::database::db::queries;
use crate::database::models::{Budget, NewBudget};
use crate::error::{Error, Result, ValidationErrors};
use crate::finance::{budget_status, rule_status, BudgetStatus, RuleStatus};
use crate::util::checked_total;

const YEARS: std::ops::RangeInclusive<i32> = 2000..=2100;

#[derive(Debug, Deserialize)]
pub struct BudgetPayload {
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl BudgetPayload {
    pub fn validate(self) -> Result<NewBudget> {
        let mut errors = ValidationErrors::new();
        let category = required_text(&mut errors, "category", self.category.as_deref(), 50);
        let amount = required_amount(&mut errors, "amount", self.amount);

        let month = self.month.unwrap_or_else(|| {
            errors.add("month", "Missing data for required field.");
            0
        });
        if self.month.is_some() && !(1..=12).contains(&month) {
            errors.add("month", "Must be between 1 and 12.");
        }
        let year = self.year.unwrap_or_else(|| {
            errors.add("year", "Missing data for required field.");
            0
        });
        if self.year.is_some() && !YEARS.contains(&year) {
            errors.add("year", "Must be between 2000 and 2100.");
        }
        errors.into_result()?;

        Ok(NewBudget {
            category,
            amount,
            month,
            year,
        })
    }
}

pub async fn list_budgets(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<Budget>>> {
    let period = query.resolve()?;
    let budgets =
        queries::list_budgets_for_month(&state.db, user.id(), period.year(), period.month_number())
            .await?;
    Ok(Json(budgets))
}

/// Insert, or replace the amount of the existing budget for that category and month.
pub async fn upsert_budget(
    State(state): State<AppState>,
    user: AuthUser,
    body: std::result::Result<Json<BudgetPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Budget>)> {
    let new_budget = unwrap_body(body)?.validate()?;
    let budget = queries::upsert_budget(&state.db, user.id(), &new_budget).await?;
    info!(
        user_id = user.id(),
        budget_id = budget.id,
        category = %budget.category,
        year = budget.year,
        month = budget.month,
        "saved budget"
    );
    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn delete_budget(
    State(state): State<AppState>,
    user: AuthUser,
    budget_id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<StatusCode> {
    let Path(budget_id) = budget_id?;
    if !queries::delete_budget(&state.db, user.id(), budget_id).await? {
        return Err(Error::not_found(format!("Budget {budget_id} not found")));
    }
    info!(user_id = user.id(), budget_id, "deleted budget");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn budget_status_for_month(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<BudgetStatus>>> {
    let period = query.resolve()?;
    let budgets =
        queries::list_budgets_for_month(&state.db, user.id(), period.year(), period.month_number())
            .await?;
    let (expenses, _) = load_entries(&state, user.id(), period.range()).await?;
    debug!(user_id = user.id(), period = %period.label(), budgets = budgets.len(), "budget status");
    Ok(Json(budget_status(&budgets, &expenses)?))
}

pub async fn rules_status_for_month(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<RuleStatus>> {
    let period = query.resolve()?;
    let (expenses, incomes) = load_entries(&state, user.id(), period.range()).await?;
    let total_income = checked_total(incomes.iter().map(|i| i.amount))?;
    Ok(Json(rule_status(&expenses, total_income)?))
}
