use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info};

use super::{entry_timestamp, optional_text, required_amount, required_text, unwrap_body, PeriodQuery};
use crate::backend::auth::AuthUser;
use crate::backend::AppState;
use crate::database::db::queries::{self, EntryFilter};
use crate::database::models::{Expense, NewExpense, RuleCategory};
use crate::error::{Error, Result, ValidationErrors};

#[derive(Debug, Deserialize)]
pub struct ExpensePayload {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub rule_category: Option<String>,
    pub date_created: Option<String>,
}

impl ExpensePayload {
    pub fn validate(self) -> Result<NewExpense> {
        let mut errors = ValidationErrors::new();
        let description = required_text(&mut errors, "description", self.description.as_deref(), 200);
        let amount = required_amount(&mut errors, "amount", self.amount);
        let category = optional_text(&mut errors, "category", self.category.as_deref(), 50);
        let rule_category = match self.rule_category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(rule) => match rule.parse::<RuleCategory>() {
                Ok(rule) => Some(rule),
                Err(_) => {
                    errors.add("rule_category", "Must be one of: Needs, Wants, Savings.");
                    None
                }
            },
        };
        let date_created = entry_timestamp(&mut errors, "date_created", self.date_created.as_deref());
        errors.into_result()?;

        Ok(NewExpense {
            description,
            amount,
            category,
            rule_category,
            date_created,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpenseListQuery {
    #[serde(flatten)]
    pub period: PeriodQuery,
    pub category: Option<String>,
}

fn expense_not_found(expense_id: i64) -> Error {
    Error::not_found(format!("Expense {expense_id} not found"))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ExpenseListQuery>,
) -> Result<Json<Vec<Expense>>> {
    let filter = EntryFilter {
        range: query.period.explicit_period()?.map(|p| p.range()),
        category: query
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
    };
    let expenses = queries::list_expenses(&state.db, user.id(), &filter).await?;
    debug!(user_id = user.id(), count = expenses.len(), "listed expenses");
    Ok(Json(expenses))
}

pub async fn create_expense(
    State(state): State<AppState>,
    user: AuthUser,
    body: std::result::Result<Json<ExpensePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Expense>)> {
    let new_expense = unwrap_body(body)?.validate()?;
    let expense = queries::create_expense(&state.db, user.id(), &new_expense).await?;
    info!(user_id = user.id(), expense_id = expense.id, amount = %expense.amount, "created expense");
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn get_expense(
    State(state): State<AppState>,
    user: AuthUser,
    expense_id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Expense>> {
    let Path(expense_id) = expense_id?;
    queries::get_expense(&state.db, user.id(), expense_id)
        .await?
        .map(Json)
        .ok_or_else(|| expense_not_found(expense_id))
}

pub async fn update_expense(
    State(state): State<AppState>,
    user: AuthUser,
    expense_id: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<ExpensePayload>, JsonRejection>,
) -> Result<Json<Expense>> {
    let Path(expense_id) = expense_id?;
    let changes = unwrap_body(body)?.validate()?;
    let expense = queries::update_expense(&state.db, user.id(), expense_id, &changes)
        .await?
        .ok_or_else(|| expense_not_found(expense_id))?;
    info!(user_id = user.id(), expense_id, "updated expense");
    Ok(Json(expense))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    user: AuthUser,
    expense_id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<StatusCode> {
    let Path(expense_id) = expense_id?;
    if !queries::delete_expense(&state.db, user.id(), expense_id).await? {
        return Err(expense_not_found(expense_id));
    }
    info!(user_id = user.id(), expense_id, "deleted expense");
    Ok(StatusCode::NO_CONTENT)
}
