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
use crate::database::models::{Income, NewIncome};
use crate::error::{Error, Result, ValidationErrors};

#[derive(Debug, Deserialize)]
pub struct IncomePayload {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub source: Option<String>,
    pub date_created: Option<String>,
}

impl IncomePayload {
    pub fn validate(self) -> Result<NewIncome> {
        let mut errors = ValidationErrors::new();
        let description = required_text(&mut errors, "description", self.description.as_deref(), 200);
        let amount = required_amount(&mut errors, "amount", self.amount);
        let source = optional_text(&mut errors, "source", self.source.as_deref(), 100);
        let date_created = entry_timestamp(&mut errors, "date_created", self.date_created.as_deref());
        errors.into_result()?;

        Ok(NewIncome {
            description,
            amount,
            source,
            date_created,
        })
    }
}

fn income_not_found(income_id: i64) -> Error {
    Error::not_found(format!("Income {income_id} not found"))
}

pub async fn list_incomes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<Income>>> {
    let filter = EntryFilter {
        range: query.explicit_period()?.map(|p| p.range()),
        category: None,
    };
    let incomes = queries::list_incomes(&state.db, user.id(), &filter).await?;
    debug!(user_id = user.id(), count = incomes.len(), "listed incomes");
    Ok(Json(incomes))
}

pub async fn create_income(
    State(state): State<AppState>,
    user: AuthUser,
    body: std::result::Result<Json<IncomePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Income>)> {
    let new_income = unwrap_body(body)?.validate()?;
    let income = queries::create_income(&state.db, user.id(), &new_income).await?;
    info!(user_id = user.id(), income_id = income.id, amount = %income.amount, "created income");
    Ok((StatusCode::CREATED, Json(income)))
}

pub async fn get_income(
    State(state): State<AppState>,
    user: AuthUser,
    income_id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Income>> {
    let Path(income_id) = income_id?;
    queries::get_income(&state.db, user.id(), income_id)
        .await?
        .map(Json)
        .ok_or_else(|| income_not_found(income_id))
}

pub async fn update_income(
    State(state): State<AppState>,
    user: AuthUser,
    income_id: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<IncomePayload>, JsonRejection>,
) -> Result<Json<Income>> {
    let Path(income_id) = income_id?;
    let changes = unwrap_body(body)?.validate()?;
    let income = queries::update_income(&state.db, user.id(), income_id, &changes)
        .await?
        .ok_or_else(|| income_not_found(income_id))?;
    info!(user_id = user.id(), income_id, "updated income");
    Ok(Json(income))
}

pub async fn delete_income(
    State(state): State<AppState>,
    user: AuthUser,
    income_id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<StatusCode> {
    let Path(income_id) = income_id?;
    if !queries::delete_income(&state.db, user.id(), income_id).await? {
        return Err(income_not_found(income_id));
    }
    info!(user_id = user.id(), income_id, "deleted income");
    Ok(StatusCode::NO_CONTENT)
}
