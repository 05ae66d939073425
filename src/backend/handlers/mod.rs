// src/backend/handlers/mod.rs
pub mod auth;
pub mod budgets;
pub mod expenses;
pub mod incomes;
pub mod reports;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::backend::AppState;
use crate::database::db::queries::{self, EntryFilter};
use crate::database::models::{Expense, Income};
use crate::error::{Error, Result, ValidationErrors};
use crate::finance::{DateRange, Period};
use crate::util::parse_timestamp;

const MIN_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
/// 1e12, low enough that a month of entries cannot overflow a `Decimal` total.
const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "Finance tracker API is online!" }))
}

pub async fn health() -> &'static str {
    "Backend is running"
}

pub async fn not_found() -> Error {
    Error::not_found("The requested resource was not found.")
}

/// Replaces axum's empty 405 body with the JSON error body, keeping `Allow`.
pub async fn json_method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    let allow = response.headers().get(header::ALLOW).cloned();
    let mut replacement = Error::MethodNotAllowed.into_response();
    if let Some(allow) = allow {
        replacement.headers_mut().insert(header::ALLOW, allow);
    }
    replacement
}

/// `?year=&month=` on the month-scoped routes. Both default to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

impl PeriodQuery {
    /// `None` when neither parameter was given.
    pub fn explicit_period(&self) -> Result<Option<Period>> {
        if self.year.is_none() && self.month.is_none() {
            return Ok(None);
        }
        self.resolve().map(Some)
    }

    pub fn resolve(&self) -> Result<Period> {
        let current = Period::current_month();
        let invalid = || Error::bad_request("Invalid year or month parameter");

        let year = match self.year.as_deref() {
            Some(y) => y.trim().parse::<i32>().map_err(|_| invalid())?,
            None => current.year(),
        };
        let month = match self.month.as_deref() {
            Some(m) => m.trim().parse::<u32>().map_err(|_| invalid())?,
            None => current.month_number(),
        };
        Period::month(year, month).ok_or_else(invalid)
    }
}

/// A user's expenses and incomes that fall inside `range`.
pub(crate) async fn load_entries(
    state: &AppState,
    user_id: i64,
    range: DateRange,
) -> Result<(Vec<Expense>, Vec<Income>)> {
    let filter = EntryFilter {
        range: Some(range),
        category: None,
    };
    let expenses = queries::list_expenses(&state.db, user_id, &filter).await?;
    let incomes = queries::list_incomes(&state.db, user_id, &filter).await?;
    Ok((expenses, incomes))
}

pub(crate) fn unwrap_body<T>(
    body: std::result::Result<Json<T>, axum::extract::rejection::JsonRejection>,
) -> Result<T> {
    let Json(body) = body?;
    Ok(body)
}

/* ----- field checks shared by the payload validators ----- */

pub(crate) fn required_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> String {
    match value.map(str::trim) {
        None => {
            errors.add(field, "Missing data for required field.");
            String::new()
        }
        Some("") => {
            errors.add(field, "Must not be empty.");
            String::new()
        }
        Some(text) => {
            if text.chars().count() > max_len {
                errors.add(field, format!("Length must be at most {max_len}."));
            }
            text.to_string()
        }
    }
}

/// Blank optional text is stored as NULL.
pub(crate) fn optional_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Option<String> {
    let text = value.map(str::trim).filter(|t| !t.is_empty())?;
    if text.chars().count() > max_len {
        errors.add(field, format!("Length must be at most {max_len}."));
    }
    Some(text.to_string())
}

pub(crate) fn required_amount(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<Decimal>,
) -> Decimal {
    match value {
        None => {
            errors.add(field, "Missing data for required field.");
            Decimal::ZERO
        }
        Some(amount) if amount < MIN_AMOUNT => {
            errors.add(field, "Must be greater than or equal to 0.01.");
            amount
        }
        Some(amount) if amount > MAX_AMOUNT => {
            errors.add(field, format!("Must be less than or equal to {MAX_AMOUNT}."));
            amount
        }
        Some(amount) => amount,
    }
}

/// Defaults to now (UTC) when the client leaves the date out.
pub(crate) fn entry_timestamp(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
) -> NaiveDateTime {
    match value.map(str::trim).filter(|t| !t.is_empty()) {
        None => Utc::now().naive_utc(),
        Some(text) => parse_timestamp(text).unwrap_or_else(|| {
            errors.add(field, "Not a valid datetime.");
            Utc::now().naive_utc()
        }),
    }
}
