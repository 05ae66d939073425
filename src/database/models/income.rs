use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use super::decimal_column;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Income {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub amount: Decimal,
    pub source: Option<String>,
    pub date_created: NaiveDateTime,
}

impl<'r> FromRow<'r, SqliteRow> for Income {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Income {
            id: row.try_get("income_id")?,
            user_id: row.try_get("user_id")?,
            description: row.try_get("description")?,
            amount: decimal_column(row, "amount")?,
            source: row.try_get("source")?,
            date_created: row.try_get("date_created")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewIncome {
    pub description: String,
    pub amount: Decimal,
    pub source: Option<String>,
    pub date_created: NaiveDateTime,
}
