use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use super::decimal_column;

/// Monthly spending limit for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    pub amount: Decimal,
    pub month: u32, // 1-12
    pub year: i32,
}

impl<'r> FromRow<'r, SqliteRow> for Budget {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Budget {
            id: row.try_get("budget_id")?,
            user_id: row.try_get("user_id")?,
            category: row.try_get("category")?,
            amount: decimal_column(row, "amount")?,
            month: row.try_get("month")?,
            year: row.try_get("year")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub category: String,
    pub amount: Decimal,
    pub month: u32,
    pub year: i32,
}
