pub mod budget;
pub mod expense;
pub mod income;
pub mod user;
pub mod weekly_focus;

pub use budget::{Budget, NewBudget};
pub use expense::{Expense, NewExpense, RuleCategory};
pub use income::{Income, NewIncome};
pub use user::User;
pub use weekly_focus::WeeklyFocus;

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Amounts live in TEXT columns; parse them back without losing precision.
pub(crate) fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let text: String = row.try_get(column)?;
    Decimal::from_str(&text).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("invalid decimal '{text}': {e}").into(),
    })
}
