use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use super::decimal_column;

/// Bucket of the 50/30/20 rule an expense counts towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleCategory {
    Needs,
    Wants,
    Savings,
}

impl RuleCategory {
    pub const ALL: [RuleCategory; 3] = [Self::Needs, Self::Wants, Self::Savings];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Needs => "Needs",
            Self::Wants => "Wants",
            Self::Savings => "Savings",
        }
    }

    /// Share of income the rule sets aside for this bucket, in percent.
    pub fn target_percent(&self) -> u32 {
        match self {
            Self::Needs => 50,
            Self::Wants => 30,
            Self::Savings => 20,
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Needs" => Ok(Self::Needs),
            "Wants" => Ok(Self::Wants),
            "Savings" => Ok(Self::Savings),
            other => Err(format!("unknown rule category '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub amount: Decimal,
    pub category: Option<String>,
    pub rule_category: Option<RuleCategory>,
    pub date_created: NaiveDateTime,
}

impl<'r> FromRow<'r, SqliteRow> for Expense {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let rule_category = row
            .try_get::<Option<String>, _>("rule_category")?
            .map(|s| s.parse::<RuleCategory>())
            .transpose()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "rule_category".to_string(),
                source: e.into(),
            })?;

        Ok(Expense {
            id: row.try_get("expense_id")?,
            user_id: row.try_get("user_id")?,
            description: row.try_get("description")?,
            amount: decimal_column(row, "amount")?,
            category: row.try_get("category")?,
            rule_category,
            date_created: row.try_get("date_created")?,
        })
    }
}

/// A validated expense ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub amount: Decimal,
    pub category: Option<String>,
    pub rule_category: Option<RuleCategory>,
    pub date_created: NaiveDateTime,
}
