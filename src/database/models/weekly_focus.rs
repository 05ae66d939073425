use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;

// one focus per user per Monday-based week
#[derive(FromRow, Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyFocus {
    #[sqlx(rename = "focus_id")]
    pub id: i64,
    pub user_id: i64,
    pub focus_text: String,
    pub week_start_date: NaiveDate,
    pub date_set: NaiveDateTime,
}
