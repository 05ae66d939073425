use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

#[derive(FromRow, Debug, Clone, Serialize)]
pub struct User {
    #[sqlx(rename = "user_id")]
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub date_registered: NaiveDateTime,
}
