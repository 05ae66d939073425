use chrono::{NaiveDate, NaiveDateTime, Utc};
use sqlx::{Pool, QueryBuilder, Sqlite};

use crate::database::models::{
    Budget, Expense, Income, NewBudget, NewExpense, NewIncome, User, WeeklyFocus,
};
use crate::finance::DateRange;

/*
CRUD queries for every table. Every query on user data takes the owner's
user_id and filters on it, so one user can never read or touch another's rows.
Amounts are bound as strings to keep Decimal precision in the TEXT columns.
 */

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/*==========User Queries=========== */

pub async fn create_user(
    pool: &Pool<Sqlite>,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password_hash, date_registered)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(now())
    .fetch_one(pool)
    .await
}

pub async fn get_user_by_id(pool: &Pool<Sqlite>, user_id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

// `login` may be either the username or the email address
pub async fn find_user_by_login(pool: &Pool<Sqlite>, login: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ? OR email = ? LIMIT 1")
        .bind(login)
        .bind(login)
        .fetch_optional(pool)
        .await
}

pub async fn user_exists(pool: &Pool<Sqlite>, username: &str, email: &str) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ? OR email = ?")
        .bind(username)
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn update_password_hash(
    pool: &Pool<Sqlite>,
    user_id: i64,
    password_hash: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET password_hash = ? WHERE user_id = ?")
        .bind(password_hash)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_users(pool: &Pool<Sqlite>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(pool).await
}

/*==========Expense Queries=========== */

/// Optional narrowing for expense and income listings.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub range: Option<DateRange>,
    /// Only applied to expenses.
    pub category: Option<String>,
}

pub async fn create_expense(
    pool: &Pool<Sqlite>,
    user_id: i64,
    expense: &NewExpense,
) -> Result<Expense, sqlx::Error> {
    sqlx::query_as::<_, Expense>(
        r#"
        INSERT INTO expenses (user_id, description, amount, category, rule_category, date_created)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&expense.description)
    .bind(expense.amount.to_string())
    .bind(&expense.category)
    .bind(expense.rule_category.map(|r| r.as_str()))
    .bind(expense.date_created)
    .fetch_one(pool)
    .await
}

pub async fn get_expense(
    pool: &Pool<Sqlite>,
    user_id: i64,
    expense_id: i64,
) -> Result<Option<Expense>, sqlx::Error> {
    sqlx::query_as::<_, Expense>("SELECT * FROM expenses WHERE expense_id = ? AND user_id = ?")
        .bind(expense_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

// Newest first
pub async fn list_expenses(
    pool: &Pool<Sqlite>,
    user_id: i64,
    filter: &EntryFilter,
) -> Result<Vec<Expense>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM expenses WHERE user_id = ");
    qb.push_bind(user_id);
    if let Some(range) = filter.range {
        qb.push(" AND date_created >= ")
            .push_bind(range.start)
            .push(" AND date_created < ")
            .push_bind(range.end);
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    qb.push(" ORDER BY date_created DESC, expense_id DESC");

    let rows = qb.build_query_as::<Expense>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn update_expense(
    pool: &Pool<Sqlite>,
    user_id: i64,
    expense_id: i64,
    expense: &NewExpense,
) -> Result<Option<Expense>, sqlx::Error> {
    sqlx::query_as::<_, Expense>(
        r#"
        UPDATE expenses
        SET description = ?, amount = ?, category = ?, rule_category = ?, date_created = ?
        WHERE expense_id = ? AND user_id = ?
        RETURNING *
        "#,
    )
    .bind(&expense.description)
    .bind(expense.amount.to_string())
    .bind(&expense.category)
    .bind(expense.rule_category.map(|r| r.as_str()))
    .bind(expense.date_created)
    .bind(expense_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_expense(pool: &Pool<Sqlite>, user_id: i64, expense_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM expenses WHERE expense_id = ? AND user_id = ?")
        .bind(expense_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_expenses(pool: &Pool<Sqlite>, user_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM expenses WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

/*==========Income Queries=========== */

pub async fn create_income(
    pool: &Pool<Sqlite>,
    user_id: i64,
    income: &NewIncome,
) -> Result<Income, sqlx::Error> {
    sqlx::query_as::<_, Income>(
        r#"
        INSERT INTO incomes (user_id, description, amount, source, date_created)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&income.description)
    .bind(income.amount.to_string())
    .bind(&income.source)
    .bind(income.date_created)
    .fetch_one(pool)
    .await
}

pub async fn get_income(
    pool: &Pool<Sqlite>,
    user_id: i64,
    income_id: i64,
) -> Result<Option<Income>, sqlx::Error> {
    sqlx::query_as::<_, Income>("SELECT * FROM incomes WHERE income_id = ? AND user_id = ?")
        .bind(income_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_incomes(
    pool: &Pool<Sqlite>,
    user_id: i64,
    filter: &EntryFilter,
) -> Result<Vec<Income>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM incomes WHERE user_id = ");
    qb.push_bind(user_id);
    if let Some(range) = filter.range {
        qb.push(" AND date_created >= ")
            .push_bind(range.start)
            .push(" AND date_created < ")
            .push_bind(range.end);
    }
    qb.push(" ORDER BY date_created DESC, income_id DESC");

    let rows = qb.build_query_as::<Income>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn update_income(
    pool: &Pool<Sqlite>,
    user_id: i64,
    income_id: i64,
    income: &NewIncome,
) -> Result<Option<Income>, sqlx::Error> {
    sqlx::query_as::<_, Income>(
        r#"
        UPDATE incomes
        SET description = ?, amount = ?, source = ?, date_created = ?
        WHERE income_id = ? AND user_id = ?
        RETURNING *
        "#,
    )
    .bind(&income.description)
    .bind(income.amount.to_string())
    .bind(&income.source)
    .bind(income.date_created)
    .bind(income_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_income(pool: &Pool<Sqlite>, user_id: i64, income_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM incomes WHERE income_id = ? AND user_id = ?")
        .bind(income_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/*==========Budget Queries=========== */

pub async fn list_budgets_for_month(
    pool: &Pool<Sqlite>,
    user_id: i64,
    year: i32,
    month: u32,
) -> Result<Vec<Budget>, sqlx::Error> {
    sqlx::query_as::<_, Budget>(
        r#"
        SELECT * FROM budgets
        WHERE user_id = ? AND year = ? AND month = ?
        ORDER BY category ASC
        "#,
    )
    .bind(user_id)
    .bind(year)
    .bind(month)
    .fetch_all(pool)
    .await
}

/* One budget per (category, month, year): a second save for the same key
replaces the amount instead of adding a row. */
pub async fn upsert_budget(
    pool: &Pool<Sqlite>,
    user_id: i64,
    budget: &NewBudget,
) -> Result<Budget, sqlx::Error> {
    sqlx::query_as::<_, Budget>(
        r#"
        INSERT INTO budgets (user_id, category, amount, month, year)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (user_id, category, month, year)
        DO UPDATE SET amount = excluded.amount
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&budget.category)
    .bind(budget.amount.to_string())
    .bind(budget.month)
    .bind(budget.year)
    .fetch_one(pool)
    .await
}

pub async fn delete_budget(pool: &Pool<Sqlite>, user_id: i64, budget_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM budgets WHERE budget_id = ? AND user_id = ?")
        .bind(budget_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/*==========Weekly Focus Queries=========== */

pub async fn get_focus_for_week(
    pool: &Pool<Sqlite>,
    user_id: i64,
    week_start: NaiveDate,
) -> Result<Option<WeeklyFocus>, sqlx::Error> {
    sqlx::query_as::<_, WeeklyFocus>(
        "SELECT * FROM weekly_focus WHERE user_id = ? AND week_start_date = ?",
    )
    .bind(user_id)
    .bind(week_start)
    .fetch_optional(pool)
    .await
}

pub async fn upsert_focus(
    pool: &Pool<Sqlite>,
    user_id: i64,
    week_start: NaiveDate,
    focus_text: &str,
) -> Result<WeeklyFocus, sqlx::Error> {
    sqlx::query_as::<_, WeeklyFocus>(
        r#"
        INSERT INTO weekly_focus (user_id, focus_text, week_start_date, date_set)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (user_id, week_start_date)
        DO UPDATE SET focus_text = excluded.focus_text, date_set = excluded.date_set
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(focus_text)
    .bind(week_start)
    .bind(now())
    .fetch_one(pool)
    .await
}

pub async fn delete_focus_for_week(
    pool: &Pool<Sqlite>,
    user_id: i64,
    week_start: NaiveDate,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM weekly_focus WHERE user_id = ? AND week_start_date = ?")
        .bind(user_id)
        .bind(week_start)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
