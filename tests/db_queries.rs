//! Query-level tests against a fresh in-memory database per test.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Pool, Sqlite};

use finance_tracker::cli::{seed_demo_data, SeedOutcome};
use finance_tracker::database::db::connection::memory_pool;
use finance_tracker::database::db::migrate::run_migrations;
use finance_tracker::database::db::queries::{self, EntryFilter};
use finance_tracker::database::models::{NewBudget, NewExpense, NewIncome, RuleCategory};
use finance_tracker::finance::Period;

async fn pool() -> Pool<Sqlite> {
    let pool = memory_pool().await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

async fn user(pool: &Pool<Sqlite>, name: &str) -> i64 {
    queries::create_user(pool, name, &format!("{name}@example.com"), "hash")
        .await
        .unwrap()
        .id
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn expense(description: &str, amount: &str, category: Option<&str>, date: (i32, u32, u32)) -> NewExpense {
    NewExpense {
        description: description.to_string(),
        amount: dec(amount),
        category: category.map(str::to_string),
        rule_category: None,
        date_created: NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
    }
}

// ----------------------------------------------------
// TEST: users
// ----------------------------------------------------
#[tokio::test]
async fn users_lookup_and_uniqueness() {
    let pool = pool().await;
    let id = user(&pool, "alice").await;
    assert!(id > 0);

    let by_name = queries::find_user_by_login(&pool, "alice").await.unwrap().unwrap();
    let by_email = queries::find_user_by_login(&pool, "alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_name.id, by_email.id);
    assert!(queries::find_user_by_login(&pool, "bob").await.unwrap().is_none());

    assert!(queries::user_exists(&pool, "alice", "x@example.com").await.unwrap());
    assert!(queries::user_exists(&pool, "x", "alice@example.com").await.unwrap());
    assert!(!queries::user_exists(&pool, "bob", "bob@example.com").await.unwrap());

    let duplicate = queries::create_user(&pool, "alice", "other@example.com", "hash").await;
    match duplicate {
        Err(sqlx::Error::Database(e)) => assert!(e.is_unique_violation()),
        other => panic!("expected a unique violation, got {other:?}"),
    }

    assert!(queries::update_password_hash(&pool, id, "new-hash").await.unwrap());
    let reloaded = queries::get_user_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(reloaded.password_hash, "new-hash");
    assert_eq!(queries::count_users(&pool).await.unwrap(), 1);
}

// ----------------------------------------------------
// TEST: expenses keep decimal precision and stay scoped to their owner
// ----------------------------------------------------
#[tokio::test]
async fn expenses_round_trip_and_scope() {
    let pool = pool().await;
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;

    let mut new_expense = expense("Groceries", "42.10", Some("Food"), (2024, 5, 3));
    new_expense.rule_category = Some(RuleCategory::Needs);
    let created = queries::create_expense(&pool, alice, &new_expense).await.unwrap();
    assert_eq!(created.amount, dec("42.10"));
    assert_eq!(created.rule_category, Some(RuleCategory::Needs));

    assert!(queries::get_expense(&pool, bob, created.id).await.unwrap().is_none());
    assert!(queries::update_expense(&pool, bob, created.id, &new_expense)
        .await
        .unwrap()
        .is_none());
    assert!(!queries::delete_expense(&pool, bob, created.id).await.unwrap());

    let mut changes = expense("Groceries", "0.01", None, (2024, 5, 4));
    changes.rule_category = Some(RuleCategory::Wants);
    let updated = queries::update_expense(&pool, alice, created.id, &changes)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.amount, dec("0.01"));
    assert_eq!(updated.category, None);
    assert_eq!(updated.rule_category, Some(RuleCategory::Wants));

    assert_eq!(queries::count_expenses(&pool, alice).await.unwrap(), 1);
    assert!(queries::delete_expense(&pool, alice, created.id).await.unwrap());
    assert_eq!(queries::count_expenses(&pool, alice).await.unwrap(), 0);
}

// ----------------------------------------------------
// TEST: listing filters by month boundaries and category
// ----------------------------------------------------
#[tokio::test]
async fn expense_filters_respect_month_boundaries() {
    let pool = pool().await;
    let alice = user(&pool, "alice").await;

    for e in [
        expense("April 30", "1", Some("Food"), (2024, 4, 30)),
        expense("May 1", "2", Some("Food"), (2024, 5, 1)),
        expense("May 31", "3", Some("Rent"), (2024, 5, 31)),
        expense("June 1", "4", Some("Food"), (2024, 6, 1)),
    ] {
        queries::create_expense(&pool, alice, &e).await.unwrap();
    }

    let may = EntryFilter {
        range: Period::month(2024, 5).map(|p| p.range()),
        category: None,
    };
    let listed = queries::list_expenses(&pool, alice, &may).await.unwrap();
    let names: Vec<&str> = listed.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(names, vec!["May 31", "May 1"]);

    let food_in_may = EntryFilter {
        category: Some("Food".to_string()),
        ..may
    };
    let listed = queries::list_expenses(&pool, alice, &food_in_may).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].description, "May 1");

    let all = queries::list_expenses(&pool, alice, &EntryFilter::default()).await.unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].description, "June 1");
}

// ----------------------------------------------------
// TEST: incomes
// ----------------------------------------------------
#[tokio::test]
async fn income_crud() {
    let pool = pool().await;
    let alice = user(&pool, "alice").await;
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();

    let income = queries::create_income(
        &pool,
        alice,
        &NewIncome {
            description: "Salary".to_string(),
            amount: dec("1500.00"),
            source: Some("Employer".to_string()),
            date_created: date,
        },
    )
    .await
    .unwrap();
    assert_eq!(income.amount, dec("1500"));

    let fetched = queries::get_income(&pool, alice, income.id).await.unwrap().unwrap();
    assert_eq!(fetched, income);

    let updated = queries::update_income(
        &pool,
        alice,
        income.id,
        &NewIncome {
            description: "Salary".to_string(),
            amount: dec("1600"),
            source: None,
            date_created: date,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.source, None);

    let listed = queries::list_incomes(&pool, alice, &EntryFilter::default()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(queries::delete_income(&pool, alice, income.id).await.unwrap());
    assert!(queries::get_income(&pool, alice, income.id).await.unwrap().is_none());
}

// ----------------------------------------------------
// TEST: budgets upsert on (user, category, month, year)
// ----------------------------------------------------
#[tokio::test]
async fn budget_upsert_replaces_amount() {
    let pool = pool().await;
    let alice = user(&pool, "alice").await;
    let bob = user(&pool, "bob").await;

    let budget = |amount: &str| NewBudget {
        category: "Groceries".to_string(),
        amount: dec(amount),
        month: 5,
        year: 2024,
    };

    let first = queries::upsert_budget(&pool, alice, &budget("200")).await.unwrap();
    let second = queries::upsert_budget(&pool, alice, &budget("250")).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.amount, dec("250"));

    // Same key for another user is a separate row.
    let bobs = queries::upsert_budget(&pool, bob, &budget("10")).await.unwrap();
    assert_ne!(bobs.id, first.id);

    let may = queries::list_budgets_for_month(&pool, alice, 2024, 5).await.unwrap();
    assert_eq!(may.len(), 1);
    assert_eq!(may[0].amount, dec("250"));
    assert!(queries::list_budgets_for_month(&pool, alice, 2024, 6)
        .await
        .unwrap()
        .is_empty());

    assert!(!queries::delete_budget(&pool, bob, first.id).await.unwrap());
    assert!(queries::delete_budget(&pool, alice, first.id).await.unwrap());
}

// ----------------------------------------------------
// TEST: weekly focus
// ----------------------------------------------------
#[tokio::test]
async fn weekly_focus_upsert_and_clear() {
    let pool = pool().await;
    let alice = user(&pool, "alice").await;
    let monday = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();

    assert!(queries::get_focus_for_week(&pool, alice, monday).await.unwrap().is_none());

    let first = queries::upsert_focus(&pool, alice, monday, "Cook at home").await.unwrap();
    let second = queries::upsert_focus(&pool, alice, monday, "No takeaway").await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.week_start_date, monday);

    let stored = queries::get_focus_for_week(&pool, alice, monday).await.unwrap().unwrap();
    assert_eq!(stored.focus_text, "No takeaway");

    assert!(queries::delete_focus_for_week(&pool, alice, monday).await.unwrap());
    assert!(!queries::delete_focus_for_week(&pool, alice, monday).await.unwrap());
}

// ----------------------------------------------------
// TEST: deleting a user removes their data
// ----------------------------------------------------
#[tokio::test]
async fn user_delete_cascades() {
    let pool = pool().await;
    let alice = user(&pool, "alice").await;
    queries::create_expense(&pool, alice, &expense("Lunch", "9.99", None, (2024, 5, 2)))
        .await
        .unwrap();

    sqlx::query("DELETE FROM users WHERE user_id = ?")
        .bind(alice)
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(queries::count_expenses(&pool, alice).await.unwrap(), 0);
}

// ----------------------------------------------------
// TEST: demo seeding runs once
// ----------------------------------------------------
#[tokio::test]
async fn seeding_is_idempotent() {
    let pool = pool().await;

    let first = seed_demo_data(&pool, "demo", "demo1234").await.unwrap();
    let SeedOutcome::Seeded { user_id, expenses, incomes } = first else {
        panic!("expected a fresh seed, got {first:?}");
    };
    assert_eq!(queries::count_expenses(&pool, user_id).await.unwrap(), expenses as i64);
    let listed = queries::list_incomes(&pool, user_id, &EntryFilter::default()).await.unwrap();
    assert_eq!(listed.len(), incomes);

    let second = seed_demo_data(&pool, "demo", "demo1234").await.unwrap();
    assert_eq!(second, SeedOutcome::AlreadySeeded { user_id });
    assert_eq!(queries::count_users(&pool).await.unwrap(), 1);
}
