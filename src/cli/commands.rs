//! CLI command arguments and their implementations.

use std::fmt::Write as _;

use chrono::{Duration, Utc};
use clap::Args;
use rust_decimal::Decimal;
use sqlx::{Pool, Sqlite};
use tracing::{info, warn};

use crate::backend::{self, auth, routes::ROUTES};
use crate::config::Config;
use crate::database::db::{connection, migrate, queries};
use crate::database::models::{NewExpense, NewIncome, RuleCategory};
use crate::error::Result;

/// Serve command arguments.
#[derive(Debug, Default, Args)]
pub struct ServeCommand {
    /// Address to bind (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Seed command arguments.
#[derive(Debug, Args)]
pub struct SeedCommand {
    /// Username of the demo account
    #[arg(long, default_value = "demo")]
    pub username: String,

    /// Password of the demo account
    #[arg(long, default_value = "demo1234")]
    pub password: String,
}

/// What `seed_demo_data` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded {
        user_id: i64,
        expenses: usize,
        incomes: usize,
    },
    /// The demo user already had expenses; nothing was written.
    AlreadySeeded { user_id: i64 },
}

// (description, amount in cents, category, rule)
const SAMPLE_EXPENSES: &[(&str, i64, &str, RuleCategory)] = &[
    ("Weekly groceries", 8240, "Groceries", RuleCategory::Needs),
    ("Bus pass", 2500, "Transport", RuleCategory::Needs),
    ("Cinema tickets", 1250, "Entertainment", RuleCategory::Wants),
    ("Transfer to savings", 15000, "Savings", RuleCategory::Savings),
];

const SAMPLE_INCOMES: &[(&str, i64, &str)] = &[
    ("Monthly salary", 150000, "Employer"),
    ("Sold old bike", 6000, "Marketplace"),
];

async fn open_database(config: &Config) -> Result<Pool<Sqlite>> {
    let pool = connection::get_db_pool(&config.database).await?;
    migrate::run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn serve(args: ServeCommand, mut config: Config) -> Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    if config.uses_default_secret() {
        warn!("using the built-in development JWT secret; set SECRET_KEY in production");
    }

    let pool = open_database(&config).await?;
    backend::run_server(pool, config).await
}

pub async fn init_db(config: &Config) -> Result<()> {
    let pool = open_database(config).await?;
    let users = queries::count_users(&pool).await?;
    info!(url = %config.database.url, users, "database initialized");
    pool.close().await;
    Ok(())
}

pub async fn seed_db(args: SeedCommand, config: &Config) -> Result<()> {
    let pool = open_database(config).await?;
    match seed_demo_data(&pool, &args.username, &args.password).await? {
        SeedOutcome::Seeded {
            user_id,
            expenses,
            incomes,
        } => info!(user_id, expenses, incomes, "seeded demo data"),
        SeedOutcome::AlreadySeeded { user_id } => {
            info!(user_id, "database already contains data, skipping");
        }
    }
    pool.close().await;
    Ok(())
}

/// Create the demo user if needed and give it a few recent transactions.
///
/// Does nothing when that user already has expenses.
pub async fn seed_demo_data(pool: &Pool<Sqlite>, username: &str, password: &str) -> Result<SeedOutcome> {
    let user = match queries::find_user_by_login(pool, username).await? {
        Some(user) => user,
        None => {
            let hash = auth::hash_password(password)?;
            let email = format!("{username}@example.com");
            let user = queries::create_user(pool, username, &email, &hash).await?;
            info!(user_id = user.id, username, "created demo user");
            user
        }
    };

    if queries::count_expenses(pool, user.id).await? > 0 {
        return Ok(SeedOutcome::AlreadySeeded { user_id: user.id });
    }

    let now = Utc::now().naive_utc();
    for (days_ago, (description, cents, category, rule)) in (0_i64..).zip(SAMPLE_EXPENSES) {
        let expense = NewExpense {
            description: (*description).to_string(),
            amount: Decimal::new(*cents, 2),
            category: Some((*category).to_string()),
            rule_category: Some(*rule),
            date_created: now - Duration::days(days_ago),
        };
        queries::create_expense(pool, user.id, &expense).await?;
    }

    for (days_ago, (description, cents, source)) in (0_i64..).zip(SAMPLE_INCOMES) {
        let income = NewIncome {
            description: (*description).to_string(),
            amount: Decimal::new(*cents, 2),
            source: Some((*source).to_string()),
            date_created: now - Duration::days(days_ago),
        };
        queries::create_income(pool, user.id, &income).await?;
    }

    Ok(SeedOutcome::Seeded {
        user_id: user.id,
        expenses: SAMPLE_EXPENSES.len(),
        incomes: SAMPLE_INCOMES.len(),
    })
}

/// The route table as aligned text, one route per line.
pub fn list_routes() -> String {
    let width = ROUTES.iter().map(|(methods, _)| methods.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (methods, path) in ROUTES {
        let _ = writeln!(out, "{methods:<width$}  {path}");
    }
    out
}
