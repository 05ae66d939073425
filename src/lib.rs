//! `finance-tracker` - a multi-user personal finance REST backend
//!
//! Expenses, incomes and monthly budgets per user, with 50/30/20 rule status,
//! a rolling weekly snapshot and monthly reports as JSON or CSV.

#![deny(unsafe_code)]

pub mod backend;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod finance;
pub mod logging;
pub mod util;

pub use backend::{build_router, run_server, AppState};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
