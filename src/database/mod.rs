//! SQLite storage: connection setup, embedded migrations, models and queries.

pub mod db;
pub mod models;
