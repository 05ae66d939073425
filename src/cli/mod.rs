//! Command-line interface for the finance tracker.
//!
//! `finance-tracker` with no subcommand starts the HTTP server; the other
//! subcommands are maintenance tasks against the configured database.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{list_routes, seed_demo_data, SeedCommand, SeedOutcome, ServeCommand};

use crate::config::Config;
use crate::error::Result;
use crate::logging::Verbosity;

/// finance-tracker - personal finance REST backend
///
/// Tracks expenses, incomes and monthly budgets per user, with 50/30/20
/// rule reporting and weekly snapshots.
#[derive(Debug, Parser)]
#[command(name = "finance-tracker")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(ServeCommand),

    /// Create the database file and apply migrations
    InitDb,

    /// Add a demo user with sample expenses and incomes
    SeedDb(SeedCommand),

    /// Print every HTTP route
    ListRoutes,
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }
}

/// Execute the parsed command line against a loaded configuration.
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        None => commands::serve(ServeCommand::default(), config).await,
        Some(Command::Serve(args)) => commands::serve(args, config).await,
        Some(Command::InitDb) => commands::init_db(&config).await,
        Some(Command::SeedDb(args)) => commands::seed_db(args, &config).await,
        Some(Command::ListRoutes) => {
            print!("{}", list_routes());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "finance-tracker");
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["finance-tracker"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_serve_overrides() {
        let cli =
            Cli::try_parse_from(["finance-tracker", "serve", "--host", "0.0.0.0", "--port", "8080"])
                .unwrap();
        let Some(Command::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(8080));
    }

    #[test]
    fn test_seed_defaults() {
        let cli = Cli::try_parse_from(["finance-tracker", "seed-db"]).unwrap();
        let Some(Command::SeedDb(args)) = cli.command else {
            panic!("expected seed-db");
        };
        assert_eq!(args.username, "demo");
        assert_eq!(args.password, "demo1234");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["finance-tracker", "init-db", "-vv", "--config", "x.toml"])
            .unwrap();
        assert!(matches!(cli.command, Some(Command::InitDb)));
        assert_eq!(cli.verbosity(), Verbosity::Trace);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_verbosity_quiet_wins() {
        let cli = Cli::try_parse_from(["finance-tracker", "-q", "-v", "list-routes"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
    }
}
