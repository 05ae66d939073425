// src/main.rs
use clap::Parser;
use dotenvy::dotenv;
use finance_tracker::{cli, init_logging, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = cli::Cli::parse();
    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;
    cli::run(cli, config).await?;
    Ok(())
}
