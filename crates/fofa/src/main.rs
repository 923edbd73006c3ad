//! FOFA bot binary.
//!
//! - `fofa run`: start the Telegram bot
//! - `fofa search <query>`: one search through the cache
//! - `fofa history`: list cached queries
//! - `fofa init`: write a configuration template

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, config_target, load_config, run_search, show_history, write_template};

    // Pick up FOFA__* variables from .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        #[cfg(feature = "telegram")]
        Commands::Run => {
            let config = load_config(config_path)?;
            cli::run_bot(config, config_target(config_path)).await?;
        }

        Commands::Search { query } => {
            let config = load_config(config_path)?;
            run_search(config, &query).await?;
        }

        Commands::History { limit } => {
            let config = load_config(config_path)?;
            show_history(&config, limit)?;
        }

        Commands::Init { force } => {
            write_template(&config_target(config_path), force)?;
        }
    }

    Ok(())
}
