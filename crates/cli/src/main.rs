//! Expiration Manager CLI - Database migrations and Shopify bootstrap.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! em-cli migrate
//!
//! # Create the product metafield definitions
//! em-cli definitions
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `definitions` - Create missing metafield definitions

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "em-cli")]
#[command(author, version, about = "Expiration Manager CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run admin database migrations
    Migrate,
    /// Create missing product metafield definitions in Shopify
    Definitions,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Definitions => commands::definitions::run().await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        assert!(matches!(
            Cli::try_parse_from(["em-cli", "migrate"]).map(|c| c.command),
            Ok(Commands::Migrate)
        ));
        assert!(matches!(
            Cli::try_parse_from(["em-cli", "definitions"]).map(|c| c.command),
            Ok(Commands::Definitions)
        ));
        assert!(Cli::try_parse_from(["em-cli", "seed"]).is_err());
    }
}
