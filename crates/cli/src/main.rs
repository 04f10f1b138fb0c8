//! REST Blueprint CLI - Database migrations and sample data.
//!
//! # Usage
//!
//! ```bash
//! # Create or upgrade the schema
//! blueprint-cli migrate
//!
//! # Insert 100 random users
//! blueprint-cli seed users
//!
//! # Insert 20 random customers
//! blueprint-cli seed customers --count 20
//! ```
//!
//! Connection settings come from the same config file and environment
//! variables as the API server (`DB_DSN`, `CONFIG_PATH`, ...).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "blueprint-cli")]
#[command(author, version, about = "REST blueprint CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert random sample data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert random users
    Users {
        /// Number of users to generate
        #[arg(short, long, default_value_t = 100)]
        count: usize,
    },
    /// Insert random Indonesian customers
    Customers {
        /// Number of customers to generate
        #[arg(short, long, default_value_t = 50)]
        count: usize,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Users { count } => {
                commands::seed::users(count).await?;
            }
            SeedTarget::Customers { count } => {
                commands::seed::customers(count).await?;
            }
        },
    }
    Ok(())
}
