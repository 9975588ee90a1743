mod search;
mod users;

use clap::{Parser, Subcommand};
use mapscout_core::AppConfig;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mapscout")]
#[command(about = "Discover and enrich map listings for a search term")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "MAPSCOUT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one search, spending one credit
    Search {
        /// What to search for, e.g. "pizzaria salvador"
        term: String,
        /// Number of establishments to collect
        #[arg(long, short = 'n')]
        target: Option<u32>,
        #[arg(long, env = "MAPSCOUT_TOKEN")]
        token: String,
        /// Print the result set as JSON
        #[arg(long)]
        json: bool,
    },
    /// List past searches
    History {
        #[arg(long, env = "MAPSCOUT_TOKEN")]
        token: String,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Manage credit balances
    Credits {
        #[command(subcommand)]
        command: CreditCommands,
    },
    /// Print every phone number found on a page
    Numbers { url: String },
    /// Print the effective configuration
    Config {
        /// Write the effective configuration to the default config path
        #[arg(long)]
        init: bool,
    },
}

#[derive(Debug, Subcommand)]
enum UserCommands {
    /// Create a user
    Add {
        username: String,
        #[arg(long)]
        token: String,
        /// Starting credit balance
        #[arg(long, default_value_t = 0)]
        credits: u32,
    },
}

#[derive(Debug, Subcommand)]
enum CreditCommands {
    /// Add credits to a user's balance
    Add {
        /// Credits to add, at least 1
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        amount: u32,
        #[arg(long, env = "MAPSCOUT_TOKEN")]
        token: String,
    },
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,mapscout=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::load_with_env(cli.config.as_deref())?;

    match cli.command {
        Commands::Search {
            term,
            target,
            token,
            json,
        } => search::run_search(config, &term, target, &token, json).await,
        Commands::History { token } => users::show_history(&config, &token).await,
        Commands::User {
            command:
                UserCommands::Add {
                    username,
                    token,
                    credits,
                },
        } => users::add_user(&config, &username, &token, credits).await,
        Commands::Credits {
            command: CreditCommands::Add { amount, token },
        } => users::add_credits(&config, &token, amount).await,
        Commands::Numbers { url } => search::run_numbers(&config, &url).await,
        Commands::Config { init } => {
            if init {
                config.save()?;
                println!("wrote {}", AppConfig::config_path()?.display());
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
            Ok(())
        }
    }
}
