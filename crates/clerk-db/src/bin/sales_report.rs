//! # Sales Report CLI
//!
//! Prints the sales history of one publisher.
//!
//! ## Usage
//! ```bash
//! # Prompt for the publisher, config from ./.env or DB_* variables
//! cargo run -p clerk-db --bin sales-report
//!
//! # Seed the bookstore tables first, then report on publisher 1
//! cargo run -p clerk-db --bin sales-report -- --fixtures fixtures/tests_data.json --publisher 1
//!
//! # Read the .env from another directory
//! cargo run -p clerk-db --bin sales-report -- --env ./deploy --publisher "O'Reilly"
//! ```

use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use clerk_core::PublisherRef;
use clerk_db::{bootstrap, ConnectionManager, DbConfig};

#[derive(Debug, Default)]
struct Args {
    env_dir: Option<PathBuf>,
    fixtures: Option<PathBuf>,
    publisher: Option<String>,
}

fn print_help() {
    println!("Clerk Sales Report");
    println!();
    println!("Usage: sales-report [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -e, --env <DIR>          Directory holding the .env file (default: current)");
    println!("  -f, --fixtures <FILE>    Create bookstore tables and load this fixture file first");
    println!("  -p, --publisher <ID|NAME> Publisher to report on (prompted when absent)");
    println!("  -h, --help               Show this help message");
}

/// Returns `None` when help was requested.
fn parse_args() -> Option<Args> {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--env" | "-e" => {
                if i + 1 < args.len() {
                    parsed.env_dir = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--fixtures" | "-f" => {
                if i + 1 < args.len() {
                    parsed.fixtures = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--publisher" | "-p" => {
                if i + 1 < args.len() {
                    parsed.publisher = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                return None;
            }
            _ => {}
        }
        i += 1;
    }

    Some(parsed)
}

/// Directives used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "info,clerk=debug,sqlx=warn";

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - Default: INFO, with debug for clerk crates
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();
}

async fn prompt_publisher() -> std::io::Result<String> {
    println!("Enter publisher name or ID: ");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = parse_args() else {
        return Ok(());
    };

    init_tracing();

    let config = match &args.env_dir {
        Some(dir) => DbConfig::from_env_dir(dir)?,
        None => DbConfig::from_env()?,
    };

    let mut db = ConnectionManager::new(config);

    if let Some(path) = &args.fixtures {
        let json = std::fs::read_to_string(path)?;
        let seeded = async {
            bootstrap::create_bookstore_tables(&mut db).await?;
            db.fixtures().load_json(&json).await
        }
        .await;
        if let Err(e) = seeded {
            db.close().await;
            return Err(e.into());
        }
    }

    let input = match args.publisher {
        Some(publisher) => publisher,
        None => prompt_publisher().await?,
    };
    let publisher = PublisherRef::parse(&input);

    let report = db.reports().sales_by_publisher(&publisher).await;
    db.close().await;

    println!("{}", report?);
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
