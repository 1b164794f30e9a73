//! mongorun - MongoDB script runner
//!
//! Manage named MongoDB server profiles, validate them with a
//! connectivity probe, browse databases and collections, and run script
//! files against a server through the external `mongo` shell executable.
//!
//! # Usage
//!
//! ```bash
//! mongorun profile add local --host localhost --auto-connect
//! mongorun test
//! mongorun run cleanup.js
//! ```

use tracing::Level;

mod cli;
mod config;
mod connection;
mod error;
mod profile;
mod runner;

use cli::CliInterface;
use error::Result;

/// Application entry point
#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging based on verbosity
/// 3. Dispatch the subcommand; `run` propagates the child's exit code
async fn run() -> Result<i32> {
    let mut cli = CliInterface::new()?;

    initialize_logging(&cli);

    cli.execute().await
}

/// Initialize logging system based on verbosity level
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else if cli.args().quiet {
        Level::ERROR
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    // Build subscriber with level filter
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    // Configure timestamps
    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
