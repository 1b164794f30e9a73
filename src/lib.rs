//! mongorun library
//!
//! Core functionality for managing MongoDB connection profiles and
//! running scripts through the external `mongo` shell executable. It can
//! be used as a standalone library to embed the same profile store,
//! connectivity probe, and process-backed script runner in other tools.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration and the profile store
//! - `connection`: Connectivity probe and server browsing
//! - `error`: Error types and handling
//! - `profile`: Connection profiles and form binding
//! - `runner`: External-process script execution
//!
//! # Example
//!
//! ```no_run
//! use mongorun::config::ShellConfig;
//! use mongorun::profile::ConnectionProfile;
//! use mongorun::runner::{ExecutionEvent, ScriptRunner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut profile = ConnectionProfile::new("local");
//!     profile.host = Some("localhost".to_string());
//!
//!     let runner = ScriptRunner::new(ShellConfig::default());
//!     let mut execution = runner.run(&profile, "query.js".as_ref())?;
//!
//!     while let Some(event) = execution.next_event().await {
//!         match event {
//!             ExecutionEvent::Stdout(line) => println!("{line}"),
//!             ExecutionEvent::Stderr(line) => eprintln!("{line}"),
//!             ExecutionEvent::Exited(code) => println!("exit: {code:?}"),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod profile;
pub mod runner;

// Re-export commonly used types
pub use config::Config;
pub use connection::{ConnectivityProbe, ProbeResult};
pub use error::{MongorunError, Result};
pub use profile::{ConnectionProfile, ProfileForm};
pub use runner::{CommandLine, ExecutionEvent, ScriptExecution, ScriptRunner};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
