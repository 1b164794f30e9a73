//! Error handling module for mongorun.
//!
//! The error taxonomy mirrors how failures are surfaced to the user:
//! - [`ConfigError`]: malformed profile fields or store state, caught
//!   before any I/O
//! - [`ConnectionError`]: the probe could not reach or authenticate
//! - [`LaunchError`]: the external shell process could not be started
//!
//! A non-zero exit code from the spawned shell is deliberately NOT part of
//! this taxonomy; it is a normal terminal state reported by the runner.

pub mod kinds;
pub mod mongo;

// Re-export commonly used types
pub use kinds::{ConfigError, ConnectionError, LaunchError, MongorunError, Result};
pub use mongo::{connection_failure, driver_error_message};
