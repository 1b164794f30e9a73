//! Condensing MongoDB driver errors into readable messages.
//!
//! The driver reports failures through a deeply nested error type. The
//! probe promises callers a single failure kind with a human-readable
//! message, so this module extracts the relevant part of each driver
//! error kind without string parsing where the typed API allows it.

use std::fmt;

use crate::error::ConnectionError;

/// Build the [`ConnectionError`] the probe reports for a driver failure.
///
/// Every driver error collapses into `ConnectionFailed`; the message keeps
/// enough detail (auth failure, unreachable host, selection timeout) for
/// the user to act on.
pub fn connection_failure(error: &mongodb::error::Error) -> ConnectionError {
    ConnectionError::ConnectionFailed(driver_error_message(error))
}

/// Extract a concise message from a MongoDB driver error using its typed
/// error kinds.
pub fn driver_error_message(error: &mongodb::error::Error) -> String {
    use mongodb::error::ErrorKind;

    match error.kind.as_ref() {
        ErrorKind::ServerSelection { message, .. } => {
            format!("server unreachable: {message}")
        }
        ErrorKind::Authentication { message, .. } => {
            format!("authentication failed: {message}")
        }
        ErrorKind::Io(io_err) => format!("network error: {io_err}"),
        ErrorKind::InvalidArgument { message, .. } => {
            format!("invalid connection argument: {message}")
        }
        ErrorKind::Command(command_error) => format!(
            "server rejected command ({}): {}",
            command_error.code, command_error.message
        ),
        // For other error kinds, fall back to the Display representation.
        _ => error.to_string(),
    }
}

/// Format a driver error for the top-level error `Display` impl.
///
/// Intended to be used by the parent module's `Display` implementation for
/// `MongorunError::MongoDb`.
pub fn format_driver_error(
    f: &mut fmt::Formatter<'_>,
    error: &mongodb::error::Error,
) -> fmt::Result {
    write!(f, "MongoDB error: {}", driver_error_message(error))
}
