use std::{fmt, io};

use crate::error::mongo::format_driver_error;

/// Crate-wide `Result` type using [`MongorunError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, MongorunError>;

/// Top-level error type for mongorun operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum MongorunError {
    /// Malformed profile or configuration, detected before any I/O.
    Config(ConfigError),

    /// The probe could not reach or authenticate to the server.
    Connection(ConnectionError),

    /// The external shell process could not be started.
    Launch(LaunchError),

    /// I/O errors.
    Io(io::Error),

    /// MongoDB driver errors.
    MongoDb(mongodb::error::Error),
}

/// Configuration-specific errors.
///
/// These are always raised before any network or process I/O happens and
/// are never retried.
#[derive(Debug)]
pub enum ConfigError {
    /// Profile has no host set but the operation needs one.
    MissingHost,

    /// Port field could not be parsed, or was zero.
    InvalidPort(String),

    /// Config file not found.
    FileNotFound(String),

    /// Invalid config file format.
    InvalidFormat(String),

    /// No profile with the given name exists.
    UnknownProfile(String),

    /// A profile with the given name already exists.
    DuplicateProfile(String),

    /// No profile was named and no single autoconnect profile exists.
    NoDefaultProfile,

    /// Database is not in the profile's allow-list.
    DatabaseNotAllowed { profile: String, database: String },
}

/// Connectivity-probe errors.
///
/// All driver-level failures are normalized into `ConnectionFailed` with a
/// human-readable message; there are no partial-success states.
#[derive(Debug)]
pub enum ConnectionError {
    /// Failed to establish a connection.
    ConnectionFailed(String),

    /// Probe did not complete within the configured timeout.
    Timeout,

    /// Probe was cancelled by the caller.
    Cancelled,
}

/// Process-launch errors.
///
/// Fatal to a single run attempt. A non-zero exit code of the spawned
/// process is NOT an error; it is a normal terminal state of the execution.
#[derive(Debug)]
pub enum LaunchError {
    /// Shell executable not found at its configured path or on PATH.
    ExecutableNotFound(String),

    /// Script file does not exist or is not a regular file.
    ScriptNotFound(String),

    /// The OS refused to spawn the process.
    SpawnFailed(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for MongorunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MongorunError::Config(e) => write!(f, "Configuration error: {e}"),
            MongorunError::Connection(e) => write!(f, "Connection error: {e}"),
            MongorunError::Launch(e) => write!(f, "Launch error: {e}"),
            MongorunError::Io(e) => write!(f, "I/O error: {e}"),
            MongorunError::MongoDb(e) => format_driver_error(f, e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingHost => write!(f, "profile has no host configured"),
            ConfigError::InvalidPort(value) => {
                write!(f, "invalid port '{value}' (expected 1-65535)")
            }
            ConfigError::FileNotFound(path) => write!(f, "config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "invalid config format: {msg}"),
            ConfigError::UnknownProfile(name) => write!(f, "no such profile: {name}"),
            ConfigError::DuplicateProfile(name) => {
                write!(f, "profile '{name}' already exists")
            }
            ConfigError::NoDefaultProfile => write!(
                f,
                "no profile named and no single autoconnect profile to fall back to"
            ),
            ConfigError::DatabaseNotAllowed { profile, database } => write!(
                f,
                "database '{database}' is not in the allow-list of profile '{profile}'"
            ),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectionFailed(msg) => {
                write!(f, "cannot establish connection: {msg}")
            }
            ConnectionError::Timeout => write!(f, "connection attempt timed out"),
            ConnectionError::Cancelled => write!(f, "probe cancelled"),
        }
    }
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchError::ExecutableNotFound(name) => {
                write!(f, "shell executable not found: {name}")
            }
            LaunchError::ScriptNotFound(path) => write!(f, "script file not found: {path}"),
            LaunchError::SpawnFailed(msg) => write!(f, "failed to spawn shell process: {msg}"),
        }
    }
}

impl std::error::Error for MongorunError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ConnectionError {}
impl std::error::Error for LaunchError {}

/* ========================= Conversions to MongorunError ========================= */

impl From<io::Error> for MongorunError {
    fn from(err: io::Error) -> Self {
        MongorunError::Io(err)
    }
}

impl From<mongodb::error::Error> for MongorunError {
    fn from(err: mongodb::error::Error) -> Self {
        MongorunError::MongoDb(err)
    }
}

impl From<ConfigError> for MongorunError {
    fn from(err: ConfigError) -> Self {
        MongorunError::Config(err)
    }
}

impl From<ConnectionError> for MongorunError {
    fn from(err: ConnectionError) -> Self {
        MongorunError::Connection(err)
    }
}

impl From<LaunchError> for MongorunError {
    fn from(err: LaunchError) -> Self {
        MongorunError::Launch(err)
    }
}
