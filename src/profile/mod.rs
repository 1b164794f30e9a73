//! Connection profiles.
//!
//! A profile is a named, persisted set of connection parameters for one
//! MongoDB server: endpoint, credentials, a database allow-list, the
//! collections excluded from browsing, extra arguments for the external
//! shell, and the server version observed by the last successful probe.
//!
//! Profiles are pure data. Parsing user-edited field values into a profile
//! lives in [`form`], persistence lives in the `config` module.

pub mod form;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use form::ProfileForm;

use crate::error::{ConfigError, Result};

/// Port used when a profile leaves `port` unset.
pub const DEFAULT_PORT: u16 = 27017;

/// A named, persisted set of connection parameters for one server.
///
/// Optional fields are `None` when not configured, never empty strings.
/// The two string sets are deduplicated, trimmed, and order-irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Store key; unique within one config file.
    pub name: String,

    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Server hostname or IP address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Server port. `None` means "use the default port" (27017).
    ///
    /// Zero is rejected at parse time and never stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Username for authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Databases this profile is restricted to; empty = unrestricted.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub databases: BTreeSet<String>,

    /// Collections excluded from browsing.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub collections_to_ignore: BTreeSet<String>,

    /// Extra arguments passed to the shell executable, whitespace-split.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_arguments: Option<String>,

    /// Select this profile by default when none is named.
    #[serde(default)]
    pub auto_connect: bool,

    /// Version string reported by the last successful probe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_version: Option<String>,
}

impl ConnectionProfile {
    /// Create an empty profile with the given store key.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The host, or a `ConfigError` if none is configured.
    ///
    /// Probe and runner both require a host; this is the single place the
    /// check lives so both report the same error.
    pub fn require_host(&self) -> Result<&str> {
        self.host
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ConfigError::MissingHost.into())
    }

    /// The port to connect to, substituting the default when unset.
    pub fn resolved_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Whether the allow-list permits the given database.
    ///
    /// An empty allow-list permits everything.
    pub fn allows_database(&self, database: &str) -> bool {
        self.databases.is_empty() || self.databases.contains(database)
    }

    /// Extra shell arguments split on whitespace, empty when unset.
    pub fn shell_argument_list(&self) -> Vec<String> {
        self.shell_arguments
            .as_deref()
            .map(|line| line.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

/// Map a user-edited string to an optional value: blank means unset.
pub(crate) fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split a comma-separated field into a trimmed, deduplicated set.
///
/// Empty entries (including those produced by trailing commas) are
/// dropped, so `" a, b ,a"` becomes `{"a", "b"}`.
pub(crate) fn parse_string_set(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join a string set back into the comma-separated editing form.
pub(crate) fn join_string_set(set: &BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(",")
}
