//! Form binding between a profile and editable field values.
//!
//! This is the widget-free mapping any editor front end goes through:
//! `load` renders a profile into plain strings, `apply` parses them back,
//! validating as it goes. There is no hidden state beyond the fields
//! themselves, so `apply(load(p))` reproduces `p` exactly.

use crate::error::{ConfigError, Result};
use crate::profile::{ConnectionProfile, blank_to_none, join_string_set, parse_string_set};

/// Editable field values for one profile.
///
/// Every field is a plain string (plus one flag) so the struct maps 1:1
/// onto text inputs. Unset optional profile fields render as empty
/// strings; blank strings parse back to unset, never to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub label: String,
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
    /// Comma-separated database allow-list.
    pub databases: String,
    /// Comma-separated collection names excluded from browsing.
    pub collections_to_ignore: String,
    pub shell_arguments: String,
    pub auto_connect: bool,
    pub server_version: String,
}

impl ProfileForm {
    /// Populate field values from a profile.
    pub fn load(profile: &ConnectionProfile) -> Self {
        Self {
            name: profile.name.clone(),
            label: profile.label.clone().unwrap_or_default(),
            host: profile.host.clone().unwrap_or_default(),
            port: profile.port.map(|p| p.to_string()).unwrap_or_default(),
            username: profile.username.clone().unwrap_or_default(),
            password: profile.password.clone().unwrap_or_default(),
            databases: join_string_set(&profile.databases),
            collections_to_ignore: join_string_set(&profile.collections_to_ignore),
            shell_arguments: profile.shell_arguments.clone().unwrap_or_default(),
            auto_connect: profile.auto_connect,
            server_version: profile.server_version.clone().unwrap_or_default(),
        }
    }

    /// Parse field values back into a profile.
    ///
    /// # Errors
    /// `ConfigError::InvalidPort` if the port field is non-empty but not a
    /// port number in 1-65535. A zero port is rejected rather than being
    /// treated as "unset"; unset is expressed by a blank field.
    pub fn apply(&self) -> Result<ConnectionProfile> {
        Ok(ConnectionProfile {
            name: self.name.trim().to_string(),
            label: blank_to_none(&self.label),
            host: blank_to_none(&self.host),
            port: parse_port(&self.port)?,
            username: blank_to_none(&self.username),
            password: blank_to_none(&self.password),
            databases: parse_string_set(&self.databases),
            collections_to_ignore: parse_string_set(&self.collections_to_ignore),
            shell_arguments: blank_to_none(&self.shell_arguments),
            auto_connect: self.auto_connect,
            server_version: blank_to_none(&self.server_version),
        })
    }
}

/// Parse the port field: blank is unset, anything else must be 1-65535.
fn parse_port(value: &str) -> Result<Option<u16>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match trimmed.parse::<u16>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidPort(trimmed.to_string()).into()),
        Ok(port) => Ok(Some(port)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MongorunError;
    use crate::profile::parse_string_set;

    fn full_profile() -> ConnectionProfile {
        ConnectionProfile {
            name: "prod".to_string(),
            label: Some("Production".to_string()),
            host: Some("db.example.com".to_string()),
            port: Some(27018),
            username: Some("app".to_string()),
            password: Some("hunter2".to_string()),
            databases: parse_string_set("orders,users"),
            collections_to_ignore: parse_string_set("system.profile"),
            shell_arguments: Some("--quiet".to_string()),
            auto_connect: true,
            server_version: Some("7.0.5".to_string()),
        }
    }

    #[test]
    fn test_round_trip_fully_set() {
        let profile = full_profile();
        let round_tripped = ProfileForm::load(&profile).apply().unwrap();
        assert_eq!(round_tripped, profile);
    }

    #[test]
    fn test_round_trip_fully_unset() {
        let profile = ConnectionProfile::new("bare");
        let round_tripped = ProfileForm::load(&profile).apply().unwrap();
        assert_eq!(round_tripped, profile);
    }

    #[test]
    fn test_blank_fields_parse_to_unset() {
        let form = ProfileForm {
            name: "p".to_string(),
            host: "localhost".to_string(),
            label: "   ".to_string(),
            username: String::new(),
            ..ProfileForm::default()
        };
        let profile = form.apply().unwrap();
        assert_eq!(profile.label, None);
        assert_eq!(profile.username, None);
        assert_eq!(profile.port, None);
        // Unset must never round-trip into Some("").
        assert_ne!(profile.label, Some(String::new()));
    }

    #[test]
    fn test_non_numeric_port_is_config_error() {
        let form = ProfileForm {
            name: "p".to_string(),
            port: "27x17".to_string(),
            ..ProfileForm::default()
        };
        let err = form.apply().unwrap_err();
        assert!(matches!(
            err,
            MongorunError::Config(ConfigError::InvalidPort(_))
        ));
    }

    #[test]
    fn test_zero_port_is_config_error() {
        let form = ProfileForm {
            name: "p".to_string(),
            port: "0".to_string(),
            ..ProfileForm::default()
        };
        assert!(form.apply().is_err());
    }

    #[test]
    fn test_out_of_range_port_is_config_error() {
        let form = ProfileForm {
            name: "p".to_string(),
            port: "70000".to_string(),
            ..ProfileForm::default()
        };
        assert!(form.apply().is_err());
    }

    #[test]
    fn test_list_fields_normalize() {
        let form = ProfileForm {
            name: "p".to_string(),
            databases: " a, b ,a".to_string(),
            ..ProfileForm::default()
        };
        let profile = form.apply().unwrap();
        assert_eq!(
            profile.databases,
            parse_string_set("a,b"),
            "duplicates dropped, entries trimmed"
        );
    }

    #[test]
    fn test_load_renders_unset_as_empty() {
        let form = ProfileForm::load(&ConnectionProfile::new("bare"));
        assert_eq!(form.host, "");
        assert_eq!(form.port, "");
        assert_eq!(form.databases, "");
        assert!(!form.auto_connect);
    }
}
