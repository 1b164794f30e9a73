//! Command-line construction for the external shell.
//!
//! The argument order is fixed so invocations are reproducible and
//! testable by string comparison:
//!
//! ```text
//! <shell-executable> [extra-shell-args...] [connection-args...] <script-path>
//! ```
//!
//! Connection arguments come straight from the profile: `--host`, then
//! `--port` when one is explicitly configured, then `-u`/`-p` when
//! credentials are set.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::profile::ConnectionProfile;

/// A fully resolved shell invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Absolute or discovered path of the shell executable.
    pub program: PathBuf,

    /// Arguments in their guaranteed order, script path last.
    pub args: Vec<String>,
}

impl CommandLine {
    /// Build the invocation for running `script` against `profile`.
    ///
    /// # Errors
    /// `ConfigError::MissingHost` when the profile has no host; caught
    /// here, before any process is spawned.
    pub fn build(
        shell: &Path,
        profile: &ConnectionProfile,
        script: &Path,
    ) -> Result<CommandLine> {
        let host = profile.require_host()?;

        let mut args = profile.shell_argument_list();

        args.push("--host".to_string());
        args.push(host.to_string());

        if let Some(port) = profile.port {
            args.push("--port".to_string());
            args.push(port.to_string());
        }

        if let Some(username) = &profile.username {
            args.push("-u".to_string());
            args.push(username.clone());
            if let Some(password) = &profile.password {
                args.push("-p".to_string());
                args.push(password.clone());
            }
        }

        args.push(script.display().to_string());

        Ok(CommandLine {
            program: shell.to_path_buf(),
            args,
        })
    }

    /// Render the invocation as one line for logging and tests.
    pub fn rendered(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Rendered invocation with the password argument masked.
    pub fn rendered_sanitized(&self) -> String {
        let mut line = self.program.display().to_string();
        let mut mask_next = false;
        for arg in &self.args {
            line.push(' ');
            if mask_next {
                line.push_str("***");
                mask_next = false;
            } else {
                line.push_str(arg);
                mask_next = arg == "-p";
            }
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> ConnectionProfile {
        let mut p = ConnectionProfile::new("prod");
        p.host = Some("db.example.com".to_string());
        p
    }

    #[test]
    fn test_minimal_command_line() {
        let cmd = CommandLine::build(
            Path::new("/usr/bin/mongo"),
            &profile(),
            Path::new("/tmp/query.js"),
        )
        .unwrap();
        assert_eq!(
            cmd.rendered(),
            "/usr/bin/mongo --host db.example.com /tmp/query.js"
        );
    }

    #[test]
    fn test_full_command_line_order() {
        let mut p = profile();
        p.port = Some(27018);
        p.username = Some("app".to_string());
        p.password = Some("hunter2".to_string());
        p.shell_arguments = Some("--quiet --norc".to_string());

        let cmd =
            CommandLine::build(Path::new("/opt/mongo"), &p, Path::new("migrate.js")).unwrap();
        assert_eq!(
            cmd.rendered(),
            "/opt/mongo --quiet --norc --host db.example.com --port 27018 -u app -p hunter2 migrate.js"
        );
    }

    #[test]
    fn test_script_path_is_last_executable_first() {
        let mut p = profile();
        p.shell_arguments = Some("--eval x".to_string());
        let cmd = CommandLine::build(Path::new("mongo"), &p, Path::new("s.js")).unwrap();

        assert_eq!(cmd.program, PathBuf::from("mongo"));
        assert_eq!(cmd.args.last().unwrap(), "s.js");
        // Extra shell args come before connection args.
        let host_pos = cmd.args.iter().position(|a| a == "--host").unwrap();
        let eval_pos = cmd.args.iter().position(|a| a == "--eval").unwrap();
        assert!(eval_pos < host_pos);
    }

    #[test]
    fn test_default_port_is_omitted() {
        let cmd =
            CommandLine::build(Path::new("mongo"), &profile(), Path::new("s.js")).unwrap();
        assert!(!cmd.args.contains(&"--port".to_string()));
    }

    #[test]
    fn test_username_without_password() {
        let mut p = profile();
        p.username = Some("app".to_string());
        let cmd = CommandLine::build(Path::new("mongo"), &p, Path::new("s.js")).unwrap();
        assert_eq!(cmd.rendered(), "mongo --host db.example.com -u app s.js");
    }

    #[test]
    fn test_missing_host_is_config_error() {
        let p = ConnectionProfile::new("no-host");
        assert!(CommandLine::build(Path::new("mongo"), &p, Path::new("s.js")).is_err());
    }

    #[test]
    fn test_sanitized_rendering_masks_password() {
        let mut p = profile();
        p.username = Some("app".to_string());
        p.password = Some("hunter2".to_string());
        let cmd = CommandLine::build(Path::new("mongo"), &p, Path::new("s.js")).unwrap();

        let sanitized = cmd.rendered_sanitized();
        assert!(!sanitized.contains("hunter2"));
        assert!(sanitized.contains("-p ***"));
    }

    #[test]
    fn test_identical_profiles_build_identical_lines() {
        let a = CommandLine::build(Path::new("mongo"), &profile(), Path::new("s.js")).unwrap();
        let b = CommandLine::build(Path::new("mongo"), &profile(), Path::new("s.js")).unwrap();
        assert_eq!(a, b);
    }
}
