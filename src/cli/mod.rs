//! Command-line interface for mongorun
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and profile selection
//! - Dispatching to the probe, the browser, and the script runner
//! - Shell completion generation
//!
//! All profile input goes through [`ProfileForm`], so the CLI exercises
//! exactly the same validation as any other editor front end would.

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};

use crate::config::Config;
use crate::connection::ConnectivityProbe;
use crate::error::{ConfigError, Result};
use crate::profile::{ConnectionProfile, ProfileForm};
use crate::runner::{ExecutionEvent, ScriptRunner};

/// Run MongoDB scripts and manage server connection profiles
#[derive(Parser, Debug)]
#[command(
    name = "mongorun",
    version,
    about = "Run MongoDB scripts through the external mongo shell",
    long_about = "Manage named MongoDB server profiles, test connectivity, browse databases
and collections, and run script files against a server through the external
mongo shell executable."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (minimal output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (debug logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands for mongorun
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage connection profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Probe a profile's server and record its version
    Test {
        /// Profile name (falls back to the autoconnect profile)
        #[arg(value_name = "PROFILE")]
        profile: Option<String>,
    },

    /// List databases visible through a profile
    Databases {
        /// Profile name (falls back to the autoconnect profile)
        #[arg(short = 'P', long, value_name = "NAME")]
        profile: Option<String>,

        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// List collections in a database
    Collections {
        /// Database name
        #[arg(value_name = "DATABASE")]
        database: String,

        /// Profile name (falls back to the autoconnect profile)
        #[arg(short = 'P', long, value_name = "NAME")]
        profile: Option<String>,

        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Run a script file through the external shell
    Run {
        /// Path to the script file
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Profile name (falls back to the autoconnect profile)
        #[arg(short = 'P', long, value_name = "NAME")]
        profile: Option<String>,
    },

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },
}

/// Profile store operations
#[derive(Subcommand, Debug, Clone)]
pub enum ProfileAction {
    /// Add a new profile
    Add {
        /// Profile name (store key)
        name: String,

        #[command(flatten)]
        fields: ProfileFields,
    },

    /// Edit fields of an existing profile
    Edit {
        /// Profile name
        name: String,

        #[command(flatten)]
        fields: ProfileFields,
    },

    /// List stored profiles
    List,

    /// Show one profile's fields
    Show {
        /// Profile name
        name: String,
    },

    /// Remove a profile
    Remove {
        /// Profile name
        name: String,
    },
}

/// Editable profile fields, shared by `add` and `edit`.
///
/// Values are taken as raw strings and parsed by the form binding, so a
/// bad port is reported as a configuration error rather than a usage
/// error, the same way any other editor would report it.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ProfileFields {
    /// Display name
    #[arg(long, value_name = "TEXT")]
    pub label: Option<String>,

    /// Server hostname or IP address
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Server port (blank = default 27017)
    #[arg(long, value_name = "PORT")]
    pub port: Option<String>,

    /// Username for authentication
    #[arg(short = 'u', long, value_name = "USERNAME")]
    pub username: Option<String>,

    /// Password for authentication
    #[arg(short = 'p', long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Comma-separated database allow-list
    #[arg(long, value_name = "NAMES")]
    pub databases: Option<String>,

    /// Comma-separated collections excluded from browsing
    #[arg(long = "collections-to-ignore", value_name = "NAMES")]
    pub collections_to_ignore: Option<String>,

    /// Extra arguments passed to the shell executable
    #[arg(long = "shell-arguments", value_name = "ARGS")]
    pub shell_arguments: Option<String>,

    /// Use this profile when none is named
    #[arg(long = "auto-connect")]
    pub auto_connect: bool,
}

impl ProfileFields {
    /// Overlay these flags onto a form; absent flags leave fields as-is.
    fn overlay(&self, form: &mut ProfileForm) {
        if let Some(label) = &self.label {
            form.label = label.clone();
        }
        if let Some(host) = &self.host {
            form.host = host.clone();
        }
        if let Some(port) = &self.port {
            form.port = port.clone();
        }
        if let Some(username) = &self.username {
            form.username = username.clone();
        }
        if let Some(password) = &self.password {
            form.password = password.clone();
        }
        if let Some(databases) = &self.databases {
            form.databases = databases.clone();
        }
        if let Some(collections) = &self.collections_to_ignore {
            form.collections_to_ignore = collections.clone();
        }
        if let Some(args) = &self.shell_arguments {
            form.shell_arguments = args.clone();
        }
        if self.auto_connect {
            form.auto_connect = true;
        }
    }
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Config::load_from_file(args.config_file.as_deref())?;
        Ok(Self { args, config })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Configuration file path (from args or default)
    fn config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_path)
    }

    /// Execute the requested subcommand and return the process exit code.
    pub async fn execute(&mut self) -> Result<i32> {
        // Handlers mutate self.config, so take the command by value.
        let command = self.args.command.clone();
        match command {
            Commands::Profile { action } => match action {
                ProfileAction::Add { name, fields } => {
                    self.add_profile(name, &fields)?;
                    Ok(0)
                }
                ProfileAction::Edit { name, fields } => {
                    self.edit_profile(name, &fields)?;
                    Ok(0)
                }
                ProfileAction::List => self.list_profiles(),
                ProfileAction::Show { name } => self.show_profile(&name),
                ProfileAction::Remove { name } => self.remove_profile(&name),
            },
            Commands::Test { profile } => self.test_profile(profile).await,
            Commands::Databases { profile, json } => {
                self.list_databases(profile.as_deref(), json).await
            }
            Commands::Collections {
                database,
                profile,
                json,
            } => {
                self.list_collections(database, profile.as_deref(), json)
                    .await
            }
            Commands::Run { script, profile } => self.run_script(script, profile).await,
            Commands::Completion { shell } => {
                generate_completion(&shell)?;
                Ok(0)
            }
        }
    }

    fn add_profile(&mut self, name: String, fields: &ProfileFields) -> Result<()> {
        let mut form = ProfileForm {
            name,
            ..ProfileForm::default()
        };
        fields.overlay(&mut form);

        let profile = form.apply()?;
        let name = profile.name.clone();
        self.config.add_profile(profile)?;
        self.config.save(&self.config_path())?;

        if !self.args.quiet {
            println!("Profile '{}' added", name);
        }
        Ok(())
    }

    fn edit_profile(&mut self, name: String, fields: &ProfileFields) -> Result<()> {
        let mut form = ProfileForm::load(self.config.profile(&name)?);
        fields.overlay(&mut form);
        let updated = form.apply()?;

        *self.config.profile_mut(&name)? = updated;
        self.config.save(&self.config_path())?;

        if !self.args.quiet {
            println!("Profile '{}' updated", name);
        }
        Ok(())
    }

    fn list_profiles(&self) -> Result<i32> {
        if self.config.profiles.is_empty() {
            println!("No profiles stored. Add one with: mongorun profile add <name> --host <host>");
            return Ok(0);
        }

        for profile in &self.config.profiles {
            let endpoint = match &profile.host {
                Some(host) => format!("{}:{}", host, profile.resolved_port()),
                None => "(no host)".to_string(),
            };
            let marker = if profile.auto_connect { "*" } else { " " };
            let version = profile.server_version.as_deref().unwrap_or("-");
            println!("{} {:<20} {:<30} {}", marker, profile.name, endpoint, version);
        }
        Ok(0)
    }

    fn show_profile(&self, name: &str) -> Result<i32> {
        let form = ProfileForm::load(self.config.profile(name)?);

        println!("name:                  {}", form.name);
        println!("label:                 {}", form.label);
        println!("host:                  {}", form.host);
        println!("port:                  {}", form.port);
        println!("username:              {}", form.username);
        println!(
            "password:              {}",
            if form.password.is_empty() { "" } else { "***" }
        );
        println!("databases:             {}", form.databases);
        println!("collections to ignore: {}", form.collections_to_ignore);
        println!("shell arguments:       {}", form.shell_arguments);
        println!("auto connect:          {}", form.auto_connect);
        println!("server version:        {}", form.server_version);
        Ok(0)
    }

    fn remove_profile(&mut self, name: &str) -> Result<i32> {
        self.config.remove_profile(name)?;
        self.config.save(&self.config_path())?;
        if !self.args.quiet {
            println!("Profile '{}' removed", name);
        }
        Ok(0)
    }

    /// Probe the server and, on success, persist the reported version
    /// into the stored profile. The probe itself never mutates anything;
    /// this is the caller-side write the probe contract leaves to us.
    async fn test_profile(&mut self, name: Option<String>) -> Result<i32> {
        let profile = self.config.select_profile(name.as_deref())?.clone();
        let probe = ConnectivityProbe::new(self.config.probe.clone());

        let cancel = tokio_util::sync::CancellationToken::new();
        let ctrl_c_cancel = cancel.clone();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_c_cancel.cancel();
            }
        });

        let result = probe.probe_cancellable(&profile, cancel).await;
        ctrl_c.abort();
        let result = result?;

        println!(
            "Connected to {}:{} in {} ms",
            profile.require_host()?,
            profile.resolved_port(),
            result.round_trip.as_millis()
        );
        match &result.server_version {
            Some(version) => println!("MongoDB server version: {}", version),
            None => println!("MongoDB server version: unknown"),
        }

        if let Some(version) = result.server_version {
            self.config.profile_mut(&profile.name)?.server_version = Some(version);
            self.config.save(&self.config_path())?;
        }
        Ok(0)
    }

    async fn list_databases(&self, name: Option<&str>, json: bool) -> Result<i32> {
        let profile = self.config.select_profile(name)?;
        let probe = ConnectivityProbe::new(self.config.probe.clone());
        let names = probe.list_databases(profile).await?;
        print_names(&names, json);
        Ok(0)
    }

    async fn list_collections(
        &self,
        database: String,
        name: Option<&str>,
        json: bool,
    ) -> Result<i32> {
        let profile = self.config.select_profile(name)?;
        let probe = ConnectivityProbe::new(self.config.probe.clone());
        let names = probe.list_collections(profile, &database).await?;
        print_names(&names, json);
        Ok(0)
    }

    /// Run a script and forward its output; the child's exit code becomes
    /// our own so callers can script around failures.
    async fn run_script(&self, script: PathBuf, name: Option<String>) -> Result<i32> {
        let profile = self.config.select_profile(name.as_deref())?;
        let runner = ScriptRunner::new(self.config.shell.clone());
        let mut execution = runner.run(profile, &script)?;

        let cancel = execution.cancel_token();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });

        let mut exit_code = None;
        while let Some(event) = execution.next_event().await {
            match event {
                ExecutionEvent::Stdout(line) => println!("{}", line),
                ExecutionEvent::Stderr(line) => eprintln!("{}", line),
                ExecutionEvent::Exited(code) => {
                    exit_code = code;
                    break;
                }
            }
        }
        ctrl_c.abort();

        let code = exit_code.unwrap_or(1);
        if !self.args.quiet {
            println!("Process finished with exit code {}", code);
        }
        Ok(code)
    }
}

/// Print a name listing, plain or as JSON.
fn print_names(names: &[String], json: bool) {
    if json {
        match serde_json::to_string_pretty(names) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => eprintln!("Format error: {}", e),
        }
    } else {
        for name in names {
            println!("{}", name);
        }
    }
}

/// Generate shell completion script on stdout
fn generate_completion(shell_name: &str) -> Result<()> {
    let shell = parse_shell(shell_name)?;
    let mut cmd = CliArgs::command();
    generate(shell, &mut cmd, "mongorun", &mut io::stdout());
    Ok(())
}

/// Parse shell name string to Shell enum
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        _ => Err(ConfigError::InvalidFormat(format!(
            "unsupported shell: {shell_name}. Supported shells: bash, zsh, fish"
        ))
        .into()),
    }
}
