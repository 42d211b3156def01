//! Clap derive structures for the `subservices` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Also compiled by `build.rs`, so it may only depend on clap.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// subservices -- manage sub.services instances from the command line
#[derive(Debug, Parser)]
#[command(
    name = "subservices",
    version,
    about = "Manage sub.services instances and whitelists from the command line",
    long_about = "Command-line client for the sub.services management API.\n\n\
        Start, stop and order instances, maintain per-instance IP whitelists,\n\
        and inspect account and location information.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "SUBSERVICES_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API token (overrides profile)
    #[arg(long, env = "SUBSERVICES_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, env = "SUBSERVICES_BASE_URL", global = true, hide = true)]
    pub base_url: Option<String>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "SUBSERVICES_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Verify the server's TLS certificate (off by default)
    #[arg(long, env = "SUBSERVICES_VERIFY_TLS", global = true)]
    pub verify_tls: bool,

    /// Send the token only as an Authorization header
    #[arg(long, global = true)]
    pub header_auth: bool,

    /// Request timeout in seconds [default: 120]
    #[arg(long, env = "SUBSERVICES_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage instances
    #[command(alias = "instance", alias = "i")]
    Instances(InstancesArgs),

    /// Manage per-instance IP whitelists
    #[command(alias = "wl")]
    Whitelist(WhitelistArgs),

    /// List locations instances can be ordered in
    Locations,

    /// Show the account the token belongs to
    User,

    /// Send an arbitrary request to the API
    Request(RequestArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Instances ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InstancesArgs {
    #[command(subcommand)]
    pub command: InstancesCommand,
}

#[derive(Debug, Subcommand)]
pub enum InstancesCommand {
    /// List all instances
    #[command(alias = "ls")]
    List,

    /// Show instance details
    Show {
        /// Instance ID
        id: u64,
    },

    /// Start an instance
    Start {
        /// Instance ID
        id: u64,
    },

    /// Stop an instance
    Stop {
        /// Instance ID
        id: u64,
    },

    /// Restart an instance
    Restart {
        /// Instance ID
        id: u64,
    },

    /// Reset the root password of an instance
    ResetPassword {
        /// Instance ID
        id: u64,
    },

    /// Order a new instance
    Order {
        /// Location ID (see `subservices locations`)
        #[arg(long, short = 'l')]
        location: u64,

        /// Name of the new instance
        #[arg(long, short = 'n')]
        name: String,
    },
}

// ── Whitelist ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WhitelistArgs {
    #[command(subcommand)]
    pub command: WhitelistCommand,
}

#[derive(Debug, Subcommand)]
pub enum WhitelistCommand {
    /// List whitelist entries of an instance
    #[command(alias = "ls")]
    List {
        /// Instance ID
        instance: u64,
    },

    /// Allow an IP address on an instance
    Add {
        /// Instance ID
        instance: u64,

        /// IP address to allow (e.g. 203.0.113.7)
        ip: String,
    },

    /// Remove a whitelist entry
    #[command(alias = "rm")]
    Delete {
        /// Instance ID
        instance: u64,

        /// Whitelist entry ID
        entry: u64,

        /// IP address of the entry
        ip: String,
    },
}

// ── Raw request ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, DELETE; any case)
    pub method: String,

    /// Path relative to the API root (e.g. instance/list)
    pub path: String,

    /// Parameter as key=value (repeatable)
    #[arg(long = "param", short = 'P', value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// Parameters as a JSON object
    #[arg(long, conflicts_with = "params")]
    pub data: Option<String>,
}

/// Parse a `key=value` pair; the value may itself contain `=`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("expected key=value, got '{s}'")),
    }
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile (interactive unless --token is given)
    ///
    /// --base-url, --timeout, --verify-tls and --header-auth given alongside
    /// are stored in the profile.
    Init {
        /// Read the token from this environment variable at run time
        #[arg(long)]
        token_env: Option<String>,

        /// Keep the token in the system keyring instead of the config file
        #[arg(long)]
        keyring: bool,
    },

    /// Show the current configuration (secrets redacted)
    Show,

    /// Set a field on the active profile
    Set {
        /// Field name (base_url, token, token_env, timeout, verify_tls, ca_cert, request_style)
        key: String,

        /// New value
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
