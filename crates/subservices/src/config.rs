//! CLI-owned configuration: TOML profiles, token resolution, and
//! translation into a ready `SubServices` client.
//!
//! The library never sees these types; it receives `Credentials` and a
//! `TransportConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use subservices_api::{
    Credentials, DEFAULT_BASE_URL, RequestStyle, SubServices, TlsMode, TransportConfig,
};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

const KEYRING_SERVICE: &str = "subservices";
/// Set to a non-empty value other than `0` to skip the system keyring.
const NO_KEYRING_ENV: &str = "SUBSERVICES_NO_KEYRING";

// ── TOML config structs ──────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when --profile is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub verify_tls: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            verify_tls: false,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    subservices_api::DEFAULT_TIMEOUT.as_secs()
}

/// A named account profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API token (plaintext -- prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable name containing the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// API root, for staging or self-hosted gateways.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_tls: Option<bool>,

    /// PEM file with a custom CA; implies certificate verification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_style: Option<RequestStyle>,
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "sub.services", "subservices").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("subservices");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Loading / saving ─────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, CliError> {
    load_config_from(&config_path())
}

/// Defaults, then the TOML file at `path`, then `SUBSERVICES_*` variables
/// (`__` separates nested keys, e.g. `SUBSERVICES_DEFAULTS__TIMEOUT`).
pub fn load_config_from(path: &Path) -> Result<Config, CliError> {
    let config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SUBSERVICES_").split("__"))
        .extract()?;
    Ok(config)
}

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<(), CliError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ───────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// `--output` if given, else the configured default, else table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&config.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

/// Build the API client for the active profile with flag overrides applied.
pub fn build_client(global: &GlobalOpts, config: &Config) -> Result<SubServices, CliError> {
    let name = active_profile_name(global, config);
    let fallback = Profile::default();
    let profile = match config.profiles.get(&name) {
        Some(profile) => profile,
        // Flag/env tokens work without any config file.
        None if global.token.is_some() => &fallback,
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: available_profiles(config),
                name,
            });
        }
        None => &fallback,
    };

    let token = resolve_token(global.token.as_deref(), profile, &name)?;
    let base_url = resolve_base_url(global, profile)?;
    let transport = transport_config(global, profile, config);

    tracing::debug!(profile = %name, %base_url, style = ?transport.request_style, "building client");

    let credentials = Credentials::with_base_url(token.expose_secret(), base_url.as_str())
        .map_err(|e| CliError::from_api(e, &base_url))?;
    SubServices::with_config(credentials, &transport).map_err(|e| CliError::from_api(e, &base_url))
}

pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// API root from flag > profile > production, always ending in `/`.
fn resolve_base_url(global: &GlobalOpts, profile: &Profile) -> Result<String, CliError> {
    let raw = global
        .base_url
        .as_deref()
        .or(profile.base_url.as_deref())
        .unwrap_or(DEFAULT_BASE_URL);

    url::Url::parse(raw).map_err(|e| CliError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })?;

    let mut base = raw.to_owned();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(base)
}

fn transport_config(global: &GlobalOpts, profile: &Profile, config: &Config) -> TransportConfig {
    let verify = global.verify_tls || profile.verify_tls.unwrap_or(config.defaults.verify_tls);
    let tls = match (&profile.ca_cert, verify) {
        (Some(ca), _) => TlsMode::CustomCa(ca.clone()),
        (None, true) => TlsMode::System,
        (None, false) => TlsMode::DangerAcceptInvalid,
    };

    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(config.defaults.timeout);

    let style = if global.header_auth {
        RequestStyle::HeaderAuth
    } else {
        profile.request_style.unwrap_or_default()
    };

    TransportConfig::default()
        .with_tls(tls)
        .with_timeout(Duration::from_secs(timeout))
        .with_request_style(style)
}

// ── Token chain ──────────────────────────────────────────────────────

/// Resolve the API token: flag/env > profile `token_env` > keyring > plaintext.
pub fn resolve_token(
    flag: Option<&str>,
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, CliError> {
    // 1. --token / SUBSERVICES_TOKEN
    if let Some(token) = flag.filter(|t| !t.is_empty()) {
        return Ok(SecretString::from(token.to_owned()));
    }

    // 2. Profile's token_env -> env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 3. System keyring
    if keyring_enabled(std::env::var(NO_KEYRING_ENV).ok().as_deref()) {
        if let Ok(secret) = keyring_entry(profile_name).and_then(|entry| entry.get_password()) {
            return Ok(SecretString::from(secret));
        }
    } else {
        tracing::debug!("keyring lookup disabled by {NO_KEYRING_ENV}");
    }

    // 4. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(CliError::NoToken {
        profile: profile_name.into(),
    })
}

fn keyring_enabled(no_keyring: Option<&str>) -> bool {
    no_keyring.is_none_or(|v| v.is_empty() || v == "0")
}

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
}

/// Store a profile's token in the system keyring.
pub fn store_token_in_keyring(profile_name: &str, token: &SecretString) -> Result<(), CliError> {
    if !keyring_enabled(std::env::var(NO_KEYRING_ENV).ok().as_deref()) {
        return Err(CliError::Keyring(format!(
            "system keyring is disabled by {NO_KEYRING_ENV}"
        )));
    }
    keyring_entry(profile_name)
        .and_then(|entry| entry.set_password(token.expose_secret()))
        .map_err(|e| CliError::Keyring(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["subservices"];
        argv.extend_from_slice(args);
        argv.push("user");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn write(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.timeout, 120);
        assert!(!config.defaults.verify_tls);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn profiles_are_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
default_profile = "work"

[defaults]
output = "json"

[profiles.work]
token_env = "WORK_TOKEN"
base_url = "https://staging.sub.services/api/v1/"
request_style = "header-auth"
timeout = 30
"#,
        );

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("work"));
        assert_eq!(config.defaults.output, "json");
        let work = &config.profiles["work"];
        assert_eq!(work.token_env.as_deref(), Some("WORK_TOKEN"));
        assert_eq!(work.request_style, Some(RequestStyle::HeaderAuth));
        assert_eq!(work.timeout, Some(30));
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                token: Some("abc".into()),
                ..Profile::default()
            },
        );
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["default"].token.as_deref(), Some("abc"));
    }

    #[test]
    fn flag_token_wins_over_profile() {
        let profile = Profile {
            token: Some("from-file".into()),
            ..Profile::default()
        };
        let token = resolve_token(Some("from-flag"), &profile, "flag-test").unwrap();
        assert_eq!(token.expose_secret(), "from-flag");
    }

    #[test]
    fn missing_token_is_reported_per_profile() {
        let err = resolve_token(None, &Profile::default(), "no-such-profile-xyz").unwrap_err();
        assert!(matches!(err, CliError::NoToken { ref profile } if profile == "no-such-profile-xyz"));
    }

    #[test]
    fn no_keyring_switch_values() {
        assert!(keyring_enabled(None));
        assert!(keyring_enabled(Some("")));
        assert!(keyring_enabled(Some("0")));
        assert!(!keyring_enabled(Some("1")));
        assert!(!keyring_enabled(Some("true")));
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let opts = global(&["--base-url", "http://localhost:8080/api/v1"]);
        let base = resolve_base_url(&opts, &Profile::default()).unwrap();
        assert_eq!(base, "http://localhost:8080/api/v1/");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let opts = global(&["--base-url", "not a url"]);
        let err = resolve_base_url(&opts, &Profile::default()).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }

    #[test]
    fn transport_defaults_and_overrides() {
        let config = Config::default();

        let plain = transport_config(&global(&[]), &Profile::default(), &config);
        assert!(matches!(plain.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(plain.timeout, Duration::from_secs(120));
        assert_eq!(plain.request_style, RequestStyle::Legacy);

        let tuned = transport_config(
            &global(&["--verify-tls", "--header-auth", "--timeout", "15"]),
            &Profile::default(),
            &config,
        );
        assert!(matches!(tuned.tls, TlsMode::System));
        assert_eq!(tuned.timeout, Duration::from_secs(15));
        assert_eq!(tuned.request_style, RequestStyle::HeaderAuth);
    }

    #[test]
    fn unknown_explicit_profile_fails() {
        let opts = global(&["--profile", "ghost"]);
        let Err(err) = build_client(&opts, &Config::default()) else {
            panic!("expected ProfileNotFound");
        };
        assert!(matches!(err, CliError::ProfileNotFound { ref name, .. } if name == "ghost"));
    }

    #[test]
    fn output_falls_back_to_config_default() {
        let mut config = Config::default();
        config.defaults.output = "yaml".into();
        assert_eq!(output_format(&global(&[]), &config), OutputFormat::Yaml);
        assert_eq!(
            output_format(&global(&["-o", "json"]), &config),
            OutputFormat::Json
        );
    }
}
