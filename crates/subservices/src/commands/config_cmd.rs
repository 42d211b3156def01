//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::Select;
use secrecy::{ExposeSecret, SecretString};

use subservices_api::RequestStyle;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

const REDACTED: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Mask plaintext tokens in place.
fn redact(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(REDACTED.into());
        }
    }
}

/// Token for `config init`: `--token`/`SUBSERVICES_TOKEN`, else a hidden prompt.
fn obtain_token(global: &GlobalOpts, interactive: bool) -> Result<SecretString, CliError> {
    if let Some(token) = global.token.as_deref().filter(|t| !t.is_empty()) {
        return Ok(SecretString::from(token.to_owned()));
    }
    if !interactive {
        return Err(CliError::InvalidArgument(
            "no token given: pass --token <TOKEN> or --token-env <VAR>".into(),
        ));
    }

    let token = rpassword::prompt_password("API token: ").map_err(prompt_err)?;
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "API token cannot be empty".into(),
        });
    }
    Ok(SecretString::from(token))
}

fn wants_keyring(keyring_flag: bool, interactive: bool) -> Result<bool, CliError> {
    if keyring_flag || !interactive {
        return Ok(keyring_flag);
    }
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the API token?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    Ok(selection == 0)
}

/// Carry transport flags given to `config init` into the profile.
fn apply_flag_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref base_url) = global.base_url {
        profile.base_url = Some(base_url.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if global.verify_tls {
        profile.verify_tls = Some(true);
    }
    if global.header_auth {
        profile.request_style = Some(RequestStyle::HeaderAuth);
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {expected}"),
    })
}

fn set_field(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "base_url" | "base-url" => {
            url::Url::parse(&value).map_err(|e| CliError::Validation {
                field: "base_url".into(),
                reason: format!("invalid URL: {e}"),
            })?;
            profile.base_url = Some(value);
        }
        "token" => profile.token = Some(value),
        "token_env" | "token-env" => profile.token_env = Some(value),
        "timeout" => profile.timeout = Some(parse_field(key, &value, "a number (seconds)")?),
        "verify_tls" | "verify-tls" => {
            profile.verify_tls = Some(parse_field(key, &value, "'true' or 'false'")?);
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "request_style" | "request-style" => {
            profile.request_style = Some(match value.as_str() {
                "legacy" => RequestStyle::Legacy,
                "header-auth" | "header_auth" => RequestStyle::HeaderAuth,
                _ => {
                    return Err(CliError::Validation {
                        field: "request_style".into(),
                        reason: "must be 'legacy' or 'header-auth'".into(),
                    });
                }
            });
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: base_url, token, token_env, \
                     timeout, verify_tls, ca_cert, request_style"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init { token_env, keyring } => {
            let config_path = config::config_path();
            let mut cfg = config::load_config()?;
            let profile_name = config::active_profile_name(global, &cfg);
            let interactive = std::io::stdin().is_terminal();

            let mut profile = cfg.profiles.remove(&profile_name).unwrap_or_default();
            apply_flag_overrides(&mut profile, global);

            if let Some(env_name) = token_env {
                profile.token_env = Some(env_name);
                profile.token = None;
            } else {
                let token = obtain_token(global, interactive)?;
                if wants_keyring(keyring, interactive)? {
                    config::store_token_in_keyring(&profile_name, &token)?;
                    eprintln!("✓ Token stored in system keyring");
                    profile.token = None;
                } else {
                    profile.token = Some(token.expose_secret().to_owned());
                }
            }

            cfg.profiles.insert(profile_name.clone(), profile);
            let default_missing = cfg
                .default_profile
                .as_ref()
                .is_none_or(|name| !cfg.profiles.contains_key(name));
            if default_missing {
                cfg.default_profile = Some(profile_name.clone());
            }

            config::save_config(&cfg)?;
            eprintln!("✓ Profile '{profile_name}' written to {}", config_path.display());
            eprintln!("  Test it: subservices user");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let mut cfg = config::load_config()?;
            redact(&mut cfg);
            let out = match config::output_format(global, &cfg) {
                OutputFormat::Json => output::render_json_pretty(&cfg),
                OutputFormat::JsonCompact => output::render_json_compact(&cfg),
                OutputFormat::Yaml => output::render_yaml(&cfg),
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            set_field(profile, &key, value)?;

            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: subservices config init");
            } else {
                let lines: Vec<String> = cfg
                    .profiles
                    .keys()
                    .map(|name| {
                        let marker = if name == default { " *" } else { "" };
                        format!("{name}{marker}")
                    })
                    .collect();
                output::print_output(&lines.join("\n"), global.quiet);
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn redact_masks_only_plaintext_tokens() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "a".into(),
            Profile {
                token: Some("secret".into()),
                ..Profile::default()
            },
        );
        cfg.profiles.insert(
            "b".into(),
            Profile {
                token_env: Some("B_TOKEN".into()),
                ..Profile::default()
            },
        );

        redact(&mut cfg);

        assert_eq!(cfg.profiles["a"].token.as_deref(), Some(REDACTED));
        assert_eq!(cfg.profiles["b"].token, None);
        assert_eq!(cfg.profiles["b"].token_env.as_deref(), Some("B_TOKEN"));
    }

    #[test]
    fn set_field_validates_values() {
        let mut profile = Profile::default();

        set_field(&mut profile, "timeout", "45".into()).unwrap();
        set_field(&mut profile, "request-style", "header-auth".into()).unwrap();
        assert_eq!(profile.timeout, Some(45));
        assert_eq!(profile.request_style, Some(RequestStyle::HeaderAuth));

        assert!(set_field(&mut profile, "timeout", "soon".into()).is_err());
        assert!(set_field(&mut profile, "base_url", "not a url".into()).is_err());
        assert!(matches!(
            set_field(&mut profile, "colour", "red".into()),
            Err(CliError::Validation { .. })
        ));
    }
}
