//! Runtime secret resolution.
//!
//! Config YAML stores only the env var NAME of the Discord webhook
//! (`discord.webhook_env`). Callers resolve it once at startup with
//! [`resolve_secrets_for_mode`] and pass the result into constructors.
//! Error messages reference the NAME, never the value.
//!
//! | Mode   | Webhook  |
//! |--------|----------|
//! | DAEMON | required |
//! | REPORT | optional |

use anyhow::{bail, Result};
use serde_json::Value;

use crate::ConfigMode;

/// Env var consulted when `discord.webhook_env` is absent.
pub const DEFAULT_WEBHOOK_ENV: &str = "SW_DISCORD_WEBHOOK";

/// Secrets resolved from the environment. Values are redacted in `Debug`.
#[derive(Clone)]
pub struct ResolvedSecrets {
    /// Discord webhook URL. `None` if the named env var was absent or empty.
    pub discord_webhook: Option<String>,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Webhook URLs carry auth in the URL itself.
        f.debug_struct("ResolvedSecrets")
            .field(
                "discord_webhook",
                &self.discord_webhook.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

/// Non-empty trimmed string at `pointer`, if any.
fn read_str_at(config: &Value, pointer: &str) -> Option<String> {
    let s = config.pointer(pointer)?.as_str()?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `None` if the variable is unset or blank.
fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Env var name holding the webhook URL for this config.
pub fn webhook_env_name(config_json: &Value) -> String {
    read_str_at(config_json, "/discord/webhook_env")
        .unwrap_or_else(|| DEFAULT_WEBHOOK_ENV.to_string())
}

/// Resolve all secrets for `mode`.
///
/// # Errors
/// `SECRETS_MISSING` naming the env var when `mode` requires a value that is
/// unset or blank.
pub fn resolve_secrets_for_mode(config_json: &Value, mode: ConfigMode) -> Result<ResolvedSecrets> {
    let webhook_var = webhook_env_name(config_json);
    let discord_webhook = resolve_env(&webhook_var);

    match mode {
        ConfigMode::Daemon => {
            if discord_webhook.is_none() {
                bail!(
                    "SECRETS_MISSING mode=DAEMON: required env var '{}' \
                     (discord webhook) is not set or empty",
                    webhook_var,
                );
            }
        }
        ConfigMode::Report => {}
    }

    Ok(ResolvedSecrets { discord_webhook })
}
