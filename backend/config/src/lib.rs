//! `snaptext-config`: runtime configuration for the SnapText bot.
//!
//! Provides:
//! - Typed config schema (telegram, OCR, limits, dialogs, logging)
//! - YAML loading with a legacy `config/token.txt` fallback
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation, including the ledger limit invariants
//! - Redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, read_legacy_token, LEGACY_TOKEN_FILE};
pub use redact::redact;
pub use schema::SnapTextConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use snaptext_core::{LedgerPolicy, SnapError};
use std::path::Path;

/// Load a config file, substitute env vars, fill in the legacy token and apply
/// defaults. Does not validate.
pub async fn load_resolved(path: &Path) -> Result<SnapTextConfig> {
    load_resolved_with_legacy(path, Path::new(LEGACY_TOKEN_FILE)).await
}

/// [`load_resolved`] with an explicit legacy token file location.
pub async fn load_resolved_with_legacy(path: &Path, legacy_token_file: &Path) -> Result<SnapTextConfig> {
    let raw = load_config(path).await?;
    let value = serde_json::to_value(&raw).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let legacy = read_legacy_token(legacy_token_file).await?;
    prepare(value, legacy)
}

/// Validate a loaded config, logging every finding. Fails if any error is found.
pub fn ensure_valid(config: &SnapTextConfig, source: &Path) -> Result<ValidationReport> {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        bail!("config at {} has {} error(s)", source.display(), report.errors.len());
    }
    Ok(report)
}

/// Deserialize an env-resolved value, apply the legacy token when no token is
/// configured, then apply defaults.
pub fn prepare(value: Value, legacy_token: Option<String>) -> Result<SnapTextConfig> {
    let mut config: SnapTextConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    if config.bot_token().is_none() {
        if let Some(token) = legacy_token {
            config.telegram.get_or_insert_with(Default::default).bot_token = Some(token);
        }
    }

    Ok(apply_all_defaults(config))
}

/// Build the ledger policy from the `limits` section.
pub fn ledger_policy(config: &SnapTextConfig) -> Result<LedgerPolicy, SnapError> {
    let defaults = LedgerPolicy::default();
    let limits = config.limits();
    LedgerPolicy::new(
        limits.max_history.unwrap_or(defaults.max_history()),
        limits.max_in_window.unwrap_or(defaults.max_in_window()),
        limits.window_secs.unwrap_or(defaults.window_secs()),
    )
}
