//! Config file discovery and loading.

use crate::schema::SnapTextConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Plain-text token file used by older deployments.
pub const LEGACY_TOKEN_FILE: &str = "config/token.txt";

/// Resolve the SnapText config directory.
/// Priority: `SNAPTEXT_CONFIG_DIR` env > `~/.snaptext/` > `./.snaptext`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SNAPTEXT_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".snaptext"),
        None => PathBuf::from(".snaptext"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<SnapTextConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(SnapTextConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: SnapTextConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Read the first whitespace-delimited token from a legacy token file.
///
/// Returns `Ok(None)` when the file is absent or blank.
pub async fn read_legacy_token(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read token file: {}", path.display()))?;
    let token = raw.split_whitespace().next().map(str::to_string);
    if token.is_some() {
        info!(path = %path.display(), "Using bot token from legacy token file");
    }
    Ok(token)
}
