//! `run` subcommand: wire the collaborators together and start long polling.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use snaptext_channels::{BotState, ChannelAdapter, TelegramAdapter};
use snaptext_config::defaults::{DEFAULT_DIALOGS_PATH, DEFAULT_LOG_DIR, DEFAULT_LOG_LEVEL};
use snaptext_config::{ensure_valid, ledger_policy, load_resolved, SnapTextConfig};
use snaptext_core::{Language, UserRegistry};
use snaptext_dialogs::Dialogs;
use snaptext_logging::{init_logger, redact_sensitive_data};
use tracing::info;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = load_resolved(config_path).await?;
    start_logging(&config).await?;
    info!(config = %config_path.display(), "Starting SnapText");

    ensure_valid(&config, config_path)?;

    let policy = ledger_policy(&config).context("Invalid ledger limits")?;
    info!(
        max_history = policy.max_history(),
        max_in_window = policy.max_in_window(),
        window_secs = policy.window_secs(),
        "Ledger policy"
    );

    let ocr = snaptext_understanding::build_engine(&config.ocr())?;
    info!(engine = ocr.name(), "OCR engine ready");

    let dialogs_config = config.dialogs();
    let default_language: Language = dialogs_config
        .default_language
        .as_deref()
        .and_then(|code| code.parse().ok())
        .unwrap_or_default();
    let dialogs_path = PathBuf::from(dialogs_config.path.as_deref().unwrap_or(DEFAULT_DIALOGS_PATH));
    let dialogs = Dialogs::load(&dialogs_path, default_language).await?;

    let token = config
        .bot_token()
        .context("telegram.botToken is not set")?
        .to_string();

    let state = Arc::new(BotState::new(UserRegistry::new(policy), dialogs, ocr));
    let adapter = TelegramAdapter::new(token, state);
    info!(channel = adapter.name(), "Bot is running");
    // Transport errors can embed the bot URL, token included.
    adapter
        .start()
        .await
        .map_err(|e| anyhow!(redact_sensitive_data(&format!("{e:#}"))))
}

async fn start_logging(config: &SnapTextConfig) -> Result<()> {
    let logging = config.logging();
    let dir = PathBuf::from(logging.dir.as_deref().unwrap_or(DEFAULT_LOG_DIR));
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    init_logger(
        &dir,
        logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL),
        logging.json.unwrap_or(false),
    );
    Ok(())
}
