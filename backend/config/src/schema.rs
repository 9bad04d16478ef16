//! SnapText configuration schema.
//!
//! Every field is optional on disk; `defaults::apply_all_defaults` fills in the
//! gaps after loading.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration, read from `config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapTextConfig {
    /// Telegram transport settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramConfig>,

    /// OCR engine selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr: Option<OcrConfig>,

    /// History retention and rate limiting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<LimitsConfig>,

    /// Localized dialog strings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialogs: Option<DialogsConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrConfig {
    /// "tesseract" | "vision"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Tesseract language spec, e.g. "eng+rus"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tesseract_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision_base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_history: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_in_window: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_secs: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// Emit JSON on the console as well as in the log file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl SnapTextConfig {
    pub fn bot_token(&self) -> Option<&str> {
        self.telegram
            .as_ref()
            .and_then(|t| t.bot_token.as_deref())
            .filter(|t| !t.is_empty())
    }

    pub fn ocr(&self) -> OcrConfig {
        self.ocr.clone().unwrap_or_default()
    }

    pub fn limits(&self) -> LimitsConfig {
        self.limits.clone().unwrap_or_default()
    }

    pub fn dialogs(&self) -> DialogsConfig {
        self.dialogs.clone().unwrap_or_default()
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }
}
