//! Localized dialog text.
//!
//! Dialogs live in a JSON tree whose leaves are objects keyed by language code:
//!
//! ```json
//! { "greetings": { "en": "Hello", "ru": "Привет" },
//!   "Error": { "noPhoto": { "en": "...", "ru": "..." } } }
//! ```
//!
//! A lookup walks a fixed key path and then picks the requested language,
//! falling back to the default language when that translation is missing.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use snaptext_core::Language;
use tracing::{info, warn};

/// Dialogs shipped with the binary, used when no file is configured or found.
pub const BUNDLED_DIALOGS: &str = include_str!("../../../config/dialogs.json");

pub const GREETINGS: &[&str] = &["greetings"];
pub const HELP: &[&str] = &["help"];
pub const INFO: &[&str] = &["info"];
pub const HINT: &[&str] = &["hint"];
pub const SELECT_LANGUAGE: &[&str] = &["selectLanguage"];
pub const LANGUAGES_BUTTONS: &[&str] = &["languagesButtons"];
pub const ERROR_NO_PHOTO: &[&str] = &["Error", "noPhoto"];
pub const ERROR_TOO_MANY_PHOTOS: &[&str] = &["Error", "tooManyPhotos"];
pub const ERROR_EMPTY_HISTORY: &[&str] = &["Error", "emptyHistory"];
pub const ERROR_OCR_FAILED: &[&str] = &["Error", "ocrFailed"];

const OCR_FAILED_FALLBACK: &str = "Sorry, I could not read this photo.";

#[derive(Debug, Clone)]
pub struct Dialogs {
    tree: Value,
    default_language: Language,
}

impl Dialogs {
    pub fn from_json_str(raw: &str, default_language: Language) -> Result<Self> {
        let tree: Value = serde_json::from_str(raw).context("Failed to parse dialogs JSON")?;
        Ok(Self { tree, default_language })
    }

    /// The dialogs compiled into the binary.
    pub fn bundled() -> Self {
        let tree = serde_json::from_str(BUNDLED_DIALOGS).unwrap_or(Value::Null);
        Self { tree, default_language: Language::En }
    }

    /// Load dialogs from `path`, using the bundled set when the file is absent.
    pub async fn load(path: &Path, default_language: Language) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Dialogs file not found; using bundled dialogs");
            return Ok(Self { default_language, ..Self::bundled() });
        }
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read dialogs file: {}", path.display()))?;
        let dialogs = Self::from_json_str(&raw, default_language)
            .with_context(|| format!("Invalid dialogs file: {}", path.display()))?;
        info!(path = %path.display(), "Loaded dialogs");
        Ok(dialogs)
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    /// Text at `path` in `language`, else in the default language.
    pub fn lookup(&self, language: Language, path: &[&str]) -> Option<String> {
        let mut node = &self.tree;
        for key in path {
            node = node.get(key)?;
        }
        node.get(language.code())
            .and_then(Value::as_str)
            .or_else(|| node.get(self.default_language.code()).and_then(Value::as_str))
            .map(str::to_string)
    }

    fn text(&self, language: Language, path: &[&str]) -> String {
        self.lookup(language, path).unwrap_or_default()
    }

    pub fn greeting(&self, language: Language) -> String {
        self.text(language, GREETINGS)
    }

    pub fn help(&self, language: Language) -> String {
        self.text(language, HELP)
    }

    pub fn info(&self, language: Language) -> String {
        self.text(language, INFO)
    }

    pub fn hint(&self, language: Language) -> String {
        self.text(language, HINT)
    }

    pub fn select_language(&self, language: Language) -> String {
        self.text(language, SELECT_LANGUAGE)
    }

    /// Keyboard label for `language`, written in that language.
    pub fn language_button(&self, language: Language) -> String {
        self.text(language, LANGUAGES_BUTTONS)
    }

    pub fn error_no_photo(&self, language: Language) -> String {
        self.text(language, ERROR_NO_PHOTO)
    }

    pub fn error_too_many_photos(&self, language: Language) -> String {
        self.text(language, ERROR_TOO_MANY_PHOTOS)
    }

    pub fn error_empty_history(&self, language: Language) -> String {
        self.text(language, ERROR_EMPTY_HISTORY)
    }

    pub fn error_ocr_failed(&self, language: Language) -> String {
        self.lookup(language, ERROR_OCR_FAILED)
            .unwrap_or_else(|| OCR_FAILED_FALLBACK.to_string())
    }
}
