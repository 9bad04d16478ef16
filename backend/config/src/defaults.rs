//! Config defaults: fills unset fields after loading.

use snaptext_core::{MAX_HISTORY, MAX_IN_WINDOW, WINDOW_SECONDS};

use crate::schema::{DialogsConfig, LimitsConfig, LoggingConfig, OcrConfig, SnapTextConfig};

pub const DEFAULT_OCR_ENGINE: &str = "tesseract";
pub const DEFAULT_OCR_LANGUAGES: &str = "eng+rus";
pub const DEFAULT_TESSERACT_PATH: &str = "tesseract";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";
pub const DEFAULT_VISION_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_DIALOGS_PATH: &str = "config/dialogs.json";
pub const DEFAULT_DIALOG_LANGUAGE: &str = "en";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: SnapTextConfig) -> SnapTextConfig {
    let config = apply_ocr_defaults(config);
    let config = apply_limit_defaults(config);
    let config = apply_dialog_defaults(config);
    apply_logging_defaults(config)
}

fn apply_ocr_defaults(mut config: SnapTextConfig) -> SnapTextConfig {
    let ocr = config.ocr.get_or_insert_with(OcrConfig::default);
    ocr.engine.get_or_insert_with(|| DEFAULT_OCR_ENGINE.to_string());
    ocr.languages.get_or_insert_with(|| DEFAULT_OCR_LANGUAGES.to_string());
    ocr.tesseract_path.get_or_insert_with(|| DEFAULT_TESSERACT_PATH.to_string());
    ocr.vision_model.get_or_insert_with(|| DEFAULT_VISION_MODEL.to_string());
    ocr.vision_base_url.get_or_insert_with(|| DEFAULT_VISION_BASE_URL.to_string());
    config
}

fn apply_limit_defaults(mut config: SnapTextConfig) -> SnapTextConfig {
    let limits = config.limits.get_or_insert_with(LimitsConfig::default);
    limits.max_history.get_or_insert(MAX_HISTORY);
    limits.max_in_window.get_or_insert(MAX_IN_WINDOW);
    limits.window_secs.get_or_insert(WINDOW_SECONDS);
    config
}

fn apply_dialog_defaults(mut config: SnapTextConfig) -> SnapTextConfig {
    let dialogs = config.dialogs.get_or_insert_with(DialogsConfig::default);
    dialogs.path.get_or_insert_with(|| DEFAULT_DIALOGS_PATH.to_string());
    dialogs.default_language.get_or_insert_with(|| DEFAULT_DIALOG_LANGUAGE.to_string());
    config
}

fn apply_logging_defaults(mut config: SnapTextConfig) -> SnapTextConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.dir.get_or_insert_with(|| DEFAULT_LOG_DIR.to_string());
    logging.json.get_or_insert(false);
    config
}
