//! Config validation: collects every problem in one pass with its field path.

use crate::schema::SnapTextConfig;
use snaptext_core::Language;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &SnapTextConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_telegram(config, &mut report);
    validate_limits(config, &mut report);
    validate_ocr(config, &mut report);
    validate_dialogs(config, &mut report);
    report
}

fn validate_telegram(config: &SnapTextConfig, report: &mut ValidationReport) {
    if config.bot_token().is_none() {
        report.error("telegram.botToken", "Telegram bot token is required");
    }
}

/// The rate-limit check reads the `maxInWindow`-th newest record, so it must
/// always fit inside the retained history.
fn validate_limits(config: &SnapTextConfig, report: &mut ValidationReport) {
    let limits = config.limits();
    if limits.max_history == Some(0) {
        report.error("limits.maxHistory", "maxHistory must be >= 1");
    }
    if limits.max_in_window == Some(0) {
        report.error("limits.maxInWindow", "maxInWindow must be >= 1");
    }
    if let (Some(history), Some(window)) = (limits.max_history, limits.max_in_window) {
        if window > history {
            report.error(
                "limits.maxInWindow",
                format!("maxInWindow ({window}) must not exceed maxHistory ({history})"),
            );
        }
    }
    if let Some(secs) = limits.window_secs {
        if secs <= 0 {
            report.error("limits.windowSecs", "windowSecs must be > 0");
        } else if secs > 86_400 {
            report.warn("limits.windowSecs", format!("windowSecs {secs} is longer than a day"));
        }
    }
}

fn validate_ocr(config: &SnapTextConfig, report: &mut ValidationReport) {
    let ocr = config.ocr();
    match ocr.engine.as_deref() {
        None | Some("tesseract") => {}
        Some("vision") => {
            if ocr.vision_api_key.as_deref().map(str::is_empty).unwrap_or(true) {
                report.error("ocr.visionApiKey", "The vision engine requires an API key");
            }
        }
        Some(other) => report.error(
            "ocr.engine",
            format!("Unknown OCR engine '{other}'. Use 'tesseract' or 'vision'"),
        ),
    }
    if ocr.languages.as_deref().map(str::trim) == Some("") {
        report.error("ocr.languages", "OCR language list cannot be empty");
    }
}

fn validate_dialogs(config: &SnapTextConfig, report: &mut ValidationReport) {
    let dialogs = config.dialogs();
    if let Some(code) = dialogs.default_language.as_deref() {
        if code.parse::<Language>().is_err() {
            report.error(
                "dialogs.defaultLanguage",
                format!("Unsupported default language '{code}'"),
            );
        }
    }
}
