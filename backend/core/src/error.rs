use thiserror::Error;

/// Top-level error type for the SnapText bot.
#[derive(Debug, Error)]
pub enum SnapError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("OCR engine error ({engine}): {message}")]
    Ocr { engine: String, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("dialogs error: {0}")]
    Dialogs(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
