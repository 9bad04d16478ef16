//! Log Redaction Layer
//!
//! Scrubs Telegram bot tokens, API keys and bearer tokens from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static BOT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{6,}:[A-Za-z0-9_-]{30,}").unwrap());
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9_-]{20,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    // Bot tokens also appear inside Telegram file URLs (`/file/bot<token>/...`).
    let redacted = BOT_TOKEN_RE.replace_all(input, "[REDACTED_BOT_TOKEN]");
    API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_bot_token_in_file_url() {
        let raw = "GET https://api.telegram.org/file/bot123456789:AAEhBOweik6ad9r_QXMENQjcrGbqCr4K-ms/photos/file_1.jpg";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("AAEhBOweik6ad9r_QXMENQjcrGbqCr4K-ms"));
        assert!(clean.contains("photos/file_1.jpg"));
    }

    #[test]
    fn test_redacts_api_keys() {
        let raw = "vision call with Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9 and sk-abcdefghijklmnopqrstuvwx";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
        assert!(!clean.contains("sk-abcdefghijklmnopqrstuvwx"));
    }

    #[test]
    fn test_leaves_plain_text() {
        assert_eq!(redact_sensitive_data("recognized 42 chars"), "recognized 42 chars");
    }
}
