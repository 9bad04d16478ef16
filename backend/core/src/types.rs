use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// External user identifier (the Telegram chat id).
pub type UserId = i64;

/// Interface language a user has selected for bot replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
}

impl Language {
    /// Every supported language, in keyboard order.
    pub const ALL: [Language; 2] = [Language::En, Language::Ru];

    /// Two-letter code used in commands and dialog files.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Returned when a language code is not one of [`Language::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language code '{0}'")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ru" => Ok(Language::Ru),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_language_is_english() {
        assert_eq!(Language::default(), Language::En);
    }

    #[test]
    fn test_parse_codes() {
        assert_eq!("ru".parse::<Language>().unwrap(), Language::Ru);
        assert_eq!(" EN ".parse::<Language>().unwrap(), Language::En);
        assert!("de".parse::<Language>().is_err());
    }

    #[test]
    fn test_serde_uses_codes() {
        let json = serde_json::to_string(&Language::Ru).unwrap();
        assert_eq!(json, "\"ru\"");
        let back: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(back, Language::En);
    }
}
