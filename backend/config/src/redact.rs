//! Config redaction: masks secrets so the effective config can be printed or logged.

use serde_json::Value;

/// Keys whose string values are secrets.
static SECRET_KEYS: &[&str] = &[
    "botToken",
    "bot_token",
    "visionApiKey",
    "vision_api_key",
    "apiKey",
    "api_key",
    "token",
    "secret",
    "password",
];

/// Redact a config JSON value, masking every secret field.
///
/// The first four characters are kept as a hint.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_secret_key(key: &str) -> bool {
    SECRET_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_secret_key(key) && !s.is_empty() => {
            let hint: String = s.chars().take(4).collect();
            if s.chars().count() > 4 {
                Value::String(format!("{hint}***"))
            } else {
                Value::String("***".to_string())
            }
        }
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}
