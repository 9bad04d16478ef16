//! `${VAR_NAME}` substitution in config string values.
//!
//! Only uppercase `[A-Z_][A-Z0-9_]*` names are matched. `$${VAR}` is an escape and
//! produces the literal text `${VAR}`.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

/// Matches `${VAR}` and the escaped form `$${VAR}`.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references from the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute env vars using a provided map.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<String> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            }
        }
    });

    if let Some(var_name) = missing {
        bail!(MissingEnvVarError { var_name, config_path: path.to_string() });
    }
    Ok(substituted.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_bot_token() {
        let v = json!({"telegram": {"botToken": "${TELEGRAM_BOT_TOKEN}"}});
        let result = resolve_env_vars_with(&v, &env(&[("TELEGRAM_BOT_TOKEN", "123:abc")])).unwrap();
        assert_eq!(result["telegram"]["botToken"], "123:abc");
    }

    #[test]
    fn error_names_var_and_path() {
        let v = json!({"ocr": {"visionApiKey": "${MISSING_KEY}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err().to_string();
        assert!(err.contains("MISSING_KEY"));
        assert!(err.contains("ocr.visionApiKey"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"key": "$${HOME_DIR}/x"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["key"], "${HOME_DIR}/x");
    }

    #[test]
    fn non_strings_pass_through() {
        let v = json!({"limits": {"maxHistory": 10}, "list": ["plain"]});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result, v);
    }
}
