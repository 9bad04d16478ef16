//! `check-config` and `config` subcommands.

use std::path::Path;

use anyhow::{bail, Context, Result};
use snaptext_config::{load_resolved, redact, validate, SnapTextConfig};

use crate::terminal_output::{note_error, note_success, note_warn, render_report};
use crate::OutputFormat;

/// Validate the config at `path` and print the report. Fails when the config
/// has errors so scripts can gate on the exit status.
pub async fn check(path: &Path) -> Result<()> {
    let config = load_resolved(path).await?;
    print_report(&config, path)
}

fn print_report(config: &SnapTextConfig, path: &Path) -> Result<()> {
    let report = validate(config);

    print!("{}", render_report(&report));
    if !report.is_valid() {
        note_error(&format!("{} has {} error(s)", path.display(), report.errors.len()));
        bail!("{} is invalid", path.display());
    }
    if !report.warnings.is_empty() {
        note_warn(&format!("{} warning(s)", report.warnings.len()));
    }
    note_success(&format!("{} is valid", path.display()));
    Ok(())
}

/// Print the effective config with secrets masked.
pub async fn show(path: &Path, format: OutputFormat) -> Result<()> {
    let config = load_resolved(path).await?;
    println!("{}", render_redacted(&config, format)?);
    Ok(())
}

fn render_redacted(config: &SnapTextConfig, format: OutputFormat) -> Result<String> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    let masked = redact(&value);
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&masked).context("Failed to render JSON"),
        OutputFormat::Yaml => serde_yaml::to_string(&masked).context("Failed to render YAML"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_with_token(token: &str) -> SnapTextConfig {
        snaptext_config::prepare(json!({"telegram": {"botToken": token}}), None).unwrap()
    }

    #[test]
    fn redacted_output_hides_token() {
        let config = config_with_token("123456:ABCDEFGHIJKLMNOPQRSTUVWXYZabcdef");
        for format in [OutputFormat::Json, OutputFormat::Yaml] {
            let out = render_redacted(&config, format).unwrap();
            assert!(out.contains("1234***"));
            assert!(!out.contains("ABCDEFGHIJ"));
        }
    }

    #[test]
    fn json_output_is_camel_case() {
        let out = render_redacted(&config_with_token("123456:abc"), OutputFormat::Json).unwrap();
        assert!(out.contains("\"botToken\""));
        assert!(out.contains("\"maxHistory\""));
    }

    #[test]
    fn report_fails_for_missing_token() {
        let config = snaptext_config::prepare(json!({}), None).unwrap();
        assert!(print_report(&config, Path::new("config.yaml")).is_err());
    }

    #[test]
    fn report_passes_for_complete_config() {
        let config = config_with_token("123456:abc");
        assert!(print_report(&config, Path::new("config.yaml")).is_ok());
    }

    #[tokio::test]
    async fn check_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "ocr:\n  engine: abbyy\n").await.unwrap();
        assert!(check(&path).await.is_err());
    }
}
