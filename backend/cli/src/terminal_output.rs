//! Terminal output for the admin subcommands: status notes and the
//! config report table.

use snaptext_config::{ConfigValidationError, ValidationReport};

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";

/// Colors are off under `NO_COLOR` or a dumb terminal.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false)
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

/// Render the findings of a validation report as a three-column table.
/// Errors come first. Returns an empty string for a clean report.
pub fn render_report(report: &ValidationReport) -> String {
    let rows: Vec<[&str; 3]> = report
        .errors
        .iter()
        .map(|e| row("error", e))
        .chain(report.warnings.iter().map(|w| row("warning", w)))
        .collect();
    if rows.is_empty() {
        return String::new();
    }

    let headers = ["LEVEL", "PATH", "MESSAGE"];
    let mut widths = headers.map(|h| h.chars().count());
    for r in &rows {
        for (i, cell) in r.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&format_row(&headers, &widths));
    let rule = widths.map(|w| "-".repeat(w));
    out.push_str(&format_row(&rule.each_ref().map(String::as_str), &widths));
    for r in &rows {
        out.push_str(&format_row(r, &widths));
    }
    out
}

fn row<'a>(level: &'a str, finding: &'a ConfigValidationError) -> [&'a str; 3] {
    [level, finding.path.as_str(), finding.message.as_str()]
}

fn format_row(cells: &[&str; 3], widths: &[usize; 3]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{cell}{}", " ".repeat(w.saturating_sub(cell.chars().count()))))
        .collect();
    format!("  {}\n", padded.join("  ").trim_end())
}
