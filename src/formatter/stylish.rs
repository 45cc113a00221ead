//! Stylish formatter for chart-lint results.
//!
//! Produces human-readable colored output similar to ESLint's stylish formatter.

use std::path::Path;

use crate::lint::LintResult;
use crate::types::{LintMessage, Severity};

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";
    pub const UNDERLINE: &str = "\x1b[4m";
}

/// Group messages by file, files in order of first appearance.
fn by_file(result: &LintResult) -> Vec<(&Path, Vec<&LintMessage>)> {
    let mut groups: Vec<(&Path, Vec<&LintMessage>)> = Vec::new();
    for message in &result.messages {
        match groups.iter_mut().find(|(path, _)| *path == message.path) {
            Some((_, messages)) => messages.push(message),
            None => groups.push((message.path.as_path(), vec![message])),
        }
    }
    groups
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => colors::RED,
        Severity::Warning => colors::YELLOW,
        Severity::Info => colors::BLUE,
        Severity::Ignore => colors::DIM,
    }
}

/// `line` column of a message; file-level messages show `-`.
fn line_column(message: &LintMessage) -> String {
    message
        .line
        .map_or_else(|| "-".to_string(), |line| line.to_string())
}

fn summary(result: &LintResult) -> Option<String> {
    let total = result.messages.len();
    if total == 0 {
        return None;
    }
    let errors = result.error_count;
    let warnings = result.warning_count;
    let infos = total - errors - warnings;

    Some(format!(
        "✖ {} {} ({} {}, {} {}, {} info)",
        total,
        if total == 1 { "problem" } else { "problems" },
        errors,
        if errors == 1 { "error" } else { "errors" },
        warnings,
        if warnings == 1 { "warning" } else { "warnings" },
        infos
    ))
}

/// Format a lint result in stylish format.
pub fn format(result: &LintResult) -> String {
    let mut output = String::new();
    let groups = by_file(result);

    if !result.parse_errors.is_empty() {
        output.push_str(&format!(
            "\n{}{}Parse Errors:{}\n",
            colors::BOLD,
            colors::RED,
            colors::RESET
        ));
        for error in &result.parse_errors {
            output.push_str(&format!("  {}error{}  {}\n", colors::RED, colors::RESET, error));
        }
        output.push('\n');
    }

    if groups.is_empty() && result.parse_errors.is_empty() {
        output.push_str(&format!(
            "{}{}{}  No issues found\n",
            colors::BOLD,
            result.chart_path,
            colors::RESET
        ));
        return output;
    }

    for (file, messages) in groups {
        output.push_str(&format!(
            "\n{}{}{}/{}{}\n",
            colors::UNDERLINE,
            colors::BOLD,
            result.chart_path,
            file.display(),
            colors::RESET
        ));

        for message in messages {
            output.push_str(&format!(
                "  {}{:>4}{}  {}{:<7}{}  {}  {}{}{}\n",
                colors::DIM,
                line_column(message),
                colors::RESET,
                severity_color(message.severity),
                message.severity.as_str(),
                colors::RESET,
                message.text,
                colors::DIM,
                message.code,
                colors::RESET,
            ));
        }
    }

    if let Some(summary) = summary(result) {
        let color = if result.has_errors() {
            colors::RED
        } else {
            colors::YELLOW
        };
        output.push_str(&format!(
            "\n{}{}{}{}\n",
            colors::BOLD,
            color,
            summary,
            colors::RESET
        ));
    }

    output
}

/// Format without colors (for non-TTY output).
pub fn format_no_color(result: &LintResult) -> String {
    let mut output = String::new();
    let groups = by_file(result);

    if !result.parse_errors.is_empty() {
        output.push_str("\nParse Errors:\n");
        for error in &result.parse_errors {
            output.push_str(&format!("  error  {}\n", error));
        }
        output.push('\n');
    }

    if groups.is_empty() && result.parse_errors.is_empty() {
        output.push_str(&format!("{}  No issues found\n", result.chart_path));
        return output;
    }

    for (file, messages) in groups {
        output.push_str(&format!("\n{}/{}\n", result.chart_path, file.display()));

        for message in messages {
            output.push_str(&format!(
                "  {:>4}  {:<7}  {}  {}\n",
                line_column(message),
                message.severity.as_str(),
                message.text,
                message.code
            ));
        }
    }

    if let Some(summary) = summary(result) {
        output.push_str(&format!("\n{}\n", summary));
    }

    output
}
