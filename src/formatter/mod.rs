//! Output formatters for chart-lint results.
//!
//! Provides multiple output formats:
//! - Stylish: Human-readable with colors
//! - JSON: Machine-readable format
//! - GitHub: GitHub Actions annotation format
//! - Compact: One line per message

pub mod github;
pub mod json;
pub mod stylish;

use crate::lint::LintResult;
use crate::rules::RuleInfo;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable format with colors
    #[default]
    Stylish,
    /// JSON format for machine parsing
    Json,
    /// GitHub Actions annotation format
    Github,
    /// Compact single-line format
    Compact,
}

/// Format a lint result to a string.
///
/// `color` only affects the stylish format.
pub fn format_result_to_string(result: &LintResult, format: OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Json => json::format(result),
        OutputFormat::Stylish if color => stylish::format(result),
        OutputFormat::Stylish => stylish::format_no_color(result),
        OutputFormat::Github => github::format(result),
        OutputFormat::Compact => compact_format(result),
    }
}

/// Format multiple results.
pub fn format_results(results: &[LintResult], format: OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Json => json::format_all(results),
        _ => results
            .iter()
            .map(|r| format_result_to_string(r, format, color))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Rule table for `--list-rules`: code, default severity, name, description.
pub fn format_rules(rules: &[RuleInfo]) -> String {
    rules
        .iter()
        .map(|r| {
            format!(
                "{}  {:<7}  {:<26}  {}",
                r.code,
                r.severity.as_str(),
                r.name,
                r.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compact format: one line per message.
fn compact_format(result: &LintResult) -> String {
    let mut lines: Vec<String> = result
        .parse_errors
        .iter()
        .map(|e| format!("{}: error {}", result.chart_path, e))
        .collect();

    for message in &result.messages {
        lines.push(format!(
            "{}/{}: {} {} {}",
            result.chart_path,
            message.location(),
            message.severity,
            message.code,
            message.text
        ));
    }

    if lines.is_empty() {
        format!("{}: No issues found", result.chart_path)
    } else {
        lines.join("\n")
    }
}
