//! GitHub Actions formatter for chart-lint results.
//!
//! Produces GitHub Actions workflow command annotations.
//! See: https://docs.github.com/en/actions/reference/workflow-commands-for-github-actions

use std::path::Path;

use crate::lint::LintResult;
use crate::types::Severity;

/// Format a lint result as GitHub Actions annotations.
pub fn format(result: &LintResult) -> String {
    let mut output = String::new();

    for error in &result.parse_errors {
        output.push_str(&format!(
            "::error file={},title=Parse Error::{}\n",
            escape_property(&result.chart_path),
            escape_message(error)
        ));
    }

    for message in &result.messages {
        let level = match message.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "notice",
            Severity::Ignore => continue,
        };

        let file = Path::new(&result.chart_path).join(&message.path);
        let file = escape_property(&file.display().to_string());
        let text = escape_message(&message.text);

        // ::level file=path[,line=N],title=CODE::MESSAGE
        let annotation = match message.line {
            Some(line) => format!(
                "::{} file={},line={},title={}::{}\n",
                level, file, line, message.code, text
            ),
            None => format!("::{} file={},title={}::{}\n", level, file, message.code, text),
        };

        output.push_str(&annotation);
    }

    if !result.messages.is_empty() || !result.parse_errors.is_empty() {
        let total = result.messages.len() + result.parse_errors.len();
        let errors = result.error_count + result.parse_errors.len();
        let summary = format!(
            "chart-lint found {} {} in {} ({} errors, {} warnings)",
            total,
            if total == 1 { "issue" } else { "issues" },
            result.chart_path,
            errors,
            result.warning_count
        );

        let level = if errors > 0 { "error" } else { "warning" };
        output.push_str(&format!("::{}::{}\n", level, escape_message(&summary)));
    }

    output
}

/// Escape annotation data. GitHub Actions uses % encoding.
fn escape_message(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape an annotation property value, which also reserves `:` and `,`.
fn escape_property(value: &str) -> String {
    escape_message(value).replace(':', "%3A").replace(',', "%2C")
}
