//! JSON formatter for chart-lint results.
//!
//! Produces machine-readable JSON output.

use serde::Serialize;

use crate::lint::LintResult;

/// JSON output structure for a lint message.
#[derive(Serialize)]
struct JsonMessage<'a> {
    code: &'a str,
    severity: &'a str,
    message: &'a str,
    file: String,
    line: Option<u32>,
    category: String,
}

/// JSON output structure for lint results.
#[derive(Serialize)]
struct JsonOutput<'a> {
    chart_path: &'a str,
    files_checked: usize,
    error_count: usize,
    warning_count: usize,
    messages: Vec<JsonMessage<'a>>,
    parse_errors: &'a [String],
}

impl<'a> From<&'a LintResult> for JsonOutput<'a> {
    fn from(result: &'a LintResult) -> Self {
        Self {
            chart_path: &result.chart_path,
            files_checked: result.files_checked,
            error_count: result.error_count,
            warning_count: result.warning_count,
            messages: result
                .messages
                .iter()
                .map(|m| JsonMessage {
                    code: m.code.as_str(),
                    severity: m.severity.as_str(),
                    message: &m.text,
                    file: m.path.display().to_string(),
                    line: m.line,
                    category: m.category.to_string(),
                })
                .collect(),
            parse_errors: &result.parse_errors,
        }
    }
}

/// Format a lint result as JSON.
pub fn format(result: &LintResult) -> String {
    serde_json::to_string_pretty(&JsonOutput::from(result)).unwrap_or_else(|_| "{}".to_string())
}

/// Format several results as one JSON array.
pub fn format_all(results: &[LintResult]) -> String {
    let outputs: Vec<JsonOutput> = results.iter().map(JsonOutput::from).collect();
    serde_json::to_string_pretty(&outputs).unwrap_or_else(|_| "[]".to_string())
}
