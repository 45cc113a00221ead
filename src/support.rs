//! The message sink shared by every rule run against a chart.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::rules::default_severity;
use crate::types::LintMessage;

/// Collects lint messages for one chart, in the order rules report them.
///
/// Messages are only ever appended. Callers that lint several charts in
/// parallel use one `Linter` per chart.
#[derive(Debug, Clone)]
pub struct Linter {
    /// Root directory of the chart being linted.
    pub chart_dir: PathBuf,
    /// Messages in discovery order.
    pub messages: Vec<LintMessage>,
}

impl Linter {
    pub fn new(chart_dir: impl Into<PathBuf>) -> Self {
        Self {
            chart_dir: chart_dir.into(),
            messages: Vec::new(),
        }
    }

    /// Directory holding the chart's templates.
    pub fn templates_dir(&self) -> PathBuf {
        self.chart_dir.join("templates")
    }

    /// Record the outcome of one rule check.
    ///
    /// On `Err`, appends a message with the rule's default severity and the
    /// error text. Returns whether the check passed.
    pub fn run_linter_rule<E: Display>(
        &mut self,
        code: &str,
        path: impl AsRef<Path>,
        line: Option<u32>,
        result: Result<(), E>,
    ) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                self.add(LintMessage::new(
                    code,
                    default_severity(code),
                    err.to_string(),
                    path.as_ref(),
                    line,
                ));
                false
            }
        }
    }

    /// Append a message.
    pub fn add(&mut self, message: LintMessage) {
        self.messages.push(message);
    }
}
