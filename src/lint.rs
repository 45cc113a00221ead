//! Main linting orchestration for chart-lint.
//!
//! Runs the template rule over a chart and applies the configuration
//! (ignored rules, overrides, strict mode, exclusions) to its messages.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::config::LintConfig;
use crate::rules::lint_templates;
use crate::support::Linter;
use crate::types::{LintMessage, Severity};

/// Result of linting a chart.
#[derive(Debug, Clone)]
pub struct LintResult {
    /// Path to the chart root.
    pub chart_path: String,
    /// Messages in discovery order.
    pub messages: Vec<LintMessage>,
    /// Problems with the chart path itself.
    pub parse_errors: Vec<String>,
    /// Number of template files checked.
    pub files_checked: usize,
    /// Number of errors.
    pub error_count: usize,
    /// Number of warnings.
    pub warning_count: usize,
}

impl LintResult {
    /// Create a new empty result.
    pub fn new(chart_path: impl Into<String>) -> Self {
        Self {
            chart_path: chart_path.into(),
            messages: Vec::new(),
            parse_errors: Vec::new(),
            files_checked: 0,
            error_count: 0,
            warning_count: 0,
        }
    }

    pub(crate) fn update_counts(&mut self) {
        self.error_count = self.count(Severity::Error);
        self.warning_count = self.count(Severity::Warning);
    }

    fn count(&self, severity: Severity) -> usize {
        self.messages.iter().filter(|m| m.severity == severity).count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Get the maximum severity in the results.
    pub fn max_severity(&self) -> Option<Severity> {
        self.messages.iter().map(|m| m.severity).max()
    }

    /// Check if the results should cause a non-zero exit.
    ///
    /// A chart that could not be linted at all always fails unless
    /// `no_fail` is set.
    pub fn should_fail(&self, config: &LintConfig) -> bool {
        if config.no_fail {
            return false;
        }
        if !self.parse_errors.is_empty() {
            return true;
        }
        self.max_severity()
            .is_some_and(|max| max != Severity::Ignore && max >= config.failure_threshold)
    }
}

/// Lint a chart directory.
pub fn lint_chart(path: &Path, config: &LintConfig) -> LintResult {
    let chart_path_str = path.display().to_string();
    let mut result = LintResult::new(&chart_path_str);

    if !path.exists() {
        result
            .parse_errors
            .push(format!("Chart path does not exist: {}", chart_path_str));
        return result;
    }

    if !path.is_dir() {
        result
            .parse_errors
            .push(format!("Chart path is not a directory: {}", chart_path_str));
        return result;
    }

    log::debug!("Linting chart {}", chart_path_str);

    let mut linter = Linter::new(path);
    result.files_checked = lint_templates(&mut linter, |p| config.is_excluded(p));

    result.messages = linter
        .messages
        .into_iter()
        .filter(|m| !config.is_rule_ignored(m.code.as_str()))
        .filter_map(|mut m| {
            m.severity = config.effective_severity(m.code.as_str(), m.severity);
            config.should_report(m.severity).then_some(m)
        })
        .collect();

    result.update_counts();

    log::debug!(
        "{}: {} files, {} errors, {} warnings",
        chart_path_str,
        result.files_checked,
        result.error_count,
        result.warning_count
    );

    result
}

/// Lint several charts in parallel; results keep the order of `paths`.
pub fn lint_charts(paths: &[PathBuf], config: &LintConfig) -> Vec<LintResult> {
    paths
        .par_iter()
        .map(|path| lint_chart(path, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_chart(dir: &Path) {
        fs::create_dir_all(dir.join("templates")).unwrap();

        fs::write(
            dir.join("Chart.yaml"),
            r#"apiVersion: v2
name: test-chart
version: 1.0.0
"#,
        )
        .unwrap();

        fs::write(
            dir.join("templates/deployment.yaml"),
            r#"apiVersion: apps/v1
kind: Deployment
metadata:
  name: {{ .Release.Name }}
  labels:
    app: "{{ .Chart.Name }}-{{ .Release.Name }}"
spec:
  replicas: {{ .Values.replicaCount | quote }}
  template:
    spec:
      containers:
        - image: {{ .Values.image.repository }}:{{ .Values.image.tag }}
"#,
        )
        .unwrap();
    }

    fn codes(result: &LintResult) -> Vec<&str> {
        result.messages.iter().map(|m| m.code.as_str()).collect()
    }

    #[test]
    fn test_lint_chart_defaults() {
        let temp_dir = TempDir::new().unwrap();
        create_test_chart(temp_dir.path());

        let result = lint_chart(temp_dir.path(), &LintConfig::default());

        assert!(result.parse_errors.is_empty());
        assert_eq!(result.files_checked, 1);
        assert_eq!(codes(&result), ["HL3006", "HL3007"]);
        assert_eq!(result.messages[0].line, Some(4));
        assert_eq!(result.messages[1].line, Some(12));
        assert_eq!(result.warning_count, 2);
        assert!(!result.should_fail(&LintConfig::default()));
    }

    #[test]
    fn test_lint_nonexistent_path() {
        let config = LintConfig::default();
        let result = lint_chart(Path::new("/nonexistent/path"), &config);

        assert_eq!(result.parse_errors.len(), 1);
        assert!(result.should_fail(&config));
    }

    #[test]
    fn test_lint_file_instead_of_dir() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("Chart.yaml");
        fs::write(&file, "name: x\n").unwrap();

        let result = lint_chart(&file, &LintConfig::default());
        assert!(result.parse_errors[0].contains("not a directory"));
    }

    #[test]
    fn test_lint_with_ignored_rules() {
        let temp_dir = TempDir::new().unwrap();
        create_test_chart(temp_dir.path());

        let config = LintConfig::default().ignore("HL3006");
        let result = lint_chart(temp_dir.path(), &config);

        assert_eq!(codes(&result), ["HL3007"]);
    }

    #[test]
    fn test_strict_mode_fails() {
        let temp_dir = TempDir::new().unwrap();
        create_test_chart(temp_dir.path());

        let config = LintConfig::default().with_strict(true);
        let result = lint_chart(temp_dir.path(), &config);

        assert_eq!(result.error_count, 2);
        assert!(result.should_fail(&config));
    }

    #[test]
    fn test_overrides_and_threshold() {
        let temp_dir = TempDir::new().unwrap();
        create_test_chart(temp_dir.path());

        let config = LintConfig::default()
            .with_severity("HL3006", Severity::Ignore)
            .with_severity("HL3007", Severity::Info)
            .with_threshold(Severity::Info);
        let result = lint_chart(temp_dir.path(), &config);

        assert_eq!(codes(&result), ["HL3007"]);
        assert_eq!(result.messages[0].severity, Severity::Info);
        assert!(result.should_fail(&config));
    }

    #[test]
    fn test_exclusions() {
        let temp_dir = TempDir::new().unwrap();
        create_test_chart(temp_dir.path());

        let config = LintConfig::default()
            .exclude("templates/deploy*")
            .unwrap();
        let result = lint_chart(temp_dir.path(), &config);

        assert_eq!(result.files_checked, 0);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn test_no_fail() {
        let mut config = LintConfig::default();
        config.no_fail = true;
        let result = lint_chart(Path::new("/nonexistent/path"), &config);
        assert!(!result.should_fail(&config));
    }

    #[test]
    fn test_lint_charts_keeps_order() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        create_test_chart(a.path());
        fs::create_dir_all(b.path().join("templates")).unwrap();

        let paths = vec![
            b.path().to_path_buf(),
            PathBuf::from("/nonexistent/path"),
            a.path().to_path_buf(),
        ];
        let results = lint_charts(&paths, &LintConfig::default());

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chart_path, b.path().display().to_string());
        assert!(results[0].messages.is_empty());
        assert_eq!(results[1].parse_errors.len(), 1);
        assert_eq!(results[2].messages.len(), 2);
    }

    #[test]
    fn test_result_counts() {
        let mut result = LintResult::new("test");
        result.messages.push(LintMessage::new(
            "HL3005",
            Severity::Error,
            "test",
            "templates/a.txt",
            None,
        ));
        result.messages.push(LintMessage::new(
            "HL3006",
            Severity::Warning,
            "test",
            "templates/b.yaml",
            Some(2),
        ));
        result.update_counts();

        assert_eq!(result.error_count, 1);
        assert_eq!(result.warning_count, 1);
        assert!(result.has_errors());
        assert_eq!(result.max_severity(), Some(Severity::Error));
    }
}
