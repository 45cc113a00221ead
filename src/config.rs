//! Configuration for chart-lint.
//!
//! Supports configuration from:
//! - Programmatic defaults and builder methods
//! - YAML config files (.chartlint.yaml)
//!
//! ```yaml
//! ignored: [HL3006]
//! override:
//!   error: [HL3007]
//! failure-threshold: warning
//! strict: false
//! no-fail: false
//! exclude:
//!   - "templates/tests/*"
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::types::Severity;

/// File names searched for in the working directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = [".chartlint.yaml", ".chartlint.yml"];

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid YAML for this schema.
    #[error("invalid config: {0}")]
    Parse(String),

    /// A severity name that does not exist.
    #[error("unknown severity '{0}'")]
    UnknownSeverity(String),

    /// An exclude pattern that is not a valid glob.
    #[error("invalid exclude pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Configuration for the linter.
#[derive(Debug, Clone)]
pub struct LintConfig {
    /// Rules to ignore (by code, e.g., "HL3006").
    pub ignored_rules: HashSet<String>,

    /// Severity overrides for specific rules.
    pub severity_overrides: HashMap<String, Severity>,

    /// Results at or above this severity fail the run.
    pub failure_threshold: Severity,

    /// Treat warnings as errors.
    pub strict: bool,

    /// Never fail, whatever is found.
    pub no_fail: bool,

    /// Template paths (relative to the chart root) to skip.
    pub exclude_patterns: Vec<glob::Pattern>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            ignored_rules: HashSet::new(),
            severity_overrides: HashMap::new(),
            failure_threshold: Severity::Error,
            strict: false,
            no_fail: false,
            exclude_patterns: Vec::new(),
        }
    }
}

/// On-disk shape of the YAML config.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    ignored: Vec<String>,
    #[serde(rename = "override")]
    overrides: HashMap<String, Vec<String>>,
    failure_threshold: Option<String>,
    strict: bool,
    no_fail: bool,
    exclude: Vec<String>,
}

impl LintConfig {
    /// Load config from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load config from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: ConfigFile =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut config = Self::default()
            .ignore_all(file.ignored)
            .with_strict(file.strict);
        config.no_fail = file.no_fail;

        for (level, codes) in file.overrides {
            let severity = parse_severity(&level)?;
            for code in codes {
                config.severity_overrides.insert(code, severity);
            }
        }

        if let Some(threshold) = file.failure_threshold {
            config.failure_threshold = parse_severity(&threshold)?;
        }

        for pattern in file.exclude {
            config = config.exclude(&pattern)?;
        }

        Ok(config)
    }

    /// Find and load config from standard locations.
    ///
    /// Search order:
    /// 1. .chartlint.yaml / .chartlint.yml in the current directory
    /// 2. chartlint.yaml in the user config directory
    ///
    /// A file that exists but fails to load is logged and skipped.
    pub fn find_and_load() -> Option<Self> {
        let local = CONFIG_FILE_NAMES.iter().map(PathBuf::from);
        let user = dirs::config_dir().map(|dir| dir.join("chartlint.yaml"));

        for path in local.chain(user) {
            if !path.is_file() {
                continue;
            }
            match Self::from_yaml_file(&path) {
                Ok(config) => {
                    log::debug!("Loaded config from {}", path.display());
                    return Some(config);
                }
                Err(e) => log::warn!("Ignoring {}: {}", path.display(), e),
            }
        }

        None
    }

    /// Add a rule to ignore.
    pub fn ignore(mut self, rule: impl Into<String>) -> Self {
        self.ignored_rules.insert(rule.into());
        self
    }

    /// Add multiple rules to ignore.
    pub fn ignore_all(mut self, rules: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for rule in rules {
            self.ignored_rules.insert(rule.into());
        }
        self
    }

    /// Override severity for a specific rule.
    pub fn with_severity(mut self, rule: impl Into<String>, severity: Severity) -> Self {
        self.severity_overrides.insert(rule.into(), severity);
        self
    }

    /// Set the failure threshold.
    pub fn with_threshold(mut self, threshold: Severity) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Enable strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Skip templates matching a glob such as `templates/tests/*`.
    pub fn exclude(mut self, pattern: &str) -> Result<Self, ConfigError> {
        let glob = glob::Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        self.exclude_patterns.push(glob);
        Ok(self)
    }

    /// Check if a rule is ignored.
    pub fn is_rule_ignored(&self, code: &str) -> bool {
        self.ignored_rules.contains(code)
    }

    /// Get the effective severity for a rule.
    pub fn effective_severity(&self, code: &str, default: Severity) -> Severity {
        if let Some(&override_severity) = self.severity_overrides.get(code) {
            override_severity
        } else if self.strict && default == Severity::Warning {
            Severity::Error
        } else {
            default
        }
    }

    /// Check if a severity should be reported at all.
    pub fn should_report(&self, severity: Severity) -> bool {
        severity != Severity::Ignore
    }

    /// Check if a template path is excluded.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude_patterns.iter().any(|p| p.matches(path))
    }
}

fn parse_severity(s: &str) -> Result<Severity, ConfigError> {
    Severity::parse(s).ok_or_else(|| ConfigError::UnknownSeverity(s.to_string()))
}
