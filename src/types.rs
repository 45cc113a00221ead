//! Core types for chart-lint.
//!
//! These types provide the foundation for rule violations and severity levels:
//! - `Severity` - Rule violation severity levels
//! - `RuleCode` - Rule identifiers (e.g., "HL3006")
//! - `RuleCategory` - Categories of rules
//! - `LintMessage` - A single diagnostic appended to the sink

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

/// Severity levels for lint messages.
///
/// Ordered from most severe to least severe:
/// `Error > Warning > Info > Ignore`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    /// Issues that break rendering or installation
    Error,
    /// Issues that usually produce wrong output
    #[default]
    Warning,
    /// Informational suggestions
    Info,
    /// Ignored (rule disabled)
    Ignore,
}

impl Severity {
    /// Parse a severity from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "info" => Some(Self::Info),
            "ignore" | "none" | "off" => Some(Self::Ignore),
            _ => None,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Ignore => "ignore",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Error => 3,
            Self::Warning => 2,
            Self::Info => 1,
            Self::Ignore => 0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Rule categories for organizing lint rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    /// Chart layout rules (HL1xxx)
    Structure,
    /// Template rules (HL3xxx)
    Template,
}

impl RuleCategory {
    /// Get the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Structure => "Chart Structure",
            Self::Template => "Template",
        }
    }

    /// Determine category from rule code.
    pub fn from_code(code: &str) -> Option<Self> {
        if code.starts_with("HL1") {
            Some(Self::Structure)
        } else if code.starts_with("HL3") {
            Some(Self::Template)
        } else {
            None
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A rule code identifier (e.g., "HL1001", "HL3006").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleCode(pub String);

impl RuleCode {
    /// Create a new rule code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the category for this rule.
    pub fn category(&self) -> Option<RuleCategory> {
        RuleCategory::from_code(&self.0)
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RuleCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RuleCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A diagnostic produced by a rule and appended to the [`Linter`] sink.
///
/// [`Linter`]: crate::support::Linter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintMessage {
    /// The rule code that was violated.
    pub code: RuleCode,
    /// The severity of the violation.
    pub severity: Severity,
    /// A human-readable message describing the violation.
    pub text: String,
    /// The file the message is about (relative to chart root).
    pub path: PathBuf,
    /// The line number (1-indexed), when the message is about a single line.
    pub line: Option<u32>,
    /// The rule category.
    pub category: RuleCategory,
}

impl LintMessage {
    /// Create a new lint message.
    pub fn new(
        code: impl Into<RuleCode>,
        severity: Severity,
        text: impl Into<String>,
        path: impl Into<PathBuf>,
        line: Option<u32>,
    ) -> Self {
        let code = code.into();
        let category = code.category().unwrap_or(RuleCategory::Template);
        Self {
            code,
            severity,
            text: text.into(),
            path: path.into(),
            line,
            category,
        }
    }

    /// `path` or `path:line`, as shown by the formatters.
    pub fn location(&self) -> String {
        match self.line {
            Some(line) => format!("{}:{}", self.path.display(), line),
            None => self.path.display().to_string(),
        }
    }
}

impl fmt::Display for LintMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.severity.as_str().to_uppercase(),
            self.location(),
            self.text,
            self.code
        )
    }
}
