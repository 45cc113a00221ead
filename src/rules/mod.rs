//! Rules for chart templates.
//!
//! # Rule Categories
//!
//! - **HL1xxx**: Chart structure rules (templates directory, readable files)
//! - **HL3xxx**: Template rules (syntax, extensions, quoting)
//!
//! The validators in [`extension`] and [`quotes`] are pure functions over a
//! path or a line; [`templates`] walks a chart and feeds their failures to
//! the [`Linter`](crate::support::Linter) sink.

pub mod extension;
pub mod quotes;
pub mod templates;

use crate::types::Severity;

pub use extension::{ExtensionError, validate_extension};
pub use quotes::{QuoteError, validate_quotes};
pub use templates::{lint_templates, templates};

pub const MISSING_TEMPLATES_DIR: &str = "HL1001";
pub const UNREADABLE_TEMPLATE: &str = "HL1002";
pub const UNCLOSED_ACTION: &str = "HL3001";
pub const UNCLOSED_BLOCK: &str = "HL3002";
pub const UNEXPECTED_KEYWORD: &str = "HL3003";
pub const UNDEFINED_FUNCTION: &str = "HL3004";
pub const INVALID_EXTENSION: &str = "HL3005";
pub const UNQUOTED_SUBSTITUTION: &str = "HL3006";
pub const UNWRAPPED_SUBSTITUTIONS: &str = "HL3007";

/// Static description of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleInfo {
    /// The rule code (e.g., "HL3006").
    pub code: &'static str,
    /// Short name for the rule.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Default severity level.
    pub severity: Severity,
}

/// Every rule this crate can report.
pub const RULES: &[RuleInfo] = &[
    RuleInfo {
        code: MISSING_TEMPLATES_DIR,
        name: "missing-templates-dir",
        description: "Chart has no templates/ directory",
        severity: Severity::Warning,
    },
    RuleInfo {
        code: UNREADABLE_TEMPLATE,
        name: "unreadable-template",
        description: "Template file could not be read",
        severity: Severity::Error,
    },
    RuleInfo {
        code: UNCLOSED_ACTION,
        name: "unclosed-action",
        description: "Template has an unclosed action (missing }})",
        severity: Severity::Error,
    },
    RuleInfo {
        code: UNCLOSED_BLOCK,
        name: "unclosed-block",
        description: "Control block (if/range/with/define/block) is missing its end",
        severity: Severity::Error,
    },
    RuleInfo {
        code: UNEXPECTED_KEYWORD,
        name: "unexpected-end",
        description: "end or else appears with no open block",
        severity: Severity::Error,
    },
    RuleInfo {
        code: UNDEFINED_FUNCTION,
        name: "undefined-function",
        description: "Template calls a function the engine does not define",
        severity: Severity::Error,
    },
    RuleInfo {
        code: INVALID_EXTENSION,
        name: "invalid-template-extension",
        description: "Template file must use the .yaml or .tpl extension",
        severity: Severity::Error,
    },
    RuleInfo {
        code: UNQUOTED_SUBSTITUTION,
        name: "unquoted-substitution",
        description: "Substitution emitted as a bare YAML value; quote it or pipe it to quote",
        severity: Severity::Warning,
    },
    RuleInfo {
        code: UNWRAPPED_SUBSTITUTIONS,
        name: "unwrapped-substitutions",
        description: "Several substitutions form one value that is not wrapped in quotes",
        severity: Severity::Warning,
    },
];

/// Get a rule by code.
pub fn get_rule(code: &str) -> Option<&'static RuleInfo> {
    RULES.iter().find(|r| r.code == code)
}

/// Default severity of a rule; unknown codes are errors.
pub fn default_severity(code: &str) -> Severity {
    get_rule(code).map_or(Severity::Error, |r| r.severity)
}
