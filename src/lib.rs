//! # chart-lint
//!
//! A linter for the templates of a chart: the directory bundling a deployable
//! application's manifests as text templates with `{{ ... }}` substitutions.
//!
//! ## Features
//!
//! - **Extensions**: every file under `templates/` must end in `.yaml` or `.tpl`
//! - **Syntax**: unclosed actions and blocks, stray `end`/`else`, unknown functions
//! - **Quoting**: substitutions emitted as bare YAML values are flagged
//! - **Configuration**: ignored rules, severity overrides, strict mode, exclusions
//!
//! ## Example
//!
//! ```rust,no_run
//! use chart_lint::{LintConfig, lint_chart};
//! use std::path::Path;
//!
//! let result = lint_chart(Path::new("./my-chart"), &LintConfig::default());
//! for message in &result.messages {
//!     println!("{}", message);
//! }
//! ```
//!
//! ## Rules
//!
//! | Category | Code Range | Description |
//! |----------|------------|-------------|
//! | Structure | HL1xxx | templates/ directory and readable files |
//! | Templates | HL3xxx | Extensions, syntax and quoting |

pub mod cli;
pub mod config;
pub mod formatter;
pub mod lint;
pub mod parser;
pub mod rules;
pub mod support;
pub mod types;

// Re-export commonly used types and functions
pub use config::{ConfigError, LintConfig};
pub use formatter::OutputFormat;
pub use lint::{LintResult, lint_chart, lint_charts};
pub use rules::{ExtensionError, QuoteError, validate_extension, validate_quotes};
pub use support::Linter;
pub use types::{LintMessage, RuleCategory, RuleCode, Severity};
