//! Parsers for chart templates.
//!
//! Go templates are only tokenized here, never evaluated:
//! - line scanning for substitution boundaries
//! - structural checks (block balance, unclosed actions, unknown functions)

pub mod template;

pub use template::{
    CommentSpan, ParseErrorKind, ParsedTemplate, Substitution, TemplateParseError,
    parse_template, scan_line,
};
