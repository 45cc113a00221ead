//! Quoting check for substitutions emitted as YAML values.
//!
//! A substitution rendered into a YAML value without quotes is parsed by type:
//! a release name like `1e3` or a tag like `1.10` turns into a number, `no`
//! turns into a boolean. A value is safe when it is a double-quoted scalar,
//! or when its only substitution ends with the `quote`/`squote` helper.
//!
//! The check works on one line at a time:
//!
//! ```text
//! key: {{ .Values.tag }}                  unquoted (HL3006)
//! key: {{ .Values.tag | quote }}          ok
//! key: "{{ .Values.a }}-{{ .Values.b }}"  ok
//! key: {{ .Values.a }}-{{ .Values.b }}    unwrapped (HL3007)
//! ```

use thiserror::Error;

use crate::parser::template::{Substitution, scan_line};
use crate::rules::{UNQUOTED_SUBSTITUTION, UNWRAPPED_SUBSTITUTIONS};

/// Pipeline stages that render their input as a quoted string.
pub const QUOTE_HELPERS: [&str; 2] = ["quote", "squote"];

/// Why a line failed the quoting check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    /// A single substitution is emitted bare.
    #[error(
        "templates: \"{template}\". Quote the value or use the sprig \"quote\" function: {found} -> {suggestion}"
    )]
    Unquoted {
        template: String,
        found: String,
        suggestion: String,
    },

    /// Several substitutions form one value that is not wrapped in quotes.
    #[error("templates: \"{template}\". Wrap your substitution functions in quotes: {found} -> {suggestion}")]
    Unwrapped {
        template: String,
        found: String,
        suggestion: String,
    },
}

impl QuoteError {
    /// Rule code reported for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unquoted { .. } => UNQUOTED_SUBSTITUTION,
            Self::Unwrapped { .. } => UNWRAPPED_SUBSTITUTIONS,
        }
    }

    /// The value as written on the line.
    pub fn found(&self) -> &str {
        match self {
            Self::Unquoted { found, .. } | Self::Unwrapped { found, .. } => found,
        }
    }

    /// Suggested replacement for [`QuoteError::found`].
    pub fn suggestion(&self) -> &str {
        match self {
            Self::Unquoted { suggestion, .. } | Self::Unwrapped { suggestion, .. } => suggestion,
        }
    }
}

/// Check one line of the template named `template`.
pub fn validate_quotes(template: &str, line: &str) -> Result<(), QuoteError> {
    let mut subs = scan_line(line);
    let code_end = comment_start(line, &subs).unwrap_or(line.len());
    subs.retain(|s| s.end <= code_end);
    if subs.is_empty() {
        return Ok(());
    }
    let code = &line[..code_end];

    // Lines without a key or list marker are control flow, includes or
    // block-scalar content, none of which is a YAML value on its own.
    let Some(start) = value_start(code, &subs) else {
        return Ok(());
    };
    let value = code[start..].trim_end();
    let end = start + value.len();
    let first_in_value = subs
        .iter()
        .position(|s| s.start >= start)
        .unwrap_or(subs.len());
    let in_value = &subs[first_in_value..];

    match in_value {
        [] => Ok(()),
        [single] => {
            let helper_quoted = single
                .final_stage()
                .is_some_and(|stage| QUOTE_HELPERS.contains(&stage));
            if helper_quoted || is_double_quoted(code, start, end, in_value) {
                return Ok(());
            }
            let suggestion = if single.source(code) == value {
                with_quote_helper(single)
            } else {
                format!("\"{}\"", value)
            };
            Err(QuoteError::Unquoted {
                template: template.to_string(),
                found: value.to_string(),
                suggestion,
            })
        }
        _ => {
            if is_double_quoted(code, start, end, in_value) {
                return Ok(());
            }
            Err(QuoteError::Unwrapped {
                template: template.to_string(),
                found: value.to_string(),
                suggestion: format!("\"{}\"", value),
            })
        }
    }
}

/// Byte offset where the value portion of `line` starts, after any list
/// markers and the key separator. `None` when the line has neither.
fn value_start(line: &str, subs: &[Substitution]) -> Option<usize> {
    let mut idx = skip_whitespace(line, 0);
    let mut has_prefix = false;

    while line[idx..].starts_with('-') && line[idx + 1..].starts_with(char::is_whitespace) {
        idx = skip_whitespace(line, idx + 1);
        has_prefix = true;
    }

    if let Some(colon) = find_key_separator(line, idx, subs) {
        idx = skip_whitespace(line, colon + 1);
        has_prefix = true;
    }

    has_prefix.then_some(idx)
}

fn skip_whitespace(line: &str, from: usize) -> usize {
    let rest = &line[from..];
    from + (rest.len() - rest.trim_start().len())
}

/// Positions and bytes of `line[from..]` lying outside every substitution.
fn literal_bytes<'a>(
    line: &'a str,
    from: usize,
    subs: &'a [Substitution],
) -> impl Iterator<Item = (usize, u8)> + 'a {
    line.bytes()
        .enumerate()
        .skip(from)
        .filter(move |(i, _)| !subs.iter().any(|s| s.start <= *i && *i < s.end))
}

/// Start of a trailing YAML comment, ignoring `#` inside double quotes.
fn comment_start(line: &str, subs: &[Substitution]) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, b) in literal_bytes(line, 0, subs) {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_quotes => escaped = true,
            b'"' => in_quotes = !in_quotes,
            b'#' if !in_quotes && (i == 0 || bytes[i - 1].is_ascii_whitespace()) => {
                return Some(i);
            }
            _ => {}
        }
    }

    None
}

/// First `:` that ends a mapping key: outside substitutions and
/// double-quoted text, followed by whitespace or the end of the line.
fn find_key_separator(line: &str, from: usize, subs: &[Substitution]) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, b) in literal_bytes(line, from, subs) {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_quotes => escaped = true,
            b'"' => in_quotes = !in_quotes,
            b':' if !in_quotes && matches!(bytes.get(i + 1), None | Some(b' ' | b'\t')) => {
                return Some(i);
            }
            _ => {}
        }
    }

    None
}

/// Whether `line[start..end]` is one double-quoted scalar holding every
/// substitution in `subs`.
fn is_double_quoted(line: &str, start: usize, end: usize, subs: &[Substitution]) -> bool {
    let value = &line[start..end];
    if value.len() < 2 || !value.starts_with('"') || !value.ends_with('"') {
        return false;
    }

    let close = end - 1;
    let (Some(first), Some(last)) = (subs.first(), subs.last()) else {
        return false;
    };
    if first.start <= start || last.end > close {
        return false;
    }

    // literal text between the quotes must not end the scalar early
    let mut escaped = false;
    for (_, b) in literal_bytes(line, start + 1, subs).take_while(|(i, _)| *i < close) {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' => escaped = true,
            b'"' => return false,
            _ => {}
        }
    }

    // `\"` at the end escapes the closing quote
    !escaped
}

/// `{{ x }}` -> `{{ x | quote }}`, keeping trim markers.
fn with_quote_helper(sub: &Substitution) -> String {
    format!(
        "{{{{{} {} | quote {}}}}}",
        if sub.trim_left { "-" } else { "" },
        sub.content,
        if sub.trim_right { "-" } else { "" },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = "testTemplate.yaml";

    fn assert_unquoted(line: &str) {
        match validate_quotes(TEMPLATE, line) {
            Err(err @ QuoteError::Unquoted { .. }) => {
                assert!(
                    err.to_string().contains("use the sprig \"quote\" function"),
                    "{}",
                    err
                );
            }
            other => panic!("validate_quotes({:?}) = {:?}, expected Unquoted", line, other),
        }
    }

    fn assert_unwrapped(line: &str) {
        match validate_quotes(TEMPLATE, line) {
            Err(err @ QuoteError::Unwrapped { .. }) => {
                assert!(
                    err.to_string().contains("Wrap your substitution functions in quotes"),
                    "{}",
                    err
                );
            }
            other => panic!("validate_quotes({:?}) = {:?}, expected Unwrapped", line, other),
        }
    }

    fn assert_ok(line: &str) {
        if let Err(err) = validate_quotes(TEMPLATE, line) {
            panic!("validate_quotes({:?}) failed: {}", line, err);
        }
    }

    #[test]
    fn test_single_bare_substitution() {
        for line in [
            "foo: {{.Release.Service }}",
            "foo:  {{.Release.Service }}",
            "- {{.Release.Service }}",
            "foo: {{default 'Never' .restart_policy}}",
            "-  {{.Release.Service }} ",
        ] {
            assert_unquoted(line);
        }
    }

    #[test]
    fn test_single_protected_substitution() {
        for line in [
            "foo: {{.Release.Service | quote }}",
            "foo:  {{.Release.Service | quote }}",
            "- {{.Release.Service | quote }}",
            "foo: {{default 'Never' .restart_policy | quote }}",
            "foo: \"{{ .Release.Service }}\"",
            "foo:  {{.Release.Service | squote }}",
            "  name: \"{{ .Values.name }}\"   ",
        ] {
            assert_ok(line);
        }
    }

    #[test]
    fn test_multiple_wrapped_substitutions() {
        for line in [
            "foo: \"{{ .Release.Service }} {{ .Foo.Bar }}\"",
            "foo: \"{{ default 'Never' .Release.Service }} {{ .Foo.Bar }}\"",
            "- \"{{ .a }}-{{ .b }}-{{ .c }}\"",
            "image: \"{{ .Values.image.repository }}:{{ .Values.image.tag }}\"",
        ] {
            assert_ok(line);
        }
    }

    #[test]
    fn test_multiple_unwrapped_substitutions() {
        for line in [
            "foo: {{.Release.Service }}-{{ .Release.Bar }}",
            "foo: {{.Release.Service }} {{ .Release.Bar }}",
            "- {{.Release.Service }}-{{ .Release.Bar }}",
            "- {{.Release.Service }}-{{ .Release.Bar }} {{ .Release.Baz }}",
            "foo: {{.Release.Service | default }}-{{ .Release.Bar }}",
        ] {
            assert_unwrapped(line);
        }
    }

    #[test]
    fn test_quote_helpers_do_not_protect_composite_values() {
        assert_unwrapped("foo: {{ .a | quote }}-{{ .b | quote }}");
        assert_unwrapped("foo: {{ .a }}-{{ .b | squote }}");
    }

    #[test]
    fn test_partially_quoted_composite_value() {
        assert_unwrapped("foo: \"{{ .a }}\"-{{ .b }}");
        assert_unwrapped("foo: \"{{ .a }}\" \"{{ .b }}\"");
        assert_unwrapped("foo: {{ .a }}-\"{{ .b }}\"");
    }

    #[test]
    fn test_escaped_closing_quote_leaves_value_open() {
        assert_unquoted("foo: \"{{ .a }}\\\"");
        assert_unwrapped("foo: \"{{ .a }}-{{ .b }}\\\"");
        assert_ok("foo: \"{{ .a }}\\\\\"");
        assert_ok("foo: \"say \\\"{{ .a }}\\\"\"");
    }

    #[test]
    fn test_single_substitution_inside_literal_text() {
        assert_ok("url: \"http://{{ .Values.host }}/path\"");
        let err = validate_quotes(TEMPLATE, "image: {{ .Values.repo }}:latest").unwrap_err();
        assert!(matches!(err, QuoteError::Unquoted { .. }));
        assert_eq!(err.suggestion(), "\"{{ .Values.repo }}:latest\"");
    }

    #[test]
    fn test_helper_not_in_final_stage() {
        assert_unquoted("foo: {{ .Values.x | quote | upper }}");
        assert_ok("foo: {{ .Values.x | upper | quote }}");
    }

    #[test]
    fn test_lines_without_substitutions() {
        assert_ok("apiVersion: v1");
        assert_ok("");
        assert_ok("  - name: http");
    }

    #[test]
    fn test_structural_lines_are_skipped() {
        assert_ok("{{- if .Values.enabled }}");
        assert_ok("{{ include \"mychart.labels\" . | nindent 4 }}");
        assert_ok("    {{- toYaml .Values.resources | nindent 12 }}");
        assert_ok("{{ .a }}-{{ .b }}");
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_ok("# foo: {{ .Values.x }}");
        assert_ok("foo: bar # {{ .Values.x }}");
        assert_ok("foo: {{/* note */}}");
    }

    #[test]
    fn test_substitution_as_key() {
        assert_unquoted("{{ $key }}: {{ $value }}");
        assert_ok("{{ $key }}: {{ $value | quote }}");
        assert_ok("- {{ .Values.name }}:");
    }

    #[test]
    fn test_nested_key_after_list_marker() {
        assert_unquoted("  - name: {{ .Values.name }}");
        assert_ok("  - name: {{ .Values.name | quote }}");
        assert_ok("  - url: \"http://{{ .Values.host }}/x\"");
    }

    #[test]
    fn test_suggestions() {
        let err = validate_quotes(TEMPLATE, "foo: {{.Release.Service }}").unwrap_err();
        assert_eq!(err.code(), "HL3006");
        assert_eq!(err.found(), "{{.Release.Service }}");
        assert_eq!(err.suggestion(), "{{ .Release.Service | quote }}");

        let err = validate_quotes(TEMPLATE, "foo: {{- .a -}}").unwrap_err();
        assert_eq!(err.suggestion(), "{{- .a | quote -}}");

        let err = validate_quotes(TEMPLATE, "foo: {{ .a }}-{{ .b }} ").unwrap_err();
        assert_eq!(err.code(), "HL3007");
        assert_eq!(err.found(), "{{ .a }}-{{ .b }}");
        assert_eq!(err.suggestion(), "\"{{ .a }}-{{ .b }}\"");
    }

    #[test]
    fn test_error_names_template() {
        let err = validate_quotes("t.yaml", "foo: {{ .a }}").unwrap_err();
        assert!(err.to_string().starts_with("templates: \"t.yaml\"."));
    }

    #[test]
    fn test_idempotent() {
        for line in [
            "foo: {{.Release.Service }}",
            "foo: {{.Release.Service | quote }}",
            "foo: {{ .a }}-{{ .b }}",
        ] {
            assert_eq!(validate_quotes(TEMPLATE, line), validate_quotes(TEMPLATE, line));
        }
    }
}
