//! Template rule: runs the extension, syntax and quoting checks over every
//! file under `templates/`.

use std::path::Path;

use walkdir::WalkDir;

use crate::parser::template::{ParseErrorKind, TemplateParseError, parse_template};
use crate::rules::extension::validate_extension;
use crate::rules::quotes::validate_quotes;
use crate::rules::{
    INVALID_EXTENSION, MISSING_TEMPLATES_DIR, UNCLOSED_ACTION, UNCLOSED_BLOCK, UNDEFINED_FUNCTION,
    UNEXPECTED_KEYWORD, UNREADABLE_TEMPLATE,
};
use crate::support::Linter;

/// Lint every template of the chart at `linter.chart_dir`.
pub fn templates(linter: &mut Linter) {
    lint_templates(linter, |_| false);
}

/// Like [`templates`], skipping files for which `is_excluded` returns true.
///
/// `is_excluded` receives the path relative to the chart root, e.g.
/// `templates/deployment.yaml`. Returns the number of files checked.
pub fn lint_templates<F>(linter: &mut Linter, is_excluded: F) -> usize
where
    F: Fn(&str) -> bool,
{
    let templates_dir = linter.templates_dir();
    if !templates_dir.is_dir() {
        linter.run_linter_rule(
            MISSING_TEMPLATES_DIR,
            "templates/",
            None,
            Err("templates/ directory not found"),
        );
        return 0;
    }

    let chart_dir = linter.chart_dir.clone();
    let mut checked = 0;

    for entry in WalkDir::new(&templates_dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(|p| relative_path(&chart_dir, p))
                    .unwrap_or_else(|| "templates/".to_string());
                log::warn!("Failed to walk {}: {}", path, err);
                linter.run_linter_rule(
                    UNREADABLE_TEMPLATE,
                    &path,
                    None,
                    Err(format!("unable to read {}: {}", path, err)),
                );
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = relative_path(&chart_dir, entry.path());
        if is_excluded(&path) {
            log::debug!("Skipping excluded template {}", path);
            continue;
        }

        checked += 1;
        lint_template_file(linter, entry.path(), &path);
    }

    checked
}

/// Run every per-file check on one template.
fn lint_template_file(linter: &mut Linter, file: &Path, path: &str) {
    log::debug!("Linting template {}", path);

    linter.run_linter_rule(INVALID_EXTENSION, path, None, validate_extension(path));

    let content = match std::fs::read_to_string(file) {
        Ok(content) => content,
        Err(err) => {
            log::warn!("Failed to read {}: {}", path, err);
            linter.run_linter_rule(
                UNREADABLE_TEMPLATE,
                path,
                None,
                Err(format!("unable to read {}: {}", path, err)),
            );
            return;
        }
    };

    let parsed = parse_template(&content, path);
    for error in &parsed.errors {
        linter.run_linter_rule(
            parse_error_code(error),
            path,
            Some(error.line),
            Err(format!("parse error in \"{}\": {}", path, error.message())),
        );
    }

    for (idx, line) in content.lines().enumerate() {
        let line_number = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        if parsed.in_comment(line_number) {
            continue;
        }
        if let Err(err) = validate_quotes(path, line) {
            log::trace!(
                "{}:{}: {} -> {}",
                path,
                line_number,
                err.found(),
                err.suggestion()
            );
            linter.run_linter_rule(err.code(), path, Some(line_number), Err::<(), _>(err));
        }
    }
}

fn parse_error_code(error: &TemplateParseError) -> &'static str {
    match error.kind {
        ParseErrorKind::UnclosedAction => UNCLOSED_ACTION,
        ParseErrorKind::UnclosedBlock(_) => UNCLOSED_BLOCK,
        ParseErrorKind::UnexpectedKeyword(_) => UNEXPECTED_KEYWORD,
        ParseErrorKind::UndefinedFunction(_) => UNDEFINED_FUNCTION,
    }
}

/// `path` relative to the chart root, with `/` separators.
fn relative_path(chart_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(chart_dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
