//! Template file extension policy.

use thiserror::Error;

/// Suffixes a file under `templates/` may carry.
pub const ALLOWED_EXTENSIONS: [&str; 2] = [".yaml", ".tpl"];

/// A template file with a suffix outside [`ALLOWED_EXTENSIONS`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("templates: \"{path}\" needs to use .yaml or .tpl extension")]
pub struct ExtensionError {
    pub path: String,
}

/// Check that `path` ends in exactly `.yaml` or `.tpl`.
///
/// Pure string check: the file does not need to exist and the comparison is
/// case-sensitive, so `.yml`, `.YAML` and `.yaml.bak` are all rejected.
pub fn validate_extension(path: &str) -> Result<(), ExtensionError> {
    if ALLOWED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        Ok(())
    } else {
        Err(ExtensionError {
            path: path.to_string(),
        })
    }
}
