use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::config::LintConfig;
use crate::formatter::OutputFormat;
use crate::types::Severity;

#[derive(Parser, Debug)]
#[command(name = "chart-lint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lint the templates of one or more charts")]
#[command(long_about = "Checks every file under a chart's templates/ directory: template \
file extensions, template syntax, and quoting of substitutions emitted as YAML values.")]
pub struct Cli {
    /// Chart directories to lint
    #[arg(value_name = "CHART", default_value = ".")]
    pub charts: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Stylish)]
    pub format: OutputFormat,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Rule codes to ignore (comma-separated)
    #[arg(long, value_name = "CODE", value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Fail when a message is at or above this severity
    #[arg(long, value_name = "SEVERITY", value_parser = parse_severity)]
    pub failure_threshold: Option<Severity>,

    /// Always exit with status 0 after linting
    #[arg(long)]
    pub no_fail: bool,

    /// Print every rule with its default severity and exit
    #[arg(long)]
    pub list_rules: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    pub no_color: bool,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all logging
    #[arg(short, long)]
    pub quiet: bool,
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    Severity::parse(s).ok_or_else(|| format!("unknown severity '{}'", s))
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }

    /// Build the lint configuration: the config file (explicit or found in
    /// the standard locations), then command-line flags on top.
    pub fn lint_config(&self) -> anyhow::Result<LintConfig> {
        let mut config = match &self.config {
            Some(path) => LintConfig::from_yaml_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => LintConfig::find_and_load().unwrap_or_default(),
        };

        config = config.ignore_all(self.ignore.iter().map(|c| c.trim()).filter(|c| !c.is_empty()));
        if self.strict {
            config.strict = true;
        }
        if let Some(threshold) = self.failure_threshold {
            config.failure_threshold = threshold;
        }
        if self.no_fail {
            config.no_fail = true;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["chart-lint"]).unwrap();
        assert_eq!(cli.charts, [PathBuf::from(".")]);
        assert_eq!(cli.format, OutputFormat::Stylish);
        assert!(!cli.strict);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lint.yaml");
        fs::write(&path, "ignored: [HL3005]\nfailure-threshold: error\n").unwrap();

        let cli = Cli::try_parse_from([
            "chart-lint",
            "-c",
            path.to_str().unwrap(),
            "--ignore",
            "HL3006,HL3007",
            "--failure-threshold",
            "warning",
            "--strict",
            "-f",
            "json",
            "a",
            "b",
        ])
        .unwrap();
        let config = cli.lint_config().unwrap();

        assert_eq!(cli.charts, [PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(cli.format, OutputFormat::Json);
        for code in ["HL3005", "HL3006", "HL3007"] {
            assert!(config.is_rule_ignored(code));
        }
        assert_eq!(config.failure_threshold, Severity::Warning);
        assert!(config.strict);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from(["chart-lint", "-c", "/nonexistent/lint.yaml"]).unwrap();
        let err = cli.lint_config().unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/lint.yaml"));
    }

    #[test]
    fn test_bad_severity_rejected() {
        assert!(Cli::try_parse_from(["chart-lint", "--failure-threshold", "loud"]).is_err());
        assert!(Cli::try_parse_from(["chart-lint", "-f", "xml"]).is_err());
    }
}
