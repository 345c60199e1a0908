use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::errors::{ScanError, ScanResult};
use crate::matcher::PatternSet;

/// Configuration for the scan daemon.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of
/// precedence:
/// 1. Custom config file specified via `--config`
/// 2. Local `.filesentry.yaml` in the current directory
/// 3. Global `$HOME/.config/filesentry/config.yaml`
///
/// # Configuration Format
///
/// The configuration uses YAML format. Example:
/// ```yaml
/// # Literal substrings matched against file base names
/// patterns:
///   - ".log"
///   - "core."
///
/// # Subtree to scan
/// root_path: "/var"
///
/// # Single-walker inter-cycle interval in seconds
/// interval_secs: 30
///
/// # Concurrency strategy: single | pool
/// mode: single
///
/// # Worker-pool rescan policy: continuous | gated
/// rescan: continuous
///
/// # Traversal depth guard
/// max_depth: 128
///
/// # Widen log output with non-match and permission diagnostics
/// verbose: false
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// # CLI Integration
///
/// Command-line arguments take precedence over config file values; the
/// merging behavior is defined in [`ScanConfig::merge_with_cli`]. The value
/// is immutable once the daemon starts and is threaded explicitly through
/// controller and walker construction; there is no ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Literal substrings matched against file base names, in priority order
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Root of the subtree every scan traverses
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Single-walker inter-cycle sleep, in seconds
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Concurrency strategy
    #[serde(default)]
    pub mode: ScanMode,

    /// Worker-pool behavior after a completed traversal
    #[serde(default)]
    pub rescan: RescanPolicy,

    /// Maximum recursion depth; deeper subtrees are skipped with a warning
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Adds non-match and permission-denied diagnostics to the log output
    #[serde(default)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log sink destination once detached from the terminal
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Cadence at which idle threads and the inter-cycle sleep poll the
    /// shared flags, in milliseconds. Not exposed on the CLI.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Concurrency strategy for scan execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// One controller thread alternating sleep and a full-pattern-set scan.
    #[default]
    Single,
    /// One traversal worker per pattern plus a supervisor.
    Pool,
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "pool" => Ok(Self::Pool),
            other => Err(format!("unknown scan mode '{other}' (expected 'single' or 'pool')")),
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("single"),
            Self::Pool => f.write_str("pool"),
        }
    }
}

/// What a pool worker does after finishing a traversal while the scan flag
/// is still raised.
///
/// `Continuous` keeps the scan flag latched until an explicit stop-scan, so
/// workers immediately begin the next traversal. `Gated` runs exactly one
/// traversal per start-scan signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RescanPolicy {
    #[default]
    Continuous,
    Gated,
}

impl FromStr for RescanPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "continuous" => Ok(Self::Continuous),
            "gated" | "signal-gated" => Ok(Self::Gated),
            other => Err(format!(
                "unknown rescan policy '{other}' (expected 'continuous' or 'gated')"
            )),
        }
    }
}

impl fmt::Display for RescanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continuous => f.write_str("continuous"),
            Self::Gated => f.write_str("gated"),
        }
    }
}

pub(crate) fn default_root_path() -> PathBuf {
    PathBuf::from("/")
}

pub(crate) fn default_interval() -> u64 {
    30
}

pub(crate) fn default_max_depth() -> usize {
    128
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            root_path: default_root_path(),
            interval_secs: default_interval(),
            mode: ScanMode::default(),
            rescan: RescanPolicy::default(),
            max_depth: default_max_depth(),
            verbose: false,
            log_level: default_log_level(),
            log_file: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ScanConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        // Default config locations
        let config_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("filesentry/config.yaml")),
            // Local config
            Some(PathBuf::from(".filesentry.yaml")),
            // Custom config
            config_path.map(PathBuf::from),
        ];

        // Add existing config files
        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // Build and deserialize
        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values. CLI values take
    /// precedence over config file values.
    pub fn merge_with_cli(mut self, cli_config: ScanConfig) -> Self {
        if !cli_config.patterns.is_empty() {
            self.patterns = cli_config.patterns;
        }
        if cli_config.root_path != default_root_path() {
            self.root_path = cli_config.root_path;
        }
        if cli_config.interval_secs != default_interval() {
            self.interval_secs = cli_config.interval_secs;
        }
        if cli_config.mode != ScanMode::default() {
            self.mode = cli_config.mode;
        }
        if cli_config.rescan != RescanPolicy::default() {
            self.rescan = cli_config.rescan;
        }
        if cli_config.max_depth != default_max_depth() {
            self.max_depth = cli_config.max_depth;
        }
        if cli_config.verbose {
            self.verbose = true;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        if cli_config.log_file.is_some() {
            self.log_file = cli_config.log_file;
        }
        self
    }

    /// Checks the invariants a daemon refuses to start without.
    pub fn validate(&self) -> ScanResult<()> {
        if self.patterns.is_empty() {
            return Err(ScanError::EmptyPatternSet);
        }
        Ok(())
    }

    /// Builds the immutable pattern set controllers scan with.
    pub fn pattern_set(&self) -> ScanResult<PatternSet> {
        PatternSet::new(self.patterns.clone())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let config_content = r#"
            patterns: [".log", "core."]
            root_path: "/var"
            interval_secs: 5
            mode: pool
            rescan: gated
            max_depth: 16
            verbose: true
            log_level: "debug"
        "#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = ScanConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.patterns, vec![".log", "core."]);
        assert_eq!(config.root_path, PathBuf::from("/var"));
        assert_eq!(config.interval_secs, 5);
        assert_eq!(config.mode, ScanMode::Pool);
        assert_eq!(config.rescan, RescanPolicy::Gated);
        assert_eq!(config.max_depth, 16);
        assert!(config.verbose);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_default_values() {
        let config_content = r#"
            patterns: ["tmp"]
        "#;

        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = ScanConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.patterns, vec!["tmp"]);
        assert_eq!(config.root_path, PathBuf::from("/"));
        assert_eq!(config.interval_secs, 30);
        assert_eq!(config.mode, ScanMode::Single);
        assert_eq!(config.rescan, RescanPolicy::Continuous);
        assert_eq!(config.max_depth, 128);
        assert!(!config.verbose);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn test_merge_with_cli() {
        let config_file = ScanConfig {
            patterns: vec!["conf".to_string()],
            root_path: PathBuf::from("/etc"),
            interval_secs: 10,
            mode: ScanMode::Pool,
            rescan: RescanPolicy::Gated,
            log_level: "warn".to_string(),
            ..ScanConfig::default()
        };

        let cli_config = ScanConfig {
            patterns: vec!["log".to_string()],
            root_path: PathBuf::from("/srv"),
            verbose: true,
            ..ScanConfig::default()
        };

        let merged = config_file.merge_with_cli(cli_config);
        assert_eq!(merged.patterns, vec!["log"]); // CLI value
        assert_eq!(merged.root_path, PathBuf::from("/srv")); // CLI value
        assert_eq!(merged.interval_secs, 10); // File value (CLI default)
        assert_eq!(merged.mode, ScanMode::Pool); // File value (CLI default)
        assert_eq!(merged.rescan, RescanPolicy::Gated); // File value
        assert!(merged.verbose); // CLI value
        assert_eq!(merged.log_level, "warn"); // File value (CLI default)
    }

    #[test]
    fn test_validate_refuses_empty_patterns() {
        let config = ScanConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ScanError::EmptyPatternSet)
        ));

        let config = ScanConfig {
            patterns: vec!["x".to_string()],
            ..ScanConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mode_and_policy_parsing() {
        assert_eq!("single".parse::<ScanMode>().unwrap(), ScanMode::Single);
        assert_eq!("pool".parse::<ScanMode>().unwrap(), ScanMode::Pool);
        assert!("threads".parse::<ScanMode>().is_err());

        assert_eq!(
            "continuous".parse::<RescanPolicy>().unwrap(),
            RescanPolicy::Continuous
        );
        assert_eq!("gated".parse::<RescanPolicy>().unwrap(), RescanPolicy::Gated);
        assert_eq!(
            "signal-gated".parse::<RescanPolicy>().unwrap(),
            RescanPolicy::Gated
        );
        assert!("always".parse::<RescanPolicy>().is_err());
    }

    #[test]
    fn test_invalid_config() {
        let config_content = r#"
            patterns: "not-a-list"
            interval_secs: "soon"
        "#;

        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let result = ScanConfig::load_from(Some(&config_path));
        assert!(result.is_err(), "Expected error loading invalid config");
    }
}
