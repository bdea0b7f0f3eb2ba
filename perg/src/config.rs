use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{SearchError, SearchResult};

/// Configuration for one search run.
///
/// Built once at startup (CLI arguments merged over optional YAML config
/// files) and treated as read-only shared state by every worker afterwards.
///
/// # Configuration Locations
///
/// Values can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.perg.yaml` in the current directory
/// 3. Global `$HOME/.config/perg/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// pattern: "TODO|FIXME"
/// root_path: "."
/// recursive: true
/// context_lines: 2
/// thread_count: 4
/// log_level: "info"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// The search pattern (supports regex)
    #[serde(default)]
    pub pattern: String,

    /// Root directory to search when no explicit file is given
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Explicit single file to search instead of walking a directory
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Select lines that do NOT match the pattern
    #[serde(default)]
    pub invert: bool,

    /// Prefix every matched line with the path it came from
    #[serde(default)]
    pub verbose: bool,

    /// Number of trailing context lines to capture after each match
    /// (0 disables context capture)
    #[serde(default)]
    pub context_lines: usize,

    /// Distribute whole files across workers instead of splitting each
    /// file into line blocks
    #[serde(default)]
    pub file_wise: bool,

    /// Include hidden files in directory enumeration
    #[serde(default)]
    pub include_hidden: bool,

    /// Descend into subdirectories
    #[serde(default)]
    pub recursive: bool,

    /// Paths to skip (glob syntax), e.g. "target/**"
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Number of worker threads, defaults to the number of CPU cores
    #[serde(default = "default_thread_count")]
    pub thread_count: NonZeroUsize,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            root_path: default_root_path(),
            file: None,
            invert: false,
            verbose: false,
            context_lines: 0,
            file_wise: false,
            include_hidden: false,
            recursive: false,
            ignore_patterns: Vec::new(),
            thread_count: default_thread_count(),
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("perg/config.yaml")),
            // Local config
            Some(PathBuf::from(".perg.yaml")),
            // Custom config
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values.
    /// CLI values take precedence over config file values.
    pub fn merge_with_cli(mut self, cli: SearchConfig) -> Self {
        if !cli.pattern.is_empty() {
            self.pattern = cli.pattern;
        }
        if cli.root_path != default_root_path() {
            self.root_path = cli.root_path;
        }
        if cli.file.is_some() {
            self.file = cli.file;
        }
        if cli.invert {
            self.invert = true;
        }
        if cli.verbose {
            self.verbose = true;
        }
        if cli.context_lines > 0 {
            self.context_lines = cli.context_lines;
        }
        if cli.file_wise {
            self.file_wise = true;
        }
        if cli.include_hidden {
            self.include_hidden = true;
        }
        if cli.recursive {
            self.recursive = true;
        }
        if !cli.ignore_patterns.is_empty() {
            self.ignore_patterns = cli.ignore_patterns;
        }
        self.thread_count = cli.thread_count;
        if cli.log_level != default_log_level() {
            self.log_level = cli.log_level;
        }
        self
    }

    /// Rejects configurations the engine cannot run with. Called once by the
    /// engine before any worker is spawned.
    pub fn validate(&self) -> SearchResult<()> {
        if self.pattern.is_empty() {
            return Err(SearchError::config_error("Search pattern not given"));
        }
        Ok(())
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
            pattern: "TODO|FIXME"
            root_path: "src"
            recursive: true
            context_lines: 2
            ignore_patterns: ["target/*"]
            thread_count: 4
            log_level: "debug"
        "#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.pattern, "TODO|FIXME");
        assert_eq!(config.root_path, PathBuf::from("src"));
        assert!(config.recursive);
        assert_eq!(config.context_lines, 2);
        assert_eq!(config.ignore_patterns, vec!["target/*".to_string()]);
        assert_eq!(config.thread_count, NonZeroUsize::new(4).unwrap());
        assert_eq!(config.log_level, "debug");
        assert!(!config.file_wise);
    }

    #[test]
    fn test_merge_with_cli() {
        let config_file = SearchConfig {
            pattern: "TODO".to_string(),
            root_path: PathBuf::from("src"),
            context_lines: 1,
            log_level: "info".to_string(),
            thread_count: NonZeroUsize::new(4).unwrap(),
            ..Default::default()
        };

        let cli = SearchConfig {
            pattern: "FIXME".to_string(),
            verbose: true,
            file_wise: true,
            thread_count: NonZeroUsize::new(8).unwrap(),
            ..Default::default()
        };

        let merged = config_file.merge_with_cli(cli);
        assert_eq!(merged.pattern, "FIXME"); // CLI value
        assert_eq!(merged.root_path, PathBuf::from("src")); // file value
        assert_eq!(merged.context_lines, 1); // file value (CLI 0)
        assert!(merged.verbose); // CLI value
        assert!(merged.file_wise); // CLI value
        assert_eq!(merged.thread_count, NonZeroUsize::new(8).unwrap()); // CLI value
    }

    #[test]
    fn test_default_values() {
        let config = SearchConfig::default();
        assert!(config.pattern.is_empty());
        assert_eq!(config.root_path, PathBuf::from("."));
        assert_eq!(config.file, None);
        assert!(!config.invert);
        assert!(!config.recursive);
        assert_eq!(config.context_lines, 0);
        assert_eq!(
            config.thread_count,
            NonZeroUsize::new(num_cpus::get()).unwrap()
        );
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_validate_rejects_empty_pattern() {
        let config = SearchConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SearchError::ConfigError(_)));

        let config = SearchConfig {
            pattern: "x".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_nonexistent_file() {
        // Missing custom file is simply skipped, yielding defaults
        let config = SearchConfig::load_from(Some(Path::new("nonexistent.yaml"))).unwrap();
        assert!(config.pattern.is_empty());
    }
}
