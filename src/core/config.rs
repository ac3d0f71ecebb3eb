//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.hive/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//! Relative paths in the file resolve under `~/.hive/`.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HiveConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub automations: AutomationsConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_file: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MemoryConfig {
    pub dir: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AutomationsConfig {
    pub file: Option<String>,
    pub agents: Option<Vec<String>>,
    #[serde(default)]
    pub repos: Vec<RepoEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RepoEntry {
    #[serde(default)]
    pub label: String,
    pub path: String,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_LOG_FILE: &str = "hive.log";
pub const DEFAULT_LOG_LEVEL: &str = "debug";
pub const DEFAULT_MEMORY_DIR: &str = "memory";
pub const DEFAULT_AUTOMATIONS_FILE: &str = "automations.json";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub log_file: PathBuf,
    pub log_level: log::LevelFilter,
    /// The configured level name when it was not recognized. Reported once
    /// the logger is up.
    pub unknown_log_level: Option<String>,
    pub memory_dir: PathBuf,
    pub automations_file: PathBuf,
    /// Raw agent names; the form normalizes them
    pub agents: Vec<String>,
    pub repos: Vec<RepoEntry>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// `~/.hive`, where the config, log, memory notes and automations live.
pub fn hive_home() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".hive"))
}

/// Returns the path to `~/.hive/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    hive_home().map(|h| h.join("config.toml"))
}

/// Load config from `path`, or from `~/.hive/config.toml` when `None`.
///
/// If the default file doesn't exist, generates a commented-out default and
/// returns `HiveConfig::default()`. An explicit path that doesn't exist is an
/// error. A malformed file returns `ConfigError::Parse`.
pub fn load_config(path: Option<&Path>) -> Result<HiveConfig, ConfigError> {
    if let Some(path) = path {
        return read_config(path);
    }

    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(HiveConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(HiveConfig::default());
    }

    read_config(&path)
}

fn read_config(path: &Path) -> Result<HiveConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: HiveConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Hive Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.
# Relative paths resolve under ~/.hive/.

# [general]
# log_file = "hive.log"
# log_level = "debug"               # off, error, warn, info, debug, trace (or HIVE_LOG_LEVEL)

# [memory]
# dir = "memory"                    # Or set HIVE_MEMORY_DIR

# [automations]
# file = "automations.json"
# agents = ["claude", "codex"]

# [[automations.repos]]
# label = "hive"
# path = "/repos/hive"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve `value` against `base` unless it is already absolute.
fn under(base: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value);
    if path.is_absolute() { path } else { base.join(path) }
}

fn parse_level(value: &str) -> Option<log::LevelFilter> {
    value.trim().parse::<log::LevelFilter>().ok()
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `home` is the base for relative paths (normally `~/.hive`); `cli_memory_dir`
/// comes from `hive memory --dir` (None = not specified).
pub fn resolve(config: &HiveConfig, home: &Path, cli_memory_dir: Option<&Path>) -> ResolvedConfig {
    // Memory dir: CLI → env → config → default
    let memory_dir = cli_memory_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("HIVE_MEMORY_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| {
            under(home, config.memory.dir.as_deref().unwrap_or(DEFAULT_MEMORY_DIR))
        });

    // Log level: env → config → default
    let level_name = std::env::var("HIVE_LOG_LEVEL")
        .ok()
        .or_else(|| config.general.log_level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let (log_level, unknown_log_level) = match parse_level(&level_name) {
        Some(level) => (level, None),
        None => (log::LevelFilter::Debug, Some(level_name)),
    };

    ResolvedConfig {
        log_file: under(
            home,
            config.general.log_file.as_deref().unwrap_or(DEFAULT_LOG_FILE),
        ),
        log_level,
        unknown_log_level,
        memory_dir,
        automations_file: under(
            home,
            config
                .automations
                .file
                .as_deref()
                .unwrap_or(DEFAULT_AUTOMATIONS_FILE),
        ),
        agents: config.automations.agents.clone().unwrap_or_default(),
        repos: config.automations.repos.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> PathBuf {
        PathBuf::from("/home/user/.hive")
    }

    #[test]
    fn test_default_config_parses() {
        let config = HiveConfig::default();
        assert!(config.automations.repos.is_empty());
        assert!(config.general.log_level.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve(&HiveConfig::default(), &home(), Some(Path::new("/tmp/mem")));
        assert_eq!(resolved.log_file, home().join(DEFAULT_LOG_FILE));
        assert_eq!(resolved.automations_file, home().join(DEFAULT_AUTOMATIONS_FILE));
        assert!(resolved.agents.is_empty());
    }

    #[test]
    fn test_resolve_cli_memory_dir_wins() {
        let config = HiveConfig {
            memory: MemoryConfig {
                dir: Some("notes".to_string()),
            },
            ..Default::default()
        };
        let resolved = resolve(&config, &home(), Some(Path::new("/srv/memory")));
        assert_eq!(resolved.memory_dir, PathBuf::from("/srv/memory"));
    }

    #[test]
    fn test_relative_and_absolute_paths() {
        assert_eq!(under(&home(), "log/hive.log"), home().join("log/hive.log"));
        assert_eq!(under(&home(), "/var/log/hive.log"), PathBuf::from("/var/log/hive.log"));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("WARN"), Some(log::LevelFilter::Warn));
        assert_eq!(parse_level(" trace "), Some(log::LevelFilter::Trace));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_unknown_log_level_is_kept_for_reporting() {
        let config = HiveConfig {
            general: GeneralConfig {
                log_level: Some("loud".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve(&config, &home(), None);
        if std::env::var("HIVE_LOG_LEVEL").is_err() {
            assert_eq!(resolved.log_level, log::LevelFilter::Debug);
            assert_eq!(resolved.unknown_log_level.as_deref(), Some("loud"));
        }

        let config = HiveConfig {
            general: GeneralConfig {
                log_level: Some("Info".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve(&config, &home(), None);
        if std::env::var("HIVE_LOG_LEVEL").is_err() {
            assert_eq!(resolved.log_level, log::LevelFilter::Info);
            assert!(resolved.unknown_log_level.is_none());
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
log_file = "/tmp/hive.log"
log_level = "info"

[memory]
dir = "notes"

[automations]
file = "autos.json"
agents = ["claude", "codex"]

[[automations.repos]]
label = "hive"
path = "/repos/hive"

[[automations.repos]]
path = "/repos/api"
"#;
        let config: HiveConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level.as_deref(), Some("info"));
        assert_eq!(config.memory.dir.as_deref(), Some("notes"));
        assert_eq!(config.automations.agents.as_ref().map(Vec::len), Some(2));
        assert_eq!(config.automations.repos.len(), 2);
        assert_eq!(config.automations.repos[1].label, "");

        let resolved = resolve(&config, &home(), Some(Path::new("/m")));
        assert_eq!(resolved.log_file, PathBuf::from("/tmp/hive.log"));
        assert_eq!(resolved.automations_file, home().join("autos.json"));
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[memory]
dir = "elsewhere"
"#;
        let config: HiveConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.memory.dir.as_deref(), Some("elsewhere"));
        assert!(config.general.log_file.is_none());
        assert!(config.automations.agents.is_none());
    }

    #[test]
    fn test_explicit_missing_path_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = load_config(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general\nlog_level = ").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(ConfigError::Parse(_))));
    }
}
