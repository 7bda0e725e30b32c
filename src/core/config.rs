//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.mdwalk/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MdwalkConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub root_dir: Option<PathBuf>,
    pub show_line_numbers: Option<bool>,
    pub max_width: Option<u16>,
    pub watch: Option<bool>,
    pub status_message_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LogConfig {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_MAX_WIDTH: u16 = 100;
pub const DEFAULT_STATUS_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_LOG_FILE: &str = "mdwalk.log";
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Debug;

/// Env var naming the sandbox root.
pub const ROOT_ENV: &str = "MDWALK_ROOT";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub root_dir: PathBuf,
    pub show_line_numbers: bool,
    pub max_width: u16,
    pub watch: bool,
    pub status_timeout: Duration,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
    /// Settings that were ignored, for logging once the logger is up.
    pub warnings: Vec<String>,
}

/// Values given on the command line. `None` / `false` means not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub root_dir: Option<PathBuf>,
    pub line_numbers: bool,
    pub no_watch: bool,
    pub width: Option<u16>,
    pub log_file: Option<PathBuf>,
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

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Where the loaded config came from. Loading runs before the logger
/// exists, so the caller reports this afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    Generated(PathBuf),
    /// Built-in defaults, with the reason no file was used.
    Defaults(String),
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::File(path) => write!(f, "Loaded config from {}", path.display()),
            ConfigOrigin::Generated(path) => {
                write!(f, "No config file found, generated default at {}", path.display())
            }
            ConfigOrigin::Defaults(reason) => write!(f, "Using default config: {reason}"),
        }
    }
}

/// Returns the path to `~/.mdwalk/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".mdwalk").join("config.toml"))
}

/// Load config from `~/.mdwalk/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `MdwalkConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<(MdwalkConfig, ConfigOrigin), ConfigError> {
    let Some(path) = config_path() else {
        return Ok((
            MdwalkConfig::default(),
            ConfigOrigin::Defaults("could not determine home directory".to_string()),
        ));
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<(MdwalkConfig, ConfigOrigin), ConfigError> {
    if !path.exists() {
        let origin = match generate_default_config(path) {
            Ok(()) => ConfigOrigin::Generated(path.to_path_buf()),
            Err(e) => ConfigOrigin::Defaults(format!("could not write {}: {e}", path.display())),
        };
        return Ok((MdwalkConfig::default(), origin));
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: MdwalkConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    Ok((config, ConfigOrigin::File(path.to_path_buf())))
}

const DEFAULT_CONFIG_CONTENT: &str = r#"# mdwalk configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# root_dir = "."                     # Links never leave this directory (or set MDWALK_ROOT)
# show_line_numbers = false
# max_width = 100                    # Word-wrap cap; 0 wraps at the terminal width
# watch = true                       # Reload when the file changes on disk
# status_message_timeout_ms = 3000

# [log]
# level = "debug"                    # "error", "warn", "info", "debug", "trace", "off"
# file = "mdwalk.log"
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG_CONTENT)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &MdwalkConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// [`resolve`] with an explicit environment lookup.
pub fn resolve_with_env(
    config: &MdwalkConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Root: CLI → env → config → "."
    let root_dir = cli
        .root_dir
        .clone()
        .or_else(|| env(ROOT_ENV).filter(|s| !s.is_empty()).map(PathBuf::from))
        .or_else(|| config.general.root_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let show_line_numbers =
        cli.line_numbers || config.general.show_line_numbers.unwrap_or(false);
    let watch = !cli.no_watch && config.general.watch.unwrap_or(true);

    let max_width = cli
        .width
        .or(config.general.max_width)
        .unwrap_or(DEFAULT_MAX_WIDTH);

    let mut warnings = Vec::new();
    let log_level = match config.log.level.as_deref() {
        None => DEFAULT_LOG_LEVEL,
        Some(level) => level.parse().unwrap_or_else(|_| {
            warnings.push(format!(
                "Unknown log level {level:?}, using {DEFAULT_LOG_LEVEL}"
            ));
            DEFAULT_LOG_LEVEL
        }),
    };

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| config.log.file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    ResolvedConfig {
        root_dir,
        show_line_numbers,
        max_width,
        watch,
        status_timeout: Duration::from_millis(
            config
                .general
                .status_message_timeout_ms
                .unwrap_or(DEFAULT_STATUS_TIMEOUT_MS),
        ),
        log_level,
        log_file,
        warnings,
    }
}
