use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main gtm configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LogLevel,
    pub toolchain: ToolchainConfig,
    pub build: BuildConfig,
    pub host: HostConfig,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        }
    }
}

/// Compiler used to build agents
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Compiler executable (looked up on PATH)
    pub program: String,
    /// Rust edition agents are compiled with
    pub edition: String,
    /// Extra arguments passed before the generated ones (e.g. `-C opt-level=2`)
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Where compiled modules are written (defaults to the system temp dir)
    pub artifact_dir: Option<PathBuf>,
    /// Kill the compiler after this many seconds (unset waits forever)
    pub timeout_secs: Option<u64>,
}

/// Settings for the built-in console host
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    pub ticks: u32,
    pub colony_size: u32,
    /// Sugar piles placed when `--sugar` is not positive
    pub default_sugar: u32,
    pub sugar_per_pile: u32,
    /// Print a trace line every N ticks when not headless
    pub trace_every: u32,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            program: "rustc".to_string(),
            edition: "2021".to_string(),
            args: Vec::new(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            ticks: 200,
            colony_size: 1,
            default_sugar: 1,
            sugar_per_pile: 25,
            trace_every: 20,
        }
    }
}

impl BuildConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for path in Self::search_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Config files tried when no explicit path is given, in order:
    /// $GTM_CONFIG, $GTM_DIR/gtm.yaml (or ~/.config/gtm/gtm.yaml), ./gtm.yaml
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(env_path) = std::env::var("GTM_CONFIG") {
            paths.push(PathBuf::from(env_path));
        }
        paths.push(Self::gtm_dir().join("gtm.yaml"));
        paths.push(PathBuf::from("gtm.yaml"));
        paths
    }

    /// The file `load` would read, if any.
    pub fn source(config_path: Option<&PathBuf>) -> Option<PathBuf> {
        match config_path {
            Some(path) => Some(path.clone()),
            None => Self::search_paths().into_iter().find(|p| p.exists()),
        }
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Get the gtm directory (where the config file lives)
    pub fn gtm_dir() -> PathBuf {
        std::env::var("GTM_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("gtm"))
    }

    /// Directory compiled agents are written to
    pub fn artifact_dir(&self) -> PathBuf {
        match &self.build.artifact_dir {
            Some(dir) => Self::expand_path(dir),
            None => std::env::temp_dir(),
        }
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}
