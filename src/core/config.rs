//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.genterm/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::state::{MAX_RETRIES_LIMIT, MaxRetries};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GentermConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub langflow: LangflowConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub max_retries: Option<u8>,
    pub provider: Option<String>,
    pub model_name: Option<String>,
    pub panel_height: Option<u16>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LangflowConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub assist_path: Option<String>,
    pub flow_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HistoryConfig {
    pub persist: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    pub download_dir: Option<String>,
    pub components_dir: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = crate::assist::langflow::DEFAULT_BASE_URL;
pub const DEFAULT_ASSIST_PATH: &str = crate::assist::langflow::DEFAULT_ASSIST_PATH;
pub const DEFAULT_PANEL_HEIGHT: u16 = 16;

// ============================================================================
// Resolved Config (concrete values)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub max_retries: MaxRetries,
    pub provider: Option<String>,
    pub model_name: Option<String>,
    pub panel_height: u16,
    pub base_url: String,
    pub api_key: Option<String>,
    pub assist_path: String,
    pub flow_id: Option<String>,
    pub persist_history: bool,
    pub download_dir: PathBuf,
    pub components_dir: PathBuf,
}

/// Values supplied on the command line (None = flag not given).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub max_retries: Option<u8>,
    pub provider: Option<String>,
    pub model_name: Option<String>,
    pub persist_history: bool,
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

/// `~/.genterm/`, if a home directory exists.
pub fn genterm_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".genterm"))
}

/// Returns the path to `~/.genterm/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    genterm_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.genterm/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `GentermConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<GentermConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(GentermConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<GentermConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(GentermConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: GentermConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG_CONTENT: &str = r#"# genterm configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# max_retries = 3                    # 0..=5, validation retries on the server
# provider = "openai"                # forwarded to the assistant
# model_name = "gpt-4o"
# panel_height = 16                  # initial terminal height in rows

# [langflow]
# base_url = "http://localhost:7860" # or LANGFLOW_BASE_URL
# api_key = "sk-..."                 # or LANGFLOW_API_KEY
# assist_path = "/api/v1/agentic/assist/stream"
# flow_id = "..."

# [history]
# persist = false                    # true keeps history under ~/.genterm/session/

# [output]
# download_dir = "."
# components_dir = "~/.genterm/components"
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG_CONTENT) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Expands a leading `~/` to the home directory.
fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

fn clamp_retries(value: u8) -> MaxRetries {
    MaxRetries::new(value).unwrap_or_else(|| {
        warn!(
            "max_retries = {} is outside 0..={}, clamping",
            value, MAX_RETRIES_LIMIT
        );
        MaxRetries::clamped(value)
    })
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &GentermConfig, cli: &CliOverrides) -> ResolvedConfig {
    let env = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

    // Retry bound: CLI → config → default
    let max_retries = cli
        .max_retries
        .or(config.general.max_retries)
        .map(clamp_retries)
        .unwrap_or_default();

    // Provider / model: CLI → env → config
    let provider = cli
        .provider
        .clone()
        .or_else(|| env("GENTERM_PROVIDER"))
        .or_else(|| config.general.provider.clone());
    let model_name = cli
        .model_name
        .clone()
        .or_else(|| env("GENTERM_MODEL"))
        .or_else(|| config.general.model_name.clone());

    // Base URL: CLI → env → config → default
    let base_url = cli
        .base_url
        .clone()
        .or_else(|| env("LANGFLOW_BASE_URL"))
        .or_else(|| config.langflow.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // API key: env → config
    let api_key = env("LANGFLOW_API_KEY").or_else(|| config.langflow.api_key.clone());

    let components_dir = config
        .output
        .components_dir
        .as_deref()
        .map(expand_home)
        .or_else(|| genterm_dir().map(|d| d.join("components")))
        .unwrap_or_else(|| PathBuf::from("components"));

    ResolvedConfig {
        max_retries,
        provider,
        model_name,
        panel_height: config.general.panel_height.unwrap_or(DEFAULT_PANEL_HEIGHT),
        base_url,
        api_key,
        assist_path: config
            .langflow
            .assist_path
            .clone()
            .unwrap_or_else(|| DEFAULT_ASSIST_PATH.to_string()),
        flow_id: config.langflow.flow_id.clone(),
        persist_history: cli.persist_history || config.history.persist.unwrap_or(false),
        download_dir: config
            .output
            .download_dir
            .as_deref()
            .map(expand_home)
            .unwrap_or_else(|| PathBuf::from(".")),
        components_dir,
    }
}
