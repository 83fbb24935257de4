//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.webwrap/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::quick_links::{QuickLink, default_quick_links};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct WebwrapConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub quick_links: Vec<QuickLink>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub home_url: Option<String>,
    pub open_external_links: Option<bool>,
    pub show_progress_bar: Option<bool>,
    pub show_navigation_controls: Option<bool>,
    pub show_page_title: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EngineConfig {
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_HOME_URL: &str = "https://www.apple.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub home_url: String,
    pub open_external_links: bool,
    pub show_progress_bar: bool,
    pub show_navigation_controls: bool,
    pub show_page_title: bool,
    pub user_agent: Option<String>,
    pub timeout: Duration,
    pub quick_links: Vec<QuickLink>,
}

/// Values that can come from the command line. `None` = not specified.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub user_agent: Option<String>,
    /// `--in-place`: keep cross-host links inside the surface.
    pub in_place: bool,
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

/// Returns the path to `~/.webwrap/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".webwrap").join("config.toml"))
}

/// Load config from `~/.webwrap/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `WebwrapConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<WebwrapConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(WebwrapConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<WebwrapConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(WebwrapConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: WebwrapConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# webwrap configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# home_url = "https://www.apple.com"   # Or set WEBWRAP_HOME_URL
# open_external_links = true           # Cross-host links open in the system browser
# show_progress_bar = true
# show_navigation_controls = true
# show_page_title = true

# [engine]
# user_agent = "webwrap/0.1"           # Or set WEBWRAP_USER_AGENT
# timeout_secs = 30

# Replaces the built-in quick links when present.
# [[quick_links]]
# name = "Rust"
# url = "https://www.rust-lang.org"
# icon = "code"                        # globe, apple, search, code, swift
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

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &WebwrapConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Home URL: env → config → default
    let home_url = std::env::var("WEBWRAP_HOME_URL")
        .ok()
        .or_else(|| config.general.home_url.clone())
        .unwrap_or_else(|| DEFAULT_HOME_URL.to_string());

    // User agent: CLI → env → config → engine default
    let user_agent = cli
        .user_agent
        .clone()
        .or_else(|| std::env::var("WEBWRAP_USER_AGENT").ok())
        .or_else(|| config.engine.user_agent.clone());

    let open_external_links =
        !cli.in_place && config.general.open_external_links.unwrap_or(true);

    let quick_links = if config.quick_links.is_empty() {
        default_quick_links()
    } else {
        config.quick_links.clone()
    };

    ResolvedConfig {
        home_url,
        open_external_links,
        show_progress_bar: config.general.show_progress_bar.unwrap_or(true),
        show_navigation_controls: config.general.show_navigation_controls.unwrap_or(true),
        show_page_title: config.general.show_page_title.unwrap_or(true),
        user_agent,
        timeout: Duration::from_secs(config.engine.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        quick_links,
    }
}
