//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `STOREDESK_API_BASE_URL` is unset, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `STOREDESK_API_BASE_URL`: Backend base URL (required for the env path)
//! - `STOREDESK_API_TIMEOUT_MS`: Per-request timeout in milliseconds
//! - `STOREDESK_API_USER_AGENT`: User agent sent with every request
//! - `STOREDESK_CREDENTIAL_BACKEND`: `memory`, `file` or `keychain`
//! - `STOREDESK_CREDENTIAL_PATH`: Credential file for the `file` backend
//! - `STOREDESK_KEYCHAIN_SERVICE`: Keychain service name
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./storedesk.{json,toml}` or `./config.{json,toml}` (current working
//!    directory)
//! 2. The same names in the parent and grandparent directories
//! 3. Relative to executable location

use std::path::{Path, PathBuf};

use storedesk_domain::constants::DEFAULT_CREDENTIAL_FILE;
use storedesk_domain::{
    validate_timeout_ms, ApiConfig, Config, CredentialBackend, CredentialConfig, Result,
    StoreDeskError,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["storedesk.json", "storedesk.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the base URL is
/// not set there, falls back to loading from a config file.
///
/// # Errors
/// Returns `StoreDeskError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A variable has an invalid value
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Like [`load`], but falls back to [`Config::default`] when neither source
/// provides a configuration
pub fn load_or_default() -> Config {
    load().unwrap_or_else(|e| {
        tracing::info!(error = %e, "No configuration found; using defaults");
        Config::default()
    })
}

/// Load configuration from environment variables
///
/// `STOREDESK_API_BASE_URL` is required; every other variable falls back to
/// its default.
///
/// # Errors
/// Returns `StoreDeskError::Config` if the base URL is missing or a
/// variable has an invalid value (including a zero timeout).
pub fn load_from_env() -> Result<Config> {
    let base_url = env_var("STOREDESK_API_BASE_URL")?;
    let defaults = ApiConfig::default();

    let timeout_ms = match optional_env("STOREDESK_API_TIMEOUT_MS") {
        Some(value) => {
            let parsed = value
                .parse::<u64>()
                .map_err(|e| StoreDeskError::Config(format!("Invalid timeout: {e}")))?;
            validate_timeout_ms(parsed)?
        }
        None => defaults.timeout_ms,
    };

    let backend = match optional_env("STOREDESK_CREDENTIAL_BACKEND") {
        Some(value) => value.parse::<CredentialBackend>()?,
        None => CredentialBackend::default(),
    };

    let mut credentials = CredentialConfig {
        backend,
        path: optional_env("STOREDESK_CREDENTIAL_PATH"),
        ..CredentialConfig::default()
    };
    if let Some(service_name) = optional_env("STOREDESK_KEYCHAIN_SERVICE") {
        credentials.service_name = service_name;
    }

    Ok(Config {
        api: ApiConfig {
            base_url,
            timeout_ms,
            user_agent: optional_env("STOREDESK_API_USER_AGENT"),
        },
        credentials,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `StoreDeskError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(StoreDeskError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            StoreDeskError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| StoreDeskError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| StoreDeskError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| StoreDeskError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(StoreDeskError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend([exe_dir.to_path_buf(), exe_dir.join(".."), exe_dir.join("../..")]);
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Default location of the credential file, `$HOME/.storedesk/credentials.json`
///
/// Falls back to the working directory when no home directory is set.
pub fn default_credential_path() -> PathBuf {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(DEFAULT_CREDENTIAL_FILE)
}

/// Get required environment variable
///
/// # Errors
/// Returns `StoreDeskError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    optional_env(key).ok_or_else(|| {
        StoreDeskError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Non-blank environment variable, trimmed
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
