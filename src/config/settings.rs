//! Application settings loaded from config.toml and the environment.
//!
//! Values are resolved in three layers: built-in defaults, an optional TOML file, then
//! environment variables. The file path comes from `CHAKACHAK_CONFIG` and falls back to
//! `./config.toml` when that file exists.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default listen address
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
/// Default admin password when none is configured
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";
/// Default token handed out on successful login
pub const DEFAULT_SESSION_TOKEN: &str = "chakachak-session";
/// Default number of dashboard feed items
pub const DEFAULT_RECENT_ACTIVITY_LIMIT: u64 = 10;
/// Company name printed on reports
pub const DEFAULT_COMPANY_NAME: &str = "Chakachak Decoration";

/// Structure of the optional config.toml file. Every field may be omitted.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    /// Socket address to listen on
    pub bind_address: Option<String>,
    /// `SeaORM` connection URL
    pub database_url: Option<String>,
    /// Shared admin password
    pub admin_password: Option<String>,
    /// Token returned by a successful login
    pub session_token: Option<String>,
    /// How many items the dashboard feed shows
    pub recent_activity_limit: Option<u64>,
    /// Company name printed on PDF reports
    pub company_name: Option<String>,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address to listen on
    pub bind_address: SocketAddr,
    /// `SeaORM` connection URL
    pub database_url: String,
    /// Shared admin password
    pub admin_password: String,
    /// Token returned by a successful login
    pub session_token: String,
    /// How many items the dashboard feed shows
    pub recent_activity_limit: u64,
    /// Company name printed on PDF reports
    pub company_name: String,
}

impl AppConfig {
    /// Combines a parsed config file with environment overrides.
    ///
    /// `env` is a lookup function so callers (and tests) control where variables come from.
    pub fn resolve<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address = env("BIND_ADDRESS")
            .or(file.bind_address)
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_address.parse::<SocketAddr>().map_err(|e| Error::Config {
            message: format!("Invalid bind address '{bind_address}': {e}"),
        })?;

        let recent_activity_limit = match env("RECENT_ACTIVITY_LIMIT") {
            Some(raw) => raw.parse::<u64>().map_err(|e| Error::Config {
                message: format!("Invalid RECENT_ACTIVITY_LIMIT '{raw}': {e}"),
            })?,
            None => file
                .recent_activity_limit
                .unwrap_or(DEFAULT_RECENT_ACTIVITY_LIMIT),
        };
        if recent_activity_limit == 0 {
            return Err(Error::Config {
                message: "recent_activity_limit must be at least 1".to_string(),
            });
        }

        let admin_password = env("ADMIN_PASSWORD")
            .or(file.admin_password)
            .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());
        if admin_password.is_empty() {
            return Err(Error::Config {
                message: "admin password cannot be empty".to_string(),
            });
        }

        Ok(Self {
            bind_address,
            database_url: env("DATABASE_URL")
                .or(file.database_url)
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            admin_password,
            session_token: env("SESSION_TOKEN")
                .or(file.session_token)
                .unwrap_or_else(|| DEFAULT_SESSION_TOKEN.to_string()),
            recent_activity_limit,
            company_name: env("COMPANY_NAME")
                .or(file.company_name)
                .unwrap_or_else(|| DEFAULT_COMPANY_NAME.to_string()),
        })
    }
}

/// Parses a config file from disk.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_file_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config file {}: {e}", path_ref.display()),
    })
}

/// Loads the application configuration from the process environment and optional file.
pub fn load_app_configuration() -> Result<AppConfig> {
    let explicit = std::env::var("CHAKACHAK_CONFIG").ok().map(PathBuf::from);
    let file = match explicit {
        Some(path) => load_file_config(path)?,
        None if Path::new("config.toml").exists() => load_file_config("config.toml")?,
        None => {
            tracing::info!("No config.toml found, using defaults and environment");
            FileConfig::default()
        }
    };

    let config = AppConfig::resolve(file, |key| std::env::var(key).ok())?;
    if config.admin_password == DEFAULT_ADMIN_PASSWORD {
        tracing::warn!("ADMIN_PASSWORD is not set, falling back to the default password");
    }
    Ok(config)
}
