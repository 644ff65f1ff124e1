//! Configuration management for jira-bridge.
//!
//! Credentials come from the process environment:
//!
//! - `JIRA_HOST`: Jira Cloud host, e.g. `your-company.atlassian.net`
//! - `JIRA_EMAIL`: account email used for Basic auth
//! - `JIRA_API_TOKEN`: API token for that account
//!
//! An optional TOML file may supply the same keys. It lives in a
//! platform-specific location:
//!
//! - **macOS/Linux**: `~/.config/jira-bridge/config.toml`
//! - **Windows**: `%APPDATA%\jira-bridge\config.toml`
//!
//! Environment variables override values from the file.
//!
//! # Example
//!
//! ```ignore
//! use jira_bridge_core::config::Config;
//!
//! let config = Config::load()?;
//! println!("Connecting to {}", config.host);
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config directory name.
const CONFIG_DIR_NAME: &str = "jira-bridge";

/// Environment variable holding the Jira host.
pub const ENV_HOST: &str = "JIRA_HOST";

/// Environment variable holding the account email.
pub const ENV_EMAIL: &str = "JIRA_EMAIL";

/// Environment variable holding the API token.
pub const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";

// =============================================================================
// Configuration structures
// =============================================================================

/// Validated connection settings. The client cannot be built without all three.
#[derive(Clone, PartialEq)]
pub struct Config {
    /// Jira host, with or without scheme
    pub host: String,
    /// Account email
    pub email: String,
    /// API token
    pub api_token: String,
}

/// Raw, possibly incomplete settings as read from a file or the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("email", &self.email)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// PartialConfig implementation
// =============================================================================

impl PartialConfig {
    /// Read settings from a lookup function (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            host: read(ENV_HOST),
            email: read(ENV_EMAIL),
            api_token: read(ENV_API_TOKEN),
        }
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings from a TOML file.
    ///
    /// Returns empty settings if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = ?path, "Config file does not exist, using environment only");
            return Ok(Self::default());
        }

        debug!(path = ?path, "Loading config");

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let partial: PartialConfig = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;

        info!(path = ?path, "Config loaded successfully");
        Ok(partial)
    }

    /// Overlay `other` on top of `self`; values present in `other` win.
    pub fn merge(self, other: PartialConfig) -> Self {
        Self {
            host: other.host.or(self.host),
            email: other.email.or(self.email),
            api_token: other.api_token.or(self.api_token),
        }
    }

    /// Check that every required value is present and well-formed.
    ///
    /// Blank values count as missing, whichever source they came from. All
    /// problems are reported at once.
    pub fn validate(self) -> Result<Config> {
        let present = |v: Option<String>| v.filter(|v| !v.trim().is_empty());
        let host = present(self.host);
        let email = present(self.email);
        let api_token = present(self.api_token);

        let mut problems = Vec::new();

        if host.is_none() {
            problems.push(format!("{} is required", ENV_HOST));
        }
        match &email {
            None => problems.push(format!("{} is required", ENV_EMAIL)),
            Some(email) if !email.contains('@') => {
                problems.push(format!("{} must be a valid email", ENV_EMAIL))
            }
            Some(_) => {}
        }
        if api_token.is_none() {
            problems.push(format!("{} is required", ENV_API_TOKEN));
        }

        match (host, email, api_token) {
            (Some(host), Some(email), Some(api_token)) if problems.is_empty() => Ok(Config {
                host: host.trim().to_string(),
                email: email.trim().to_string(),
                api_token,
            }),
            _ => Err(Error::Config(problems.join("; "))),
        }
    }
}

// =============================================================================
// Config implementation
// =============================================================================

impl Config {
    /// Get the configuration directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the default configuration file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Build a config from the process environment alone.
    pub fn from_env() -> Result<Self> {
        PartialConfig::from_env().validate()
    }

    /// Load from the default file location, then apply the environment.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load from a specific file, then apply the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        PartialConfig::load_from(path)?
            .merge(PartialConfig::from_env())
            .validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
