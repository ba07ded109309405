//! Configuration file loading and environment variable handling.
//!
//! Precedence: CLI args > Environment vars > Config file > Defaults

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use omnicalc_core::format::DEFAULT_PRECISION;
use omnicalc_core::history::DEFAULT_HISTORY_LIMIT;
use omnicalc_core::{OpenErApi, SessionConfig};

/// Default config file content for `--config-init`.
pub const DEFAULT_CONFIG: &str = r#"# Omnicalc configuration
# See: omnicalc --help for all options

# Fraction digits shown for results
precision = 10

# Completed calculations kept in session history
history_limit = 50

# Default pair for `omnicalc convert` when FROM/TO are omitted
base_currency = "USD"
target_currency = "EUR"

# Exchange rate fetch timeout in seconds
rate_timeout = 10

# Exchange rate endpoint (the base code is appended as a path segment)
rates_url = "https://open.er-api.com/v6/latest"

# Disable colored output
no_color = false
"#;

/// Configuration loaded from file and environment.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub precision: Option<usize>,
    pub history_limit: Option<usize>,
    pub base_currency: Option<String>,
    pub target_currency: Option<String>,
    pub rate_timeout: Option<u64>,
    pub rates_url: Option<String>,
    pub no_color: Option<bool>,
}

impl Config {
    /// Get the config file path.
    ///
    /// - Linux: `~/.config/omnicalc/config.toml`
    /// - macOS: `~/Library/Application Support/omnicalc/config.toml`
    /// - Windows: `%APPDATA%\omnicalc\config.toml`
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("omnicalc").join("config.toml"))
    }

    /// Load config from the standard location. Returns default if the file
    /// doesn't exist.
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load config from `path`, warning and falling back to defaults if it
    /// does not parse.
    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            return Self::default();
        };

        toml::from_str(&contents).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Read value from environment variable.
    fn env_var<T: std::str::FromStr>(name: &str) -> Option<T> {
        std::env::var(name).ok()?.parse().ok()
    }

    /// Get precision with precedence: env > config > default.
    pub fn precision(&self) -> usize {
        Self::env_var("OMNICALC_PRECISION")
            .or(self.precision)
            .unwrap_or(DEFAULT_PRECISION)
    }

    /// Get history_limit with precedence: env > config > default.
    pub fn history_limit(&self) -> usize {
        Self::env_var("OMNICALC_HISTORY_LIMIT")
            .or(self.history_limit)
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
    }

    pub fn base_currency(&self) -> String {
        Self::env_var::<String>("OMNICALC_BASE_CURRENCY")
            .or_else(|| self.base_currency.clone())
            .unwrap_or_else(|| "USD".to_string())
            .to_uppercase()
    }

    pub fn target_currency(&self) -> String {
        Self::env_var::<String>("OMNICALC_TARGET_CURRENCY")
            .or_else(|| self.target_currency.clone())
            .unwrap_or_else(|| "EUR".to_string())
            .to_uppercase()
    }

    /// Get rate_timeout (seconds) with precedence: env > config > default.
    pub fn rate_timeout(&self) -> u64 {
        Self::env_var("OMNICALC_RATE_TIMEOUT")
            .or(self.rate_timeout)
            .unwrap_or(OpenErApi::DEFAULT_TIMEOUT_SECS)
    }

    pub fn rates_url(&self) -> String {
        std::env::var("OMNICALC_RATES_URL")
            .ok()
            .or_else(|| self.rates_url.clone())
            .unwrap_or_else(|| OpenErApi::DEFAULT_ENDPOINT.to_string())
    }

    /// Get no_color with precedence: env > config > default.
    ///
    /// Respects the `NO_COLOR` standard (https://no-color.org/).
    pub fn no_color(&self) -> bool {
        // NO_COLOR is a standard - presence means disable color
        if std::env::var("NO_COLOR").is_ok() {
            return true;
        }
        if std::env::var("OMNICALC_NO_COLOR").is_ok() {
            return true;
        }
        self.no_color.unwrap_or(false)
    }

    /// Session tunables for a new calculator.
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            history_limit: self.history_limit(),
            precision: self.precision(),
        }
    }

    /// Rate provider built from the endpoint and timeout settings.
    pub fn rate_provider(&self) -> OpenErApi {
        OpenErApi::new(self.rates_url(), Duration::from_secs(self.rate_timeout()))
    }
}

/// Create a default config file at the standard location.
pub fn init_config() -> Result<PathBuf, String> {
    let path = Config::path().ok_or("Cannot determine config directory")?;
    init_config_at(&path)?;
    Ok(path)
}

fn init_config_at(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Err(format!("Config file already exists: {}", path.display()));
    }

    // Create parent directory
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create directory: {}", e))?;
    }

    fs::write(path, DEFAULT_CONFIG).map_err(|e| format!("Failed to write config: {}", e))
}
