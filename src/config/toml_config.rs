use crate::utils::error::{AppError, Result};
use crate::utils::validation::{self, Validate};
use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "legislator-finance.toml";
pub const API_KEY_ENV: &str = "OPENSECRETS_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub cycle: u16,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.opensecrets.org/api/".to_string(),
            api_key: None,
            cycle: current_cycle(),
            timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub selection_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            selection_path: PathBuf::from(".legislator-finance/selection.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub chart_width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { chart_width: 40 }
    }
}

/// The election cycle containing today: the current year, rounded up to even.
pub fn current_cycle() -> u16 {
    let year = chrono::Local::now().year();
    let cycle = if year % 2 == 0 { year } else { year + 1 };
    u16::try_from(cycle).unwrap_or(2024)
}

impl AppConfig {
    /// Load from an explicit file, or from `legislator-finance.toml` in the
    /// working directory when present, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        tracing::debug!("Loading config from {}", path.as_ref().display());
        let content = std::fs::read_to_string(&path).map_err(AppError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the environment value; unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Configured key, else `OPENSECRETS_API_KEY`. Unresolved `${..}`
    /// placeholders and blank values count as absent.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty() && !k.starts_with("${"))
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        let key = self.resolved_api_key();
        let key = validation::validate_required_field("api.api_key", &key)?;
        validation::validate_non_empty_string("api.api_key", key)?;
        validation::validate_cycle("api.cycle", self.api.cycle)?;
        validation::validate_range("api.timeout_seconds", self.api.timeout_seconds, 1, 300)?;
        validation::validate_path(
            "storage.selection_path",
            &self.storage.selection_path.to_string_lossy(),
        )?;
        validation::validate_range("display.chart_width", self.display.chart_width, 10, 200)?;
        Ok(())
    }
}
