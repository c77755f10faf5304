use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::cache::DEFAULT_SLOT;
use crate::error::{AppError, AppResult};

lazy_static! {
    static ref ENV_VAR_PATTERN: Regex = Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").unwrap();
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GatewayType {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GatewayConfig {
    #[serde(rename = "type", default)]
    pub gateway_type: GatewayType,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            gateway_type: GatewayType::Memory,
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(rename = "type", default)]
    pub cache_type: CacheType,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_slot")]
    pub slot: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: CacheType::Memory,
            path: None,
            slot: default_slot(),
        }
    }
}

fn default_slot() -> String {
    DEFAULT_SLOT.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from YAML file
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> AppResult<Self> {
        let path = config_path.as_ref();

        if !path.exists() {
            return Err(AppError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text, expanding environment variables first
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        let expanded = Self::expand_env_vars(content)?;
        let config: AppConfig = serde_yaml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// File-backed gateway and cache next to the working directory
    pub fn default_config() -> Self {
        AppConfig {
            gateway: GatewayConfig {
                gateway_type: GatewayType::Sqlite,
                url: Some("sqlite:roster.db".to_string()),
                max_connections: default_max_connections(),
            },
            cache: CacheConfig {
                cache_type: CacheType::Sqlite,
                path: Some("roster-cache.db".to_string()),
                slot: default_slot(),
            },
            logging: LoggingConfig::default(),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.gateway.gateway_type == GatewayType::Sqlite && self.gateway.url.is_none() {
            return Err(AppError::Configuration(
                "gateway.url is required when gateway type is 'sqlite'".to_string(),
            ));
        }
        if self.cache.cache_type == CacheType::Sqlite && self.cache.path.is_none() {
            return Err(AppError::Configuration(
                "cache.path is required when cache type is 'sqlite'".to_string(),
            ));
        }
        if self.cache.slot.trim().is_empty() {
            return Err(AppError::Configuration(
                "cache.slot must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Expand environment variables in format ${VAR_NAME} or ${VAR_NAME:-default}
    fn expand_env_vars(content: &str) -> AppResult<String> {
        let mut missing: Option<String> = None;

        let expanded = ENV_VAR_PATTERN.replace_all(content, |caps: &Captures| {
            let name = &caps[1];
            match (std::env::var(name), caps.get(2)) {
                (Ok(value), _) => value,
                (Err(_), Some(default)) => default.as_str().to_string(),
                (Err(_), None) => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(name) => Err(AppError::Configuration(format!(
                "Environment variable {} not found and no default provided",
                name
            ))),
            None => Ok(expanded.into_owned()),
        }
    }
}
