#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{BotError, Result};
use crate::utils::validation::{validate_path, validate_required, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_API_BASE_URL: &str = "https://api.vk.com/method";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
pub const DEFAULT_SEARCH_QUERY: &str = "красивые поздравительные открытки с днем рождения";

/// Runtime configuration. Built once at startup and passed by reference to
/// every component that needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(alias = "apiVersion", default = "default_api_version")]
    pub api_version: String,
    #[serde(alias = "groupId")]
    pub group_id: String,
    #[serde(alias = "lockFile", default = "default_lock_file")]
    pub lock_file: String,
    #[serde(alias = "fromGroup", default = "default_true")]
    pub from_group: bool,
    #[serde(alias = "apiBaseUrl", default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(alias = "imagesDir", default = "default_images_dir")]
    pub images_dir: String,
    #[serde(alias = "googleSearch", default)]
    pub image_search: Option<ImageSearchConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSearchConfig {
    #[serde(default)]
    pub enable: bool,
    #[serde(alias = "apiKey", default)]
    pub api_key: Option<String>,
    #[serde(alias = "searchEngineId", default)]
    pub search_engine_id: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(alias = "fallbackToLocal", default = "default_true")]
    pub fallback_to_local: bool,
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
}

fn default_api_version() -> String {
    "5.199".to_string()
}

fn default_lock_file() -> String {
    "birthday.lock".to_string()
}

fn default_true() -> bool {
    true
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_images_dir() -> String {
    "images".to_string()
}

fn default_search_endpoint() -> String {
    DEFAULT_SEARCH_ENDPOINT.to_string()
}

impl ImageSearchConfig {
    /// Query to send, falling back to the built-in greeting-card query.
    pub fn query(&self) -> &str {
        self.query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .unwrap_or(DEFAULT_SEARCH_QUERY)
    }

    /// Both the key and the engine id, when neither is blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let key = self.api_key.as_deref().filter(|k| !k.trim().is_empty())?;
        let cx = self
            .search_engine_id
            .as_deref()
            .filter(|c| !c.trim().is_empty())?;
        Some((key, cx))
    }
}

impl BotConfig {
    /// Loads the configuration file. `.json` files are read as JSON, anything
    /// else as TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| BotError::ConfigError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        toml::from_str(&processed).map_err(|e| BotError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content)?;
        serde_json::from_str(&processed).map_err(|e| BotError::ConfigError {
            message: format!("JSON parsing error: {}", e),
        })
    }

    pub fn search_enabled(&self) -> bool {
        self.image_search.as_ref().is_some_and(|s| s.enable)
    }

    pub fn fallback_to_local(&self) -> bool {
        self.image_search
            .as_ref()
            .map(|s| s.fallback_to_local)
            .unwrap_or(true)
    }
}

/// Replaces `${VAR_NAME}` with the environment value. Unset variables stay
/// as written so validation can point at them.
fn substitute_env_vars(content: &str) -> Result<String> {
    use regex::Regex;
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| BotError::ConfigError {
        message: format!("bad placeholder pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

/// A `${VAR}` left in place means the variable was not set at load time.
fn reject_unset_placeholder(field: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(value) if value.starts_with("${") => Err(BotError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: "environment variable is not set".to_string(),
        }),
        _ => Ok(()),
    }
}

impl Validate for BotConfig {
    fn validate(&self) -> Result<()> {
        validate_required("access_token", &self.access_token)?;
        reject_unset_placeholder("access_token", Some(&self.access_token))?;
        validate_required("api_version", &self.api_version)?;
        validate_required("group_id", &self.group_id)?;
        validate_path("lock_file", &self.lock_file)?;
        validate_path("images_dir", &self.images_dir)?;
        validate_url("api_base_url", &self.api_base_url)?;

        if let Some(search) = self.image_search.as_ref().filter(|s| s.enable) {
            validate_url("image_search.endpoint", &search.endpoint)?;
            reject_unset_placeholder("image_search.api_key", search.api_key.as_deref())?;
            reject_unset_placeholder(
                "image_search.search_engine_id",
                search.search_engine_id.as_deref(),
            )?;
        }

        Ok(())
    }
}
