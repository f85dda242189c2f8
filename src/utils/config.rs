//! TOML-based configuration for Joigo
//!
//! Configuration is read from `joigo.toml` (every section optional) and then
//! overlaid with environment variables, which may come from a `.env` file:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `JOIGO_API_URL` / `VITE_API_URL` | `api.base_url` |
//! | `SUPABASE_URL` | `supabase.url` |
//! | value of `supabase.anon_key_env` | Supabase anon key |
//! | `JOIGO_LANGUAGE` | `ui.language` |

use crate::i18n::Language;
use crate::models::Currency;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure loaded from joigo.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoigoConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub supabase: SupabaseConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

// ============= Backend API Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout. Unset means the transport default (no client timeout).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

// ============= Identity Provider Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyzcompany.supabase.co`
    #[serde(default)]
    pub url: Option<String>,

    /// Environment variable name containing the anon key
    #[serde(default = "default_anon_key_env")]
    pub anon_key_env: String,

    /// Where the OAuth provider sends the browser back to
    #[serde(default = "default_redirect_to")]
    pub redirect_to: String,

    /// Resolved anon key (never read from the file)
    #[serde(skip)]
    pub anon_key: Option<String>,
}

fn default_anon_key_env() -> String {
    "SUPABASE_ANON_KEY".to_string()
}

fn default_redirect_to() -> String {
    "http://localhost:8080".to_string()
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key_env: default_anon_key_env(),
            redirect_to: default_redirect_to(),
            anon_key: None,
        }
    }
}

impl SupabaseConfig {
    /// True when both the project URL and the anon key are known.
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.anon_key.is_some()
    }
}

// ============= Local Storage Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("joigo")
        .join("storage.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// ============= Display Configuration =============

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub language: Language,

    #[serde(default)]
    pub currency: Currency,
}

// ============= Configuration Loading =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for crate::types::AppError {
    fn from(e: ConfigError) -> Self {
        crate::types::AppError::Config(e.to_string())
    }
}

impl JoigoConfig {
    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// A missing file is not an error: defaults are used instead.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            Self::from_toml(&content)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text without touching the environment.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay environment variables onto the loaded values.
    pub fn apply_env(&mut self) {
        if let Some(url) = env::var("JOIGO_API_URL")
            .ok()
            .or_else(|| env::var("VITE_API_URL").ok())
        {
            self.api.base_url = url;
        }
        if let Ok(url) = env::var("SUPABASE_URL") {
            self.supabase.url = Some(url);
        }
        self.supabase.anon_key = env::var(&self.supabase.anon_key_env).ok();
        if let Ok(lang) = env::var("JOIGO_LANGUAGE") {
            match lang.parse() {
                Ok(language) => self.ui.language = language,
                Err(_) => tracing::warn!("Ignoring unknown JOIGO_LANGUAGE '{}'", lang),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(ConfigError::ValidationError(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if let Some(ref url) = self.supabase.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::ValidationError(format!(
                    "supabase.url must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// Serialise the effective configuration (the anon key is never written).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> String {
        r#"
[api]
base_url = "https://api.joigo.vn"
timeout_secs = 20

[supabase]
url = "https://abc.supabase.co"
anon_key_env = "TEST_JOIGO_ANON_KEY"

[storage]
path = "./data/storage.json"

[logging]
level = "debug"
format = "json"

[ui]
language = "VI"
currency = "VND"
"#
        .to_string()
    }

    #[test]
    fn test_parse_config() {
        let config = JoigoConfig::from_toml(&create_test_config()).expect("Failed to parse config");

        assert_eq!(config.api.base_url, "https://api.joigo.vn");
        assert_eq!(config.api.timeout(), Some(Duration::from_secs(20)));
        assert_eq!(config.supabase.url.as_deref(), Some("https://abc.supabase.co"));
        assert_eq!(config.supabase.anon_key_env, "TEST_JOIGO_ANON_KEY");
        assert_eq!(config.storage.path, PathBuf::from("./data/storage.json"));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.ui.language, Language::Vi);
        assert_eq!(config.ui.currency, Currency::Vnd);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = JoigoConfig::from_toml("").unwrap();

        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.timeout(), None);
        assert_eq!(config.supabase.anon_key_env, "SUPABASE_ANON_KEY");
        assert!(!config.supabase.is_configured());
        assert_eq!(config.ui.language, Language::En);
        assert_eq!(config.ui.currency, Currency::Usd);
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let config = JoigoConfig::from_toml("[api]\nbase_url = \"ftp://example\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let config = JoigoConfig::from_toml("[logging]\nformat = \"xml\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serialised_config_omits_anon_key() {
        let mut config = JoigoConfig::default();
        config.supabase.anon_key = Some("secret-anon-key".to_string());

        let rendered = config.to_toml();
        assert!(!rendered.contains("secret-anon-key"));
        assert!(rendered.contains("base_url"));
    }
}
