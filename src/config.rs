//! MediSeek Configuration Module
//!
//! Config is stored in `~/.config/mediseek/config.toml` (or `$MEDISEEK_CONFIG`).
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Environment variables (`GEMINI_API_KEY`, `OPENAI_API_KEY`, `ADMIN_PASSWORD`, ...)
//! 2. Config file
//! 3. Defaults

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{MediSeekError, Result};
use crate::i18n::Language;

/// Env var pointing at an alternate config file
pub const CONFIG_PATH_ENV: &str = "MEDISEEK_CONFIG";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 7;
const DEFAULT_BLOG_PATH: &str = "data/blogs.json";
const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediSeekConfig {
    #[serde(default)]
    pub ai: AiSettings,

    #[serde(default)]
    pub app: AppSettings,

    #[serde(default)]
    pub blog: BlogSettings,

    #[serde(default)]
    pub admin: AdminSettings,
}

/// Model backend settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiSettings {
    /// Provider name (gemini, openai, mock)
    pub provider: Option<String>,

    /// Model override (defaults per provider)
    pub model: Option<String>,

    /// Google AI Studio key
    pub gemini_api_key: Option<String>,

    /// OpenAI key (sk-proj-... or sk-...)
    pub openai_api_key: Option<String>,

    /// HTTP timeout for a single model call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    pub temperature: Option<f32>,

    /// Cap on generated tokens per call (backend default when unset)
    pub max_tokens: Option<u32>,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            gemini_api_key: None,
            openai_api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    /// Language used when a submission carries none (or an unsupported one)
    #[serde(default)]
    pub default_language: Language,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogSettings {
    /// JSON file holding the posts
    #[serde(default = "default_blog_path")]
    pub data_path: PathBuf,
}

impl Default for BlogSettings {
    fn default() -> Self {
        Self {
            data_path: default_blog_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminSettings {
    #[serde(default = "default_admin_username")]
    pub username: String,

    /// No default: login is refused until a password is configured
    pub password: Option<String>,

    /// HMAC key for session tokens
    pub session_secret: Option<String>,

    #[serde(default = "default_session_max_age")]
    pub session_max_age_secs: u64,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            password: None,
            session_secret: None,
            session_max_age_secs: DEFAULT_SESSION_MAX_AGE_SECS,
        }
    }
}

impl AdminSettings {
    /// Expected password, once both the password and the session secret are set
    ///
    /// Without a persistent secret a token issued by one process would be
    /// rejected by the next one, so login stays disabled.
    pub fn login_password(&self) -> Result<&str> {
        match (self.password.as_deref(), self.session_secret.as_deref()) {
            (Some(password), Some(secret)) if !secret.is_empty() => Ok(password),
            _ => Err(MediSeekError::AdminNotConfigured),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_session_max_age() -> u64 {
    DEFAULT_SESSION_MAX_AGE_SECS
}

fn default_blog_path() -> PathBuf {
    PathBuf::from(DEFAULT_BLOG_PATH)
}

fn default_admin_username() -> String {
    DEFAULT_ADMIN_USERNAME.to_string()
}

impl MediSeekConfig {
    /// Get the config directory path
    ///
    /// Returns `~/.config/mediseek/` on Unix, `%APPDATA%/mediseek/` on Windows
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mediseek")
    }

    /// Get the config file path (`$MEDISEEK_CONFIG` wins)
    pub fn config_path() -> PathBuf {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => Self::config_dir().join("config.toml"),
        }
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file
    ///
    /// Returns default config if file doesn't exist.
    /// Returns error if file exists but is malformed.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| MediSeekError::Config {
            reason: format!("Failed to read config file: {}", e),
        })?;

        toml::from_str(&content).map_err(|e| MediSeekError::Config {
            reason: format!("Failed to parse config file: {}", e),
        })
    }

    /// Save configuration to a file, creating parent directories
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| MediSeekError::Config {
                    reason: format!("Failed to create config directory: {}", e),
                })?;
            }
        }

        let content = toml::to_string_pretty(self).map_err(|e| MediSeekError::Config {
            reason: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| MediSeekError::Config {
            reason: format!("Failed to write config file: {}", e),
        })?;

        Ok(())
    }

    /// Merge with process environment variables
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Merge with an arbitrary variable source (empty values are ignored)
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(key) = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")) {
            self.ai.gemini_api_key = Some(key);
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.ai.openai_api_key = Some(key);
        }
        if let Some(provider) = get("MEDISEEK_PROVIDER") {
            self.ai.provider = Some(provider);
        }
        if let Some(model) = get("MEDISEEK_MODEL") {
            self.ai.model = Some(model);
        }
        if let Some(lang) = get("MEDISEEK_LANGUAGE").and_then(|c| Language::from_code(&c)) {
            self.app.default_language = lang;
        }
        if let Some(path) = get("MEDISEEK_BLOG_PATH") {
            self.blog.data_path = PathBuf::from(path);
        }
        if let Some(username) = get("ADMIN_USERNAME") {
            self.admin.username = username;
        }
        if let Some(password) = get("ADMIN_PASSWORD") {
            self.admin.password = Some(password);
        }
        if let Some(secret) = get("MEDISEEK_SESSION_SECRET") {
            self.admin.session_secret = Some(secret);
        }

        self
    }

    /// Provider to use (explicit setting, else auto-detected from keys)
    pub fn provider_name(&self) -> &str {
        if let Some(provider) = self.ai.provider.as_deref() {
            return provider;
        }
        if self.ai.gemini_api_key.is_some() {
            "gemini"
        } else if self.ai.openai_api_key.is_some() {
            "openai"
        } else {
            "gemini"
        }
    }

    pub fn gemini_key(&self) -> Option<&str> {
        self.ai.gemini_api_key.as_deref()
    }

    pub fn openai_key(&self) -> Option<&str> {
        self.ai.openai_api_key.as_deref()
    }
}

/// Mask an API key for display
///
/// Shows first N chars + asterisks, e.g. "AIzaSy***"
pub fn mask_api_key(key: &str, visible_chars: usize) -> String {
    if key.is_empty() {
        return String::new();
    }

    let visible: String = key.chars().take(visible_chars).collect();
    format!("{}***", visible)
}
