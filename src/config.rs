//! Configuration management for MailPal
//!
//! Handles paths, environment variables, and configuration loading.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, MailPalError, Result};

/// Default address for the HTTP front end
pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:5000";

/// Configuration for MailPal
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for storing configuration files
    pub config_dir: PathBuf,

    /// Path to OAuth keys file (client credentials)
    pub oauth_path: PathBuf,

    /// Path to stored credentials (access/refresh tokens)
    pub credentials_path: PathBuf,

    /// OAuth callback URL
    pub oauth_callback_url: String,

    /// OAuth callback port
    pub oauth_callback_port: u16,

    /// Gmail API scopes
    pub scopes: Vec<String>,

    /// Gmail REST base URL
    pub gmail_api_base_url: String,

    /// Address the HTTP front end binds to
    pub server_addr: SocketAddr,

    /// Directory where feedback records are written
    pub feedback_dir: PathBuf,

    /// Language model settings
    pub llm: LlmConfig,
}

/// Settings for the chat-completions endpoint
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Bearer key; `serve` refuses to start without one
    pub api_key: Option<String>,

    /// Chat completions URL
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Completion token limit
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: llm::DEFAULT_ENDPOINT.to_string(),
            model: llm::DEFAULT_MODEL.to_string(),
            temperature: llm::DEFAULT_TEMPERATURE,
            max_tokens: llm::DEFAULT_MAX_TOKENS,
        }
    }
}

impl LlmConfig {
    /// Read the language model settings from the environment
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let api_key = env_var("MAILPAL_LLM_API_KEY")
            .or_else(|| env_var("AI_API_KEY"))
            .filter(|k| !k.trim().is_empty());

        let temperature = match env_var("MAILPAL_LLM_TEMPERATURE") {
            Some(raw) => raw.parse().map_err(|_| {
                MailPalError::Config(ConfigError::InvalidConfig {
                    message: format!("MAILPAL_LLM_TEMPERATURE is not a number: {}", raw),
                })
            })?,
            None => defaults.temperature,
        };

        let max_tokens = match env_var("MAILPAL_LLM_MAX_TOKENS") {
            Some(raw) => raw.parse().map_err(|_| {
                MailPalError::Config(ConfigError::InvalidConfig {
                    message: format!("MAILPAL_LLM_MAX_TOKENS is not a positive integer: {}", raw),
                })
            })?,
            None => defaults.max_tokens,
        };

        Ok(Self {
            api_key,
            endpoint: env_var("MAILPAL_LLM_ENDPOINT").unwrap_or(defaults.endpoint),
            model: env_var("MAILPAL_LLM_MODEL").unwrap_or(defaults.model),
            temperature,
            max_tokens,
        })
    }

    /// The API key, or a configuration error naming the variable to set
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            MailPalError::Config(ConfigError::MissingEnvVar {
                var: "MAILPAL_LLM_API_KEY".to_string(),
            })
        })
    }
}

impl Config {
    /// Create a new configuration with default paths
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        let mut config = Self::with_config_dir(config_dir);

        if let Some(path) = env_var("MAILPAL_OAUTH_PATH") {
            config.oauth_path = PathBuf::from(path);
        }

        if let Some(path) = env_var("MAILPAL_CREDENTIALS_PATH") {
            config.credentials_path = PathBuf::from(path);
        }

        if let Some(port) = env_var("MAILPAL_OAUTH_PORT") {
            let port = parse_port(&port)?;
            config.oauth_callback_port = port;
            config.oauth_callback_url = callback_url(port);
        }

        if let Some(base) = env_var("MAILPAL_GMAIL_API_BASE") {
            config.gmail_api_base_url = base.trim_end_matches('/').to_string();
        }

        if let Some(addr) = env_var("MAILPAL_ADDR") {
            config.server_addr = parse_addr(&addr)?;
        }

        if let Some(dir) = env_var("MAILPAL_FEEDBACK_DIR") {
            config.feedback_dir = PathBuf::from(dir);
        }

        config.llm = LlmConfig::from_env()?;

        Ok(config)
    }

    /// Configuration rooted at `config_dir`, ignoring the environment
    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let oauth_callback_port = 3000;

        Self {
            oauth_path: config_dir.join("gcp-oauth.keys.json"),
            credentials_path: config_dir.join("credentials.json"),
            feedback_dir: config_dir.join("feedback"),
            config_dir,
            oauth_callback_url: callback_url(oauth_callback_port),
            oauth_callback_port,
            scopes: vec!["https://www.googleapis.com/auth/gmail.modify".to_string()],
            gmail_api_base_url: gmail::API_BASE_URL.to_string(),
            server_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            llm: LlmConfig::default(),
        }
    }

    /// Get the configuration directory, creating it if necessary
    fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| {
                MailPalError::Config(ConfigError::DirNotFound {
                    path: "~".to_string(),
                })
            })?
            .join(".mailpal");

        ensure_dir(&config_dir)?;
        Ok(config_dir)
    }

    /// Check if OAuth keys file exists
    pub fn oauth_keys_exist(&self) -> bool {
        self.oauth_path.exists()
    }

    /// Check if credentials (tokens) exist
    pub fn credentials_exist(&self) -> bool {
        self.credentials_path.exists()
    }

    /// Try to find OAuth keys in current directory and copy to config dir
    pub fn find_and_copy_oauth_keys(&self) -> Result<bool> {
        let local_oauth = std::env::current_dir()
            .map_err(MailPalError::Io)?
            .join("gcp-oauth.keys.json");

        if local_oauth.exists() && !self.oauth_keys_exist() {
            std::fs::copy(&local_oauth, &self.oauth_path).map_err(MailPalError::Io)?;
            return Ok(true);
        }

        Ok(false)
    }
}

/// Create `dir` (and parents) if it does not exist yet
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|_| {
            MailPalError::Config(ConfigError::DirCreationFailed {
                path: dir.display().to_string(),
            })
        })?;
    }
    Ok(())
}

/// Parse a `host:port` bind address
pub fn parse_addr(raw: &str) -> Result<SocketAddr> {
    raw.parse().map_err(|_| {
        MailPalError::Config(ConfigError::InvalidConfig {
            message: format!("invalid bind address: {}", raw),
        })
    })
}

/// Parse the OAuth callback port
pub fn parse_port(raw: &str) -> Result<u16> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(MailPalError::Config(ConfigError::InvalidConfig {
            message: format!("MAILPAL_OAUTH_PORT is not a valid port: {}", raw),
        })),
    }
}

fn callback_url(port: u16) -> String {
    format!("http://localhost:{}/oauth2callback", port)
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Gmail API constants
pub mod gmail {
    /// Base URL for Gmail API
    pub const API_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

    /// User ID for the authenticated user
    pub const USER_ID: &str = "me";
}

/// Language model defaults
pub mod llm {
    pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
    pub const DEFAULT_MODEL: &str = "gpt-4";
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    pub const DEFAULT_MAX_TOKENS: u32 = 1000;
}
