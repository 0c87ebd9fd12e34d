//! Runtime configuration loaded from the environment (and `.env` via dotenv).

use crate::error::{AgentError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub name: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    /// Full connection string; takes precedence over the individual fields.
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn connection_url(&self) -> String {
        if let Some(ref url) = self.url {
            return url.clone();
        }
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            name: "postgres".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            port: 5432,
            url: None,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AgentConfig {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

impl AgentConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AgentConfig::default();

        let database = DatabaseConfig {
            host: lookup("DB_HOST").unwrap_or(defaults.database.host),
            name: lookup("DB_NAME").unwrap_or(defaults.database.name),
            user: lookup("DB_USER").unwrap_or(defaults.database.user),
            password: lookup("DB_PASSWORD").unwrap_or(defaults.database.password),
            port: parse_or(&lookup, "DB_PORT", defaults.database.port)?,
            url: lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()),
            max_connections: parse_or(
                &lookup,
                "DB_MAX_CONNECTIONS",
                defaults.database.max_connections,
            )?,
            acquire_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.database.acquire_timeout.as_secs(),
            )?),
        };

        let llm = LlmConfig {
            api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            model: lookup("OPENAI_MODEL").unwrap_or(defaults.llm.model),
            base_url: lookup("OPENAI_BASE_URL").unwrap_or(defaults.llm.base_url),
            temperature: parse_or(&lookup, "OPENAI_TEMPERATURE", defaults.llm.temperature)?,
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "OPENAI_TIMEOUT_SECS",
                defaults.llm.request_timeout.as_secs(),
            )?),
        };

        let logging = LoggingConfig {
            log_dir: lookup("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.logging.log_dir),
        };

        Ok(Self { database, llm, logging })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| {
            AgentError::Config(format!("invalid value '{}' for {}: {}", raw, key, e))
        }),
        None => Ok(default),
    }
}
