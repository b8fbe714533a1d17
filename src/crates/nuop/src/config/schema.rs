//! Configuration schema for nuop

use crate::error::{NuopError, Result};
use crate::models::StorageTier;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main nuop configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NuopConfig {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Report configuration
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL host
    #[serde(default = "default_db_host")]
    pub host: String,

    /// PostgreSQL port
    #[serde(default = "default_db_port")]
    pub port: u16,

    /// Database name
    #[serde(default = "default_db_name")]
    pub name: String,

    /// User name
    #[serde(default = "default_db_user")]
    pub user: String,

    /// Password (supports environment variable interpolation)
    #[serde(default)]
    pub password: Option<String>,

    /// Pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Upper bound for a single statement, in seconds
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_secs: u64,

    /// Operation tiers, in lookup order
    #[serde(default = "StorageTier::defaults")]
    pub tiers: Vec<StorageTier>,
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "spb".to_string()
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    3
}

fn default_statement_timeout() -> u64 {
    30
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_db_host(),
            port: default_db_port(),
            name: default_db_name(),
            user: default_db_user(),
            password: None,
            max_connections: default_max_connections(),
            statement_timeout_secs: default_statement_timeout(),
            tiers: StorageTier::defaults(),
        }
    }
}

impl DatabaseConfig {
    /// Statement timeout as a duration
    pub fn statement_timeout(&self) -> Duration {
        Duration::from_secs(self.statement_timeout_secs)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider; only "ollama" is supported
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Provider base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Temperature for generation
    #[serde(default)]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: 0.0,
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl LlmConfig {
    /// Provider configuration for the local client
    pub fn to_local(&self) -> llm::LocalLlmConfig {
        llm::LocalLlmConfig::new(&self.base_url, &self.model)
            .with_temperature(self.temperature)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory reports are written to
    #[serde(default = "default_report_dir")]
    pub directory: PathBuf,
}

fn default_report_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            directory: default_report_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "compact", "pretty", "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Environment variables that override file configuration
pub const ENV_OVERRIDES: &[&str] = &[
    "DB_HOST",
    "DB_PORT",
    "DB_NAME",
    "DB_USER",
    "DB_PASSWORD",
    "OLLAMA_BASE_URL",
    "OLLAMA_MODEL",
];

impl NuopConfig {
    /// Apply `DB_*` / `OLLAMA_*` overrides from `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("DB_HOST") {
            self.database.host = host;
        }
        if let Some(port) = lookup("DB_PORT") {
            self.database.port = port
                .trim()
                .parse()
                .map_err(|_| NuopError::Config(format!("DB_PORT is not a port: '{}'", port)))?;
        }
        if let Some(name) = lookup("DB_NAME") {
            self.database.name = name;
        }
        if let Some(user) = lookup("DB_USER") {
            self.database.user = user;
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            self.database.password = Some(password);
        }
        if let Some(base_url) = lookup("OLLAMA_BASE_URL") {
            self.llm.base_url = base_url;
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.llm.model = model;
        }
        Ok(())
    }

    /// Resolve environment variables in configuration values
    ///
    /// Supports ${VAR_NAME} syntax in string fields
    pub fn resolve_env_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let expand = |value: &str| -> String {
            if value.starts_with("${") && value.ends_with('}') {
                let var_name = &value[2..value.len() - 1];
                lookup(var_name).unwrap_or_else(|| value.to_string())
            } else {
                value.to_string()
            }
        };

        self.database.host = expand(&self.database.host);
        self.database.name = expand(&self.database.name);
        self.database.user = expand(&self.database.user);
        if let Some(ref password) = self.database.password {
            self.database.password = Some(expand(password));
        }
        self.llm.base_url = expand(&self.llm.base_url);
        self.llm.model = expand(&self.llm.model);
    }

    /// Check the configuration before anything connects
    pub fn validate(&self) -> Result<()> {
        if self.database.tiers.is_empty() {
            return Err(NuopError::Config("at least one tier is required".to_string()));
        }
        for tier in &self.database.tiers {
            tier.validate()?;
        }
        if self.database.max_connections == 0 {
            return Err(NuopError::Config("max_connections must be positive".to_string()));
        }
        if self.llm.provider != "ollama" {
            return Err(NuopError::Config(format!(
                "unsupported LLM provider '{}'",
                self.llm.provider
            )));
        }
        self.llm
            .to_local()
            .validate()
            .map_err(|e| NuopError::Config(e.to_string()))?;
        Ok(())
    }
}
