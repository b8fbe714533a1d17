//! Configuration loader with dual-location support
//!
//! Loads configuration from:
//! 1. Default values
//! 2. User-level config: ~/.nuop/nuop.toml
//! 3. Project-level config: ./.nuop/nuop.toml
//! 4. `DB_*` / `OLLAMA_*` environment variables
//!
//! Later sources override earlier ones key by key.

use crate::config::schema::NuopConfig;
use crate::error::{NuopError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use toml::Table;
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = ".nuop";
const CONFIG_FILE: &str = "nuop.toml";

/// Configuration loader that handles both user and project configs
pub struct ConfigLoader {
    user_config_path: Option<PathBuf>,
    project_config_path: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self {
            user_config_path: dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE)),
            project_config_path: PathBuf::from(CONFIG_DIR).join(CONFIG_FILE),
        }
    }

    /// Loader reading from explicit paths
    pub fn with_paths(user: Option<PathBuf>, project: PathBuf) -> Self {
        Self {
            user_config_path: user,
            project_config_path: project,
        }
    }

    /// Load configuration, reading overrides from the process environment
    pub async fn load(&self) -> Result<NuopConfig> {
        self.load_with_env(|key| std::env::var(key).ok()).await
    }

    /// Load configuration with an explicit environment lookup
    pub async fn load_with_env<F>(&self, lookup: F) -> Result<NuopConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut merged = Table::new();

        let sources = self
            .user_config_path
            .iter()
            .chain(std::iter::once(&self.project_config_path));
        for path in sources {
            if !path.exists() {
                debug!(path = %path.display(), "Config file not present");
                continue;
            }
            let table = Self::read_table(path).await?;
            debug!(path = %path.display(), "Loaded config file");
            merge_tables(&mut merged, table);
        }

        let mut config: NuopConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|e| NuopError::Config(format!("Failed to parse config: {}", e)))?;

        config.resolve_env_vars(&lookup);
        config.apply_env_overrides(&lookup)?;

        if config.database.password.is_none() {
            warn!("No database password configured");
        }

        info!(
            host = %config.database.host,
            database = %config.database.name,
            model = %config.llm.model,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load a single file on top of defaults
    pub async fn load_from_path(&self, path: &Path) -> Result<NuopConfig> {
        if !path.exists() {
            return Err(NuopError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let table = Self::read_table(path).await?;
        toml::Value::Table(table)
            .try_into()
            .map_err(|e| NuopError::Config(format!("Failed to parse config: {}", e)))
    }

    async fn read_table(path: &Path) -> Result<Table> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| NuopError::Config(format!("Failed to read config: {}", e)))?;

        toml::from_str::<Table>(&content)
            .map_err(|e| NuopError::Config(format!("Failed to parse config {}: {}", path.display(), e)))
    }

    pub fn user_config_path(&self) -> Option<&Path> {
        self.user_config_path.as_deref()
    }

    pub fn project_config_path(&self) -> &Path {
        &self.project_config_path
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively merge `overlay` into `base`; overlay scalars and arrays win
fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
