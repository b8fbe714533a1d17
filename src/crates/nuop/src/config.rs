//! Configuration management for nuop
//!
//! Supports dual-location configuration:
//! - User-level: ~/.nuop/nuop.toml
//! - Project-level: ./.nuop/nuop.toml
//!
//! Project-level config overrides user-level config, and the `DB_*` /
//! `OLLAMA_*` environment variables override both.

mod loader;
mod schema;

pub use loader::ConfigLoader;
pub use schema::{DatabaseConfig, LlmConfig, LoggingConfig, NuopConfig, ReportConfig, ENV_OVERRIDES};

use crate::Result;

/// Load configuration from every source
pub async fn load_config() -> Result<NuopConfig> {
    let config = ConfigLoader::new().load().await?;
    config.validate()?;
    Ok(config)
}
