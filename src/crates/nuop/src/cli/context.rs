//! Application context for CLI commands
//!
//! Builds the database pool, the model client and the pipeline from a loaded
//! configuration.

use crate::config::NuopConfig;
use crate::db::Database;
use crate::error::{NuopError, Result};
use crate::pipeline::Pipeline;
use crate::report::ReportWriter;
use crate::repositories::OperationRepository;
use llm::local::OllamaClient;
use std::sync::Arc;
use tracing::info;

/// Everything a command needs, wired once per process
pub struct AppContext {
    config: NuopConfig,
    database: Arc<Database>,
    store: Arc<OperationRepository>,
    llm: Arc<OllamaClient>,
    pipeline: Pipeline,
}

impl AppContext {
    /// Build the context. Nothing is contacted yet; the pool is lazy.
    pub fn build(config: NuopConfig) -> Result<Self> {
        config.validate()?;

        let database = Arc::new(Database::connect(&config.database)?);
        let store = Arc::new(OperationRepository::new(database.clone()));
        let llm = Arc::new(
            OllamaClient::new(config.llm.to_local())
                .map_err(|e| NuopError::Config(format!("LLM client: {}", e)))?,
        );

        let pipeline = Pipeline::new(
            llm.clone(),
            store.clone(),
            config.database.tiers.clone(),
            ReportWriter::new(config.report.directory.clone()),
        );

        info!(
            tiers = config.database.tiers.len(),
            model = %config.llm.model,
            "Application context ready"
        );

        Ok(Self {
            config,
            database,
            store,
            llm,
            pipeline,
        })
    }

    pub fn config(&self) -> &NuopConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn store(&self) -> &OperationRepository {
        &self.store
    }

    pub fn llm(&self) -> &OllamaClient {
        &self.llm
    }

    /// Release pooled connections
    pub async fn shutdown(&self) {
        self.database.close().await;
    }
}
