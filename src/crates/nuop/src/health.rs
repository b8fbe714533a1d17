//! Health check functionality
//!
//! Verifies the database, each operation tier, the language model and the
//! configuration before an operator session starts.

use crate::config::NuopConfig;
use crate::models::StorageTier;
use crate::repositories::OperationStore;
use llm::ProviderUtils;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Outcome of one check, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// Usable, with reduced data (e.g. an unreadable archive tier)
    Degraded,
    /// Questions or traces cannot be answered
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        };
        f.write_str(label)
    }
}

/// Result of checking the database, one tier, the model or the config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    /// Failure reason, or `None` when healthy
    pub detail: Option<String>,
    pub elapsed_ms: u64,
}

impl ComponentHealth {
    fn new(name: impl Into<String>, status: HealthStatus, detail: Option<String>, elapsed_ms: u64) -> Self {
        Self {
            name: name.into(),
            status,
            detail,
            elapsed_ms,
        }
    }

    pub fn healthy(name: impl Into<String>, elapsed_ms: u64) -> Self {
        Self::new(name, HealthStatus::Healthy, None, elapsed_ms)
    }

    pub fn degraded(name: impl Into<String>, detail: impl Into<String>, elapsed_ms: u64) -> Self {
        Self::new(name, HealthStatus::Degraded, Some(detail.into()), elapsed_ms)
    }

    pub fn unhealthy(name: impl Into<String>, detail: impl Into<String>, elapsed_ms: u64) -> Self {
        Self::new(name, HealthStatus::Unhealthy, Some(detail.into()), elapsed_ms)
    }
}

/// All checks of one `nuop health` run; the overall status is the worst one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub checks: Vec<ComponentHealth>,
    pub total_elapsed_ms: u64,
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {
    pub fn new(checks: Vec<ComponentHealth>) -> Self {
        let status = checks
            .iter()
            .map(|c| c.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);
        let total_elapsed_ms = checks.iter().map(|c| c.elapsed_ms).sum();

        Self {
            status,
            checks,
            total_elapsed_ms,
            checked_at: Utc::now(),
        }
    }

    /// Tables whose probe failed
    pub fn unreadable_tiers(&self) -> Vec<&str> {
        self.checks
            .iter()
            .filter(|c| c.status != HealthStatus::Healthy)
            .filter_map(|c| c.name.strip_prefix("tier "))
            .filter_map(|rest| rest.split(' ').next())
            .collect()
    }
}

/// Health checker for system components
pub struct HealthChecker;

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

impl HealthChecker {
    /// Check database connectivity
    pub async fn check_database(store: &dyn OperationStore) -> ComponentHealth {
        let start = Instant::now();

        match store.ping().await {
            Ok(_) => ComponentHealth::healthy("database", elapsed_ms(start)),
            Err(e) => ComponentHealth::unhealthy("database", e.to_string(), elapsed_ms(start)),
        }
    }

    /// Check one operation tier.
    ///
    /// An unreadable tier only degrades the system: reconstruction skips it.
    pub async fn check_tier(store: &dyn OperationStore, tier: &StorageTier) -> ComponentHealth {
        let start = Instant::now();
        let name = format!("tier {} ({})", tier.table, tier.retention);

        match store.probe(tier).await {
            Ok(_) => ComponentHealth::healthy(name, elapsed_ms(start)),
            Err(e) => ComponentHealth::degraded(name, e.to_string(), elapsed_ms(start)),
        }
    }

    /// Check that the model server answers and serves the configured model
    pub async fn check_llm(provider: &dyn ProviderUtils) -> ComponentHealth {
        let start = Instant::now();
        let model = provider.current_model().to_string();

        match provider.ping().await {
            Ok(true) => {}
            Ok(false) => {
                return ComponentHealth::unhealthy("llm", "model server not reachable", elapsed_ms(start))
            }
            Err(e) => return ComponentHealth::unhealthy("llm", e.to_string(), elapsed_ms(start)),
        }

        match provider.fetch_models().await {
            Ok(models) if models.iter().any(|m| model_matches(&m.id, &model)) => {
                ComponentHealth::healthy("llm", elapsed_ms(start))
            }
            Ok(_) => ComponentHealth::degraded(
                "llm",
                format!("model '{}' is not pulled on the server", model),
                elapsed_ms(start),
            ),
            Err(e) => ComponentHealth::degraded("llm", e.to_string(), elapsed_ms(start)),
        }
    }

    /// Check configuration validity
    pub fn check_config(config: &NuopConfig) -> ComponentHealth {
        let start = Instant::now();

        let mut issues = Vec::new();
        if let Err(e) = config.validate() {
            issues.push(e.to_string());
        }
        if config.database.password.is_none() {
            issues.push("database password not set".to_string());
        }

        if issues.is_empty() {
            ComponentHealth::healthy("configuration", elapsed_ms(start))
        } else {
            ComponentHealth::degraded("configuration", issues.join("; "), elapsed_ms(start))
        }
    }

    /// Run every check
    pub async fn check_all(
        config: &NuopConfig,
        store: &dyn OperationStore,
        provider: &dyn ProviderUtils,
    ) -> HealthReport {
        let mut checks = vec![Self::check_config(config)];

        let database = Self::check_database(store).await;
        let reachable = database.status == HealthStatus::Healthy;
        checks.push(database);
        if reachable {
            for tier in &config.database.tiers {
                checks.push(Self::check_tier(store, tier).await);
            }
        }

        checks.push(Self::check_llm(provider).await);

        HealthReport::new(checks)
    }
}

/// Ollama reports `llama3` as `llama3:latest`
fn model_matches(served: &str, configured: &str) -> bool {
    served == configured
        || (!configured.contains(':') && served.strip_suffix(":latest") == Some(configured))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;

    #[test]
    fn test_overall_status_is_worst_check() {
        let report = HealthReport::new(vec![
            ComponentHealth::healthy("database", 3),
            ComponentHealth::degraded("tier consolid02.operacao (archive)", "permission denied", 2),
            ComponentHealth::healthy("llm", 8),
        ]);
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.total_elapsed_ms, 13);
        assert_eq!(report.unreadable_tiers(), vec!["consolid02.operacao"]);

        let empty = HealthReport::new(Vec::new());
        assert_eq!(empty.status, HealthStatus::Healthy);
    }

    #[test]
    fn test_report_json_uses_lowercase_status() {
        let report = HealthReport::new(vec![ComponentHealth::unhealthy("database", "refused", 1)]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["checks"][0]["detail"], "refused");
    }

    struct FakeProvider {
        reachable: bool,
        models: Vec<&'static str>,
    }

    #[async_trait::async_trait]
    impl ProviderUtils for FakeProvider {
        async fn ping(&self) -> llm::Result<bool> {
            Ok(self.reachable)
        }

        async fn fetch_models(&self) -> llm::Result<Vec<llm::ModelInfo>> {
            Ok(self
                .models
                .iter()
                .map(|id| llm::ModelInfo::new(*id))
                .collect())
        }

        fn current_model(&self) -> &str {
            "llama3"
        }
    }

    #[test]
    fn test_model_matches_latest_tag() {
        assert!(model_matches("llama3:latest", "llama3"));
        assert!(model_matches("llama3:70b", "llama3:70b"));
        assert!(!model_matches("llama3:70b", "llama3"));
    }

    #[tokio::test]
    async fn test_failing_tier_degrades() {
        let config = NuopConfig::default();
        let store = InMemoryStore::new().with_failure("consolid02.operacao", "permission denied");
        let provider = FakeProvider {
            reachable: true,
            models: vec!["llama3:latest"],
        };

        let report = HealthChecker::check_all(&config, &store, &provider).await;
        let tier = report
            .checks
            .iter()
            .find(|c| c.name.starts_with("tier consolid02.operacao"))
            .unwrap();
        assert_eq!(tier.status, HealthStatus::Degraded);
        assert_ne!(report.status, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_unreachable_database_skips_tiers() {
        let config = NuopConfig::default();
        let store = InMemoryStore::new().unreachable();
        let provider = FakeProvider {
            reachable: true,
            models: vec!["llama3"],
        };

        let report = HealthChecker::check_all(&config, &store, &provider).await;
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert!(!report.checks.iter().any(|c| c.name.starts_with("tier")));
    }

    #[tokio::test]
    async fn test_llm_checks() {
        let down = FakeProvider {
            reachable: false,
            models: vec![],
        };
        assert_eq!(HealthChecker::check_llm(&down).await.status, HealthStatus::Unhealthy);

        let missing = FakeProvider {
            reachable: true,
            models: vec!["mistral:latest"],
        };
        assert_eq!(HealthChecker::check_llm(&missing).await.status, HealthStatus::Degraded);
    }
}
