//! Database repositories
//!
//! [`OperationStore`] is the read-only seam between the pipeline and the SPB
//! operation tables. [`OperationRepository`] backs it with PostgreSQL; tests
//! use the in-memory store from [`crate::testing`].

pub mod operation_repository;

pub use operation_repository::OperationRepository;

use crate::error::Result;
use crate::models::{OperationRecord, QueryResult, StorageTier};
use crate::sql::GeneratedQuery;
use async_trait::async_trait;

/// Read access to operation records
#[async_trait]
pub trait OperationStore: Send + Sync {
    /// Execute a generated query, rendering every cell as text.
    ///
    /// Errors are reported as [`crate::NuopError::QueryExecution`].
    async fn execute(&self, query: &GeneratedQuery) -> Result<QueryResult>;

    /// Records in `tier` whose operation id contains `operation_id`,
    /// ascending by insertion time.
    ///
    /// Errors are reported as [`crate::NuopError::TierUnavailable`].
    async fn lookup(&self, tier: &StorageTier, operation_id: &str) -> Result<Vec<OperationRecord>>;

    /// Check that `tier` exists and is readable
    async fn probe(&self, tier: &StorageTier) -> Result<()>;

    /// Check connectivity
    async fn ping(&self) -> Result<()>;
}
