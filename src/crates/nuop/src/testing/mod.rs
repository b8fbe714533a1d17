//! Test infrastructure and helpers for the nuop crate
//!
//! This module provides:
//! - [`InMemoryStore`], an [`OperationStore`] with per-tier rows and
//!   injectable failures
//! - record fixtures with predictable timestamps

use crate::error::{NuopError, Result};
use crate::models::{OperationRecord, QueryResult, StorageTier};
use crate::repositories::OperationStore;
use crate::sql::GeneratedQuery;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::Mutex;

enum TierData {
    Rows(Vec<OperationRecord>),
    Failure(String),
}

/// In-memory operation store
///
/// Tiers that were never configured behave as empty tables.
#[derive(Default)]
pub struct InMemoryStore {
    tiers: HashMap<String, TierData>,
    query_result: Option<std::result::Result<QueryResult, String>>,
    unreachable: bool,
    executed: Mutex<Vec<String>>,
    lookups: Mutex<Vec<(String, String)>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows held by `table`
    pub fn with_rows(mut self, table: &str, rows: Vec<OperationRecord>) -> Self {
        self.tiers.insert(table.to_string(), TierData::Rows(rows));
        self
    }

    /// Make every access to `table` fail
    pub fn with_failure(mut self, table: &str, reason: &str) -> Self {
        self.tiers
            .insert(table.to_string(), TierData::Failure(reason.to_string()));
        self
    }

    /// Result returned for any generated query
    pub fn with_query_result(mut self, result: QueryResult) -> Self {
        self.query_result = Some(Ok(result));
        self
    }

    /// Make generated queries fail
    pub fn with_query_error(mut self, reason: &str) -> Self {
        self.query_result = Some(Err(reason.to_string()));
        self
    }

    /// Make `ping` fail
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// SQL of every executed query, in order
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// `(table, operation_id)` of every lookup, in order
    pub fn lookups(&self) -> Vec<(String, String)> {
        self.lookups.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl OperationStore for InMemoryStore {
    async fn execute(&self, query: &GeneratedQuery) -> Result<QueryResult> {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(query.sql().to_string());
        }
        match &self.query_result {
            Some(Ok(result)) => Ok(result.clone()),
            Some(Err(reason)) => Err(NuopError::QueryExecution(reason.clone())),
            None => Ok(QueryResult::empty()),
        }
    }

    async fn lookup(&self, tier: &StorageTier, operation_id: &str) -> Result<Vec<OperationRecord>> {
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push((tier.table.clone(), operation_id.to_string()));
        }
        match self.tiers.get(&tier.table) {
            Some(TierData::Failure(reason)) => Err(NuopError::TierUnavailable {
                tier: tier.table.clone(),
                reason: reason.clone(),
            }),
            Some(TierData::Rows(rows)) => {
                let mut matched: Vec<OperationRecord> = rows
                    .iter()
                    .filter(|r| r.operation_id.contains(operation_id))
                    .cloned()
                    .collect();
                matched.sort_by_key(|r| r.timestamp);
                Ok(matched)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn probe(&self, tier: &StorageTier) -> Result<()> {
        match self.tiers.get(&tier.table) {
            Some(TierData::Failure(reason)) => Err(NuopError::TierUnavailable {
                tier: tier.table.clone(),
                reason: reason.clone(),
            }),
            _ => Ok(()),
        }
    }

    async fn ping(&self) -> Result<()> {
        if self.unreachable {
            Err(NuopError::Database("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

/// 2024-05-02 10:00:00, the base time of the fixtures
pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 2)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .unwrap_or_default()
}

/// A record `minutes` after [`base_time`]
pub fn record_at(
    origin: &str,
    operation_id: &str,
    status_op: i32,
    status_msg: Option<i32>,
    minutes: i64,
) -> OperationRecord {
    OperationRecord::new(
        origin,
        format!("MSG{:04}", minutes),
        operation_id,
        "STR0008",
        status_op,
        status_msg,
        base_time() + Duration::minutes(minutes),
    )
}
